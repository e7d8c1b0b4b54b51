//! # SkyTwin Runtime
//!
//! The airspace simulation: a fleet of drones, pairwise conflict
//! prediction, priority negotiation and a bounded negotiation log, all
//! advanced by a single tick pipeline.
//!
//! The [`airspace::Airspace`] owns one run. The [`clock::SimulationClock`]
//! wraps it with start/pause/reset, and with the `async` feature the
//! [`driver`] module runs that clock on a tokio task at a fixed cadence.
//!
//! ```rust
//! use skytwin_runtime::prelude::*;
//!
//! let mut airspace = Airspace::new(AirspaceConfig::default().with_seed(7)).unwrap();
//! airspace.run(50);
//!
//! let stats = AirspaceStats::from_snapshot(&airspace.snapshot());
//! assert_eq!(stats.tick, 50);
//! assert!(stats.total_events <= 50);
//! ```

pub mod config;
pub mod store;
pub mod event_log;
pub mod motion;
pub mod detector;
pub mod resolver;
pub mod airspace;
pub mod stats;
pub mod clock;
pub mod driver;
pub mod prelude;
