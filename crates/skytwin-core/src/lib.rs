//! # SkyTwin Core
//!
//! Shared types for the SkyTwin airspace simulation: drone records,
//! 3-D positions, the negotiation state machine, negotiation events and
//! the error type used across the workspace.
//!
//! ## Quick Start
//!
//! ```rust
//! use skytwin_core::prelude::*;
//!
//! let a = Position::new(10.0, 10.0, 20.0);
//! let b = Position::new(13.0, 14.0, 20.0);
//! assert_eq!(a.distance_to(&b), 5.0);
//!
//! let id = AgentId::from_index(0);
//! assert_eq!(id.to_string(), "DRONE-001");
//! ```

pub mod types;
pub mod error;
pub mod prelude;
