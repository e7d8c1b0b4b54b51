//! SkyTwin Runtime Prelude: convenient imports for common usage.
//!
//! ```rust
//! use skytwin_runtime::prelude::*;
//! ```

pub use crate::airspace::{Airspace, AirspaceSnapshot, TickReport};
pub use crate::clock::{ClockSnapshot, SimulationClock};
pub use crate::config::{AirspaceConfig, ValueRange, Volume};
pub use crate::detector::{Conflict, ConflictDetector};
pub use crate::event_log::{EventBatch, EventLog};
pub use crate::motion::{MotionIntegrator, MotionSummary};
pub use crate::resolver::{Basis, NegotiationResolver, Resolution};
pub use crate::stats::AirspaceStats;
pub use crate::store::AgentStore;

// Re-export async driver when feature is enabled
#[cfg(feature = "async")]
pub use crate::driver::{
    ClockHandle, ManualTicks, ManualTrigger, TickSource, TickTimer,
    manual_ticks, spawn_clock,
};

// Re-export core types
pub use skytwin_core::prelude::*;
