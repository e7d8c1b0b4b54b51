//! SkyTwin Core Prelude: convenient imports for common usage.
//!
//! ```rust
//! use skytwin_core::prelude::*;
//! ```

pub use crate::types::{
    AgentId, EventId, RunId,
    Position,
    Priority, AgentStatus,
    DroneAgent,
    EventKind, NegotiationEvent,
    Tick,
};

pub use crate::error::{ConfigError, Result, SkyTwinError};
