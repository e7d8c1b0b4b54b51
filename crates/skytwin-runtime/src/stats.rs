//! Aggregate counts over a snapshot.
//!
//! Nothing here is stored by the simulation; every figure is recomputed
//! from the agents and events a snapshot carries.

use crate::airspace::AirspaceSnapshot;
use serde::{Deserialize, Serialize};
use skytwin_core::types::{AgentStatus, DroneAgent, EventKind, NegotiationEvent, Tick};

/// Fleet and log summary for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirspaceStats {
    pub tick: Tick,
    pub agents: usize,
    pub active: usize,
    pub negotiating: usize,
    pub rerouting: usize,
    pub resolved: usize,
    /// Events currently retained in the log.
    pub total_events: usize,
    /// Retained `conflict_detected` events.
    pub conflicts_detected: usize,
    /// Retained `resolution_complete` events.
    pub resolutions_completed: usize,
    /// Mean battery level, 0 for an empty fleet.
    pub mean_battery: f64,
}

impl AirspaceStats {
    pub fn from_snapshot(snapshot: &AirspaceSnapshot) -> Self {
        Self::from_parts(snapshot.tick, &snapshot.agents, &snapshot.events)
    }

    pub fn from_parts(tick: Tick, agents: &[DroneAgent], events: &[NegotiationEvent]) -> Self {
        let count = |status: AgentStatus| agents.iter().filter(|a| a.status == status).count();
        let count_kind = |kind: EventKind| events.iter().filter(|e| e.kind == kind).count();

        let mean_battery = if agents.is_empty() {
            0.0
        } else {
            agents.iter().map(|a| a.battery_level).sum::<f64>() / agents.len() as f64
        };

        Self {
            tick,
            agents: agents.len(),
            active: count(AgentStatus::Active),
            negotiating: count(AgentStatus::Negotiating),
            rerouting: count(AgentStatus::Rerouting),
            resolved: count(AgentStatus::Resolved),
            total_events: events.len(),
            conflicts_detected: count_kind(EventKind::ConflictDetected),
            resolutions_completed: count_kind(EventKind::ResolutionComplete),
            mean_battery,
        }
    }
}
