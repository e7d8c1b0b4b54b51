//! Negotiation resolver.
//!
//! Each detected conflict is settled in the same tick it is found. A lone
//! high-priority drone always keeps its path. Otherwise the drone closer to
//! its own target (horizontally) keeps its path, with the lower id winning
//! an exact tie. The loser switches to `rerouting` and has its target
//! shifted away; the winner stays `negotiating` until it moves.

use crate::config::AirspaceConfig;
use crate::detector::Conflict;
use crate::event_log::EventBatch;
use crate::store::AgentStore;
use skytwin_core::types::{AgentId, AgentStatus, DroneAgent, EventId, EventKind, Priority};
use tracing::debug;

/// Target shift applied to a drone yielding to a high-priority drone.
pub const PRIORITY_REROUTE: (f64, f64, f64) = (0.0, 15.0, 10.0);

/// Target shift applied to the less efficient drone of an even pair.
pub const EFFICIENCY_REROUTE: (f64, f64, f64) = (12.0, 0.0, 8.0);

/// How a conflict was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    /// Exactly one drone had high priority.
    Priority,
    /// Neither or both were high; distance to target decided.
    Efficiency,
}

/// Outcome of one negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub winner: AgentId,
    pub loser: AgentId,
    pub basis: Basis,
}

/// Decide who yields between two conflicting drones.
pub fn decide(a: &DroneAgent, b: &DroneAgent) -> Resolution {
    match (a.priority.is_high(), b.priority.is_high()) {
        (true, false) => Resolution {
            winner: a.id,
            loser: b.id,
            basis: Basis::Priority,
        },
        (false, true) => Resolution {
            winner: b.id,
            loser: a.id,
            basis: Basis::Priority,
        },
        _ => {
            let da = a.horizontal_remaining();
            let db = b.horizontal_remaining();
            let a_wins = da < db || (da == db && a.id < b.id);
            let (winner, loser) = if a_wins { (a.id, b.id) } else { (b.id, a.id) };
            Resolution {
                winner,
                loser,
                basis: Basis::Efficiency,
            }
        }
    }
}

/// Applies negotiation outcomes to the store.
#[derive(Debug, Clone)]
pub struct NegotiationResolver {
    negotiation_history_capacity: usize,
}

impl NegotiationResolver {
    pub fn from_config(config: &AirspaceConfig) -> Self {
        Self {
            negotiation_history_capacity: config.negotiation_history_capacity,
        }
    }

    /// Settle `conflict`: reroute the loser and log exactly one resolution event.
    pub fn resolve(
        &self,
        store: &mut AgentStore,
        conflict: &Conflict,
        batch: &mut EventBatch,
    ) -> (Resolution, EventId) {
        let (a, b) = store.pair_mut(conflict.first, conflict.second);
        let resolution = decide(a, b);
        let participants = vec![a.id, b.id];
        let (winner, loser) = if resolution.winner == a.id { (a, b) } else { (b, a) };

        let (offset, kind, description, priority) = match resolution.basis {
            Basis::Priority => (
                PRIORITY_REROUTE,
                EventKind::PriorityExchange,
                format!("{} (HIGH priority) maintains path, {} rerouting", winner.id, loser.id),
                Priority::High,
            ),
            Basis::Efficiency => (
                EFFICIENCY_REROUTE,
                EventKind::PathNegotiation,
                format!("Efficiency-based path negotiation completed, {} rerouting", loser.id),
                Priority::Medium,
            ),
        };

        loser.target = loser.target.offset(offset.0, offset.1, offset.2);
        loser.transition(AgentStatus::Rerouting);

        let id = batch.emit(kind, participants, description, priority);
        winner.record_negotiation(id, self.negotiation_history_capacity);
        loser.record_negotiation(id, self.negotiation_history_capacity);

        debug!(
            winner = %resolution.winner,
            loser = %resolution.loser,
            basis = ?resolution.basis,
            "conflict resolved"
        );

        (resolution, id)
    }
}
