//! Motion integrator: moves every drone one step toward its target.
//!
//! A drone further than the arrival threshold from its target steps
//! `speed` along the horizontal axes and `speed / 2` vertically, both
//! scaled by the 3-D distance. A drone within the threshold has arrived:
//! it gets a fresh target inside the operating volume and returns to
//! `active`.

use crate::config::{AirspaceConfig, Volume};
use crate::event_log::EventBatch;
use crate::store::AgentStore;
use rand::Rng;
use skytwin_core::types::{AgentStatus, DroneAgent, EventKind, Priority};
use tracing::debug;

/// Distances below this are treated as zero when normalizing.
pub const MIN_DISTANCE: f64 = 1e-9;

/// Vertical motion runs at this fraction of horizontal speed.
pub const VERTICAL_SPEED_FACTOR: f64 = 0.5;

/// One tick of displacement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

/// The displacement `agent` takes this tick, or `None` if it has arrived.
pub fn step_for(agent: &DroneAgent, arrival_threshold: f64) -> Option<Step> {
    let dx = agent.target.x - agent.position.x;
    let dy = agent.target.y - agent.position.y;
    let dz = agent.target.z - agent.position.z;
    let distance = (dx * dx + dy * dy + dz * dz).sqrt();

    if distance <= arrival_threshold || distance < MIN_DISTANCE {
        return None;
    }

    Some(Step {
        dx: dx / distance * agent.speed,
        dy: dy / distance * agent.speed,
        dz: dz / distance * agent.speed * VERTICAL_SPEED_FACTOR,
    })
}

/// Result of one motion pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionSummary {
    pub moved: usize,
    pub arrived: usize,
    pub grounded: usize,
}

/// Advances drones and reassigns targets on arrival.
#[derive(Debug, Clone)]
pub struct MotionIntegrator {
    arrival_threshold: f64,
    path_history_capacity: usize,
    negotiation_history_capacity: usize,
    battery_drain_per_tick: f64,
    ground_on_depletion: bool,
    operating_volume: Volume,
}

impl MotionIntegrator {
    pub fn from_config(config: &AirspaceConfig) -> Self {
        Self {
            arrival_threshold: config.arrival_threshold,
            path_history_capacity: config.path_history_capacity,
            negotiation_history_capacity: config.negotiation_history_capacity,
            battery_drain_per_tick: config.battery_drain_per_tick,
            ground_on_depletion: config.ground_on_depletion,
            operating_volume: config.operating_volume,
        }
    }

    pub fn arrival_threshold(&self) -> f64 {
        self.arrival_threshold
    }

    /// Move every drone once, in store order.
    pub fn advance<R: Rng + ?Sized>(
        &self,
        store: &mut AgentStore,
        rng: &mut R,
        batch: &mut EventBatch,
    ) -> MotionSummary {
        let mut summary = MotionSummary::default();

        for agent in store.iter_mut() {
            // Grounded drones stay where they are.
            if agent.status == AgentStatus::Resolved {
                continue;
            }

            match step_for(agent, self.arrival_threshold) {
                Some(step) => {
                    agent.position = agent.position.offset(step.dx, step.dy, step.dz);
                    agent.record_position(agent.position, self.path_history_capacity);
                    // A negotiation winner keeps its course and rejoins the pool.
                    if agent.status == AgentStatus::Negotiating {
                        agent.transition(AgentStatus::Active);
                    }
                    summary.moved += 1;
                }
                None => {
                    agent.target = self.operating_volume.sample(rng);
                    agent.transition(AgentStatus::Active);
                    let id = batch.emit(
                        EventKind::ResolutionComplete,
                        vec![agent.id],
                        format!("{} reached destination, selecting new target", agent.id),
                        Priority::Low,
                    );
                    agent.record_negotiation(id, self.negotiation_history_capacity);
                    debug!(agent = %agent.id, "arrived, new target assigned");
                    summary.arrived += 1;
                }
            }

            agent.battery_level = (agent.battery_level - self.battery_drain_per_tick).max(0.0);

            if self.ground_on_depletion && agent.battery_level <= 0.0 {
                agent.transition(AgentStatus::Resolved);
                let id = batch.emit(
                    EventKind::ResolutionComplete,
                    vec![agent.id],
                    format!("{} battery depleted, grounded", agent.id),
                    Priority::Low,
                );
                agent.record_negotiation(id, self.negotiation_history_capacity);
                debug!(agent = %agent.id, "battery depleted, grounded");
                summary.grounded += 1;
            }
        }

        summary
    }
}
