//! Pairwise conflict prediction.
//!
//! Every unordered pair of `active` drones is checked once per tick. Both
//! drones are projected forward along the horizontal step they would take
//! this tick, altitude held constant; if the projected separation falls
//! below the larger of their safety radii, the pair is in conflict and
//! both drones move to `negotiating`.
//!
//! Pairs are scanned in store order. A drone claimed by an earlier pair is
//! no longer `active` and is skipped for the rest of the scan, so each
//! drone takes part in at most one conflict per tick.

use crate::config::AirspaceConfig;
use crate::event_log::EventBatch;
use crate::motion::step_for;
use crate::store::AgentStore;
use skytwin_core::types::{AgentId, AgentStatus, DroneAgent, EventId, EventKind, Position, Priority};
use tracing::debug;

/// A predicted proximity violation between two drones.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    /// Store index of the first drone, always less than `second`.
    pub first: usize,
    pub second: usize,
    /// Ids in detection order.
    pub participants: [AgentId; 2],
    pub current_distance: f64,
    pub predicted_distance: f64,
    /// `max` of the two safety radii.
    pub separation: f64,
}

/// Scans drone pairs for predicted separation violations.
#[derive(Debug, Clone)]
pub struct ConflictDetector {
    lookahead_ticks: u32,
    arrival_threshold: f64,
    negotiation_history_capacity: usize,
}

impl ConflictDetector {
    pub fn from_config(config: &AirspaceConfig) -> Self {
        Self {
            lookahead_ticks: config.lookahead_ticks,
            arrival_threshold: config.arrival_threshold,
            negotiation_history_capacity: config.negotiation_history_capacity,
        }
    }

    /// Where `agent` will be after the lookahead, moving horizontally only.
    pub fn project(&self, agent: &DroneAgent) -> Position {
        match step_for(agent, self.arrival_threshold) {
            Some(step) => {
                let n = self.lookahead_ticks as f64;
                agent.position.offset(step.dx * n, step.dy * n, 0.0)
            }
            None => agent.position,
        }
    }

    /// Distance between the two projected positions.
    pub fn predicted_distance(&self, a: &DroneAgent, b: &DroneAgent) -> f64 {
        self.project(a).distance_to(&self.project(b))
    }

    /// Whether the pair would come closer than either drone tolerates.
    pub fn violates(&self, a: &DroneAgent, b: &DroneAgent) -> bool {
        self.predicted_distance(a, b) < a.safety_radius.max(b.safety_radius)
    }

    /// Find this tick's conflicts and move their drones to `negotiating`.
    ///
    /// No events are written here; see [`ConflictDetector::announce`].
    pub fn scan(&self, store: &mut AgentStore) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        let n = store.len();

        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = store.pair_mut(i, j);
                if !a.status.is_active() || !b.status.is_active() {
                    continue;
                }
                if !self.violates(a, b) {
                    continue;
                }

                a.transition(AgentStatus::Negotiating);
                b.transition(AgentStatus::Negotiating);

                let conflict = Conflict {
                    first: i,
                    second: j,
                    participants: [a.id, b.id],
                    current_distance: a.position.distance_to(&b.position),
                    predicted_distance: self.predicted_distance(a, b),
                    separation: a.safety_radius.max(b.safety_radius),
                };
                debug!(
                    a = %a.id,
                    b = %b.id,
                    current = conflict.current_distance,
                    predicted = conflict.predicted_distance,
                    "conflict detected"
                );
                conflicts.push(conflict);
            }
        }

        conflicts
    }

    /// Log a `conflict_detected` event for `conflict` and record it on both drones.
    pub fn announce(
        &self,
        store: &mut AgentStore,
        conflict: &Conflict,
        batch: &mut EventBatch,
    ) -> EventId {
        let (a, b) = store.pair_mut(conflict.first, conflict.second);
        let priority = if a.priority.is_high() || b.priority.is_high() {
            Priority::High
        } else {
            Priority::Medium
        };
        let id = batch.emit(
            EventKind::ConflictDetected,
            vec![a.id, b.id],
            format!("Potential collision detected between {} and {}", a.id, b.id),
            priority,
        );
        a.record_negotiation(id, self.negotiation_history_capacity);
        b.record_negotiation(id, self.negotiation_history_capacity);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::EventLog;

    fn detector() -> ConflictDetector {
        ConflictDetector::from_config(&AirspaceConfig::default())
    }

    fn drone(id: u32, from: (f64, f64, f64), to: (f64, f64, f64)) -> DroneAgent {
        DroneAgent::new(
            AgentId(id),
            Position::new(from.0, from.1, from.2),
            Position::new(to.0, to.1, to.2),
        )
    }

    #[test]
    fn projection_holds_altitude() {
        let a = drone(1, (0.0, 0.0, 20.0), (30.0, 0.0, 60.0));
        let p = detector().project(&a);
        assert!((p.x - 5.0 * 30.0 / 50.0).abs() < 1e-9);
        assert_eq!(p.z, 20.0);
    }

    #[test]
    fn arrived_drone_projects_in_place() {
        let a = drone(1, (50.0, 50.0, 30.0), (51.0, 50.0, 30.0));
        assert_eq!(detector().project(&a), a.position);
    }

    #[test]
    fn converging_pair_conflicts() {
        let mut store = AgentStore::from_agents(vec![
            drone(1, (10.0, 10.0, 20.0), (90.0, 90.0, 20.0)),
            drone(2, (12.0, 10.0, 20.0), (88.0, 90.0, 20.0)),
        ])
        .unwrap();

        let conflicts = detector().scan(&mut store);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].participants, [AgentId(1), AgentId(2)]);
        assert!(conflicts[0].predicted_distance < 8.0);
        assert_eq!(store.count_status(AgentStatus::Negotiating), 2);
    }

    #[test]
    fn distant_pair_is_left_alone() {
        let mut store = AgentStore::from_agents(vec![
            drone(1, (10.0, 10.0, 20.0), (10.0, 90.0, 20.0)),
            drone(2, (90.0, 10.0, 60.0), (90.0, 90.0, 60.0)),
        ])
        .unwrap();

        assert!(detector().scan(&mut store).is_empty());
        assert_eq!(store.count_status(AgentStatus::Active), 2);
    }

    #[test]
    fn altitude_separation_prevents_conflict() {
        let mut store = AgentStore::from_agents(vec![
            drone(1, (10.0, 10.0, 20.0), (90.0, 90.0, 20.0)),
            drone(2, (12.0, 10.0, 60.0), (88.0, 90.0, 60.0)),
        ])
        .unwrap();
        assert!(detector().scan(&mut store).is_empty());
    }

    #[test]
    fn non_active_pairs_are_skipped() {
        let mut a = drone(1, (10.0, 10.0, 20.0), (90.0, 90.0, 20.0));
        a.status = AgentStatus::Rerouting;
        let b = drone(2, (12.0, 10.0, 20.0), (88.0, 90.0, 20.0));
        let mut store = AgentStore::from_agents(vec![a, b]).unwrap();

        assert!(detector().scan(&mut store).is_empty());
        assert_eq!(store.get(AgentId(2)).unwrap().status, AgentStatus::Active);
    }

    #[test]
    fn drone_joins_at_most_one_conflict() {
        // Three drones bunched together: the first pair claims 1 and 2,
        // leaving 3 with nobody active to conflict with.
        let mut store = AgentStore::from_agents(vec![
            drone(1, (10.0, 10.0, 20.0), (90.0, 90.0, 20.0)),
            drone(2, (12.0, 10.0, 20.0), (88.0, 90.0, 20.0)),
            drone(3, (11.0, 12.0, 20.0), (89.0, 90.0, 20.0)),
        ])
        .unwrap();

        let conflicts = detector().scan(&mut store);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].participants, [AgentId(1), AgentId(2)]);
        assert_eq!(store.get(AgentId(3)).unwrap().status, AgentStatus::Active);
    }

    #[test]
    fn announce_sets_priority_from_participants() {
        let mut store = AgentStore::from_agents(vec![
            drone(1, (10.0, 10.0, 20.0), (90.0, 90.0, 20.0)).with_priority(Priority::Low),
            drone(2, (12.0, 10.0, 20.0), (88.0, 90.0, 20.0)).with_priority(Priority::High),
        ])
        .unwrap();
        let det = detector();
        let conflicts = det.scan(&mut store);
        let mut batch = EventLog::new(50).batch(1);

        let id = det.announce(&mut store, &conflicts[0], &mut batch);

        let event = &batch.events()[0];
        assert_eq!(event.kind, EventKind::ConflictDetected);
        assert_eq!(event.priority, Priority::High);
        assert_eq!(
            event.description,
            "Potential collision detected between DRONE-001 and DRONE-002"
        );
        assert_eq!(store.get(AgentId(1)).unwrap().negotiation_history, [id]);
        assert_eq!(store.get(AgentId(2)).unwrap().negotiation_history, [id]);
    }
}
