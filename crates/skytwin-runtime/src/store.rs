//! Agent store, the fleet of drones for one run.
//!
//! The store is the only mutable state of a simulation besides the event
//! log. Agents keep their creation order, which is also the order in which
//! conflict pairs are scanned.

use crate::config::{AirspaceConfig, MAX_AGENT_COUNT};
use rand::seq::SliceRandom;
use rand::Rng;
use skytwin_core::error::{Result, SkyTwinError};
use skytwin_core::types::{AgentId, AgentStatus, DroneAgent, Position, Priority};
use std::collections::{HashSet, VecDeque};

/// Mission labels drawn for new drones.
pub const INTENTS: [&str; 6] = [
    "Emergency medical delivery",
    "Surveillance patrol",
    "Package delivery",
    "Infrastructure inspection",
    "Search and rescue",
    "Commercial transport",
];

/// Holds the current drones, one record per id.
#[derive(Debug, Clone, Default)]
pub struct AgentStore {
    agents: Vec<DroneAgent>,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from explicit agents.
    ///
    /// Duplicate ids, non-positive speeds or safety radii, batteries outside
    /// 0-100 and non-finite coordinates are rejected.
    pub fn from_agents(agents: Vec<DroneAgent>) -> Result<Self> {
        if agents.len() > MAX_AGENT_COUNT {
            return Err(SkyTwinError::out_of_range(
                "agents",
                1.0,
                MAX_AGENT_COUNT as f64,
                agents.len() as f64,
            ));
        }
        let mut seen = HashSet::new();
        for agent in &agents {
            check_agent(agent)?;
            if !seen.insert(agent.id) {
                return Err(SkyTwinError::invalid_config(
                    "agents",
                    agent.id,
                    "duplicate agent id",
                ));
            }
        }
        Ok(Self { agents })
    }

    /// Create `config.agent_count` drones laid out on a loose grid, each
    /// heading roughly across the airspace.
    pub fn spawn_fleet<R: Rng + ?Sized>(config: &AirspaceConfig, rng: &mut R) -> Self {
        let agents = (0..config.agent_count)
            .map(|i| spawn_drone(i, config, rng))
            .collect();
        Self { agents }
    }

    pub fn get(&self, id: AgentId) -> Option<&DroneAgent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut DroneAgent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    pub fn as_slice(&self) -> &[DroneAgent] {
        &self.agents
    }

    pub fn iter(&self) -> impl Iterator<Item = &DroneAgent> {
        self.agents.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DroneAgent> {
        self.agents.iter_mut()
    }

    /// Mutable access to two distinct agents by index, `i < j`.
    pub fn pair_mut(&mut self, i: usize, j: usize) -> (&mut DroneAgent, &mut DroneAgent) {
        assert!(i < j, "pair_mut requires i < j");
        let (head, tail) = self.agents.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn count_status(&self, status: AgentStatus) -> usize {
        self.agents.iter().filter(|a| a.status == status).count()
    }

    /// Owned copy of every agent, in creation order.
    pub fn to_vec(&self) -> Vec<DroneAgent> {
        self.agents.clone()
    }
}

fn check_agent(agent: &DroneAgent) -> Result<()> {
    let field = |name: &str| format!("{}.{}", agent.id, name);
    if !(agent.speed > 0.0 && agent.speed.is_finite()) {
        return Err(SkyTwinError::invalid_config(field("speed"), agent.speed, "must be positive"));
    }
    if !(agent.safety_radius > 0.0 && agent.safety_radius.is_finite()) {
        return Err(SkyTwinError::invalid_config(
            field("safety_radius"),
            agent.safety_radius,
            "must be positive",
        ));
    }
    if !(0.0..=100.0).contains(&agent.battery_level) {
        return Err(SkyTwinError::out_of_range(
            field("battery_level"),
            0.0,
            100.0,
            agent.battery_level,
        ));
    }
    if !agent.position.is_finite() {
        return Err(SkyTwinError::invalid_config(
            field("position"),
            format!("{:?}", agent.position),
            "coordinates must be finite",
        ));
    }
    if !agent.target.is_finite() {
        return Err(SkyTwinError::invalid_config(
            field("target"),
            format!("{:?}", agent.target),
            "coordinates must be finite",
        ));
    }
    Ok(())
}

fn spawn_drone<R: Rng + ?Sized>(index: usize, config: &AirspaceConfig, rng: &mut R) -> DroneAgent {
    let column = (index % 4) as f64;
    let row = (index / 4) as f64;

    let start = Position::new(
        10.0 + column * 20.0 + rng.gen_range(0.0..10.0),
        10.0 + row * 25.0 + rng.gen_range(0.0..10.0),
        20.0 + rng.gen_range(0.0..30.0),
    );
    let target = Position::new(
        80.0 - start.x + rng.gen_range(0.0..20.0),
        80.0 - start.y + rng.gen_range(0.0..20.0),
        start.z + rng.gen_range(-10.0..10.0),
    );

    let speed = config.speed.sample(rng);
    let priority = *Priority::ALL.choose(rng).unwrap_or(&Priority::Medium);
    let intent = INTENTS.choose(rng).copied().unwrap_or(INTENTS[0]);
    let safety_radius = config.safety_radius.sample(rng);
    let battery_level = config.initial_battery.sample(rng);

    DroneAgent {
        id: AgentId::from_index(index),
        position: start,
        target,
        speed,
        priority,
        status: AgentStatus::Active,
        intent: intent.to_string(),
        path_history: VecDeque::with_capacity(config.path_history_capacity),
        safety_radius,
        battery_level,
        negotiation_history: VecDeque::new(),
    }
}
