//! The airspace: one simulation run and its tick pipeline.
//!
//! Each tick runs, in order:
//! 1. conflict detection over end-of-previous-tick positions
//! 2. negotiation of every detected conflict
//! 3. motion of every drone, with target reassignment on arrival
//! 4. merge of the tick's events into the bounded log
//!
//! Only [`Airspace::tick`] mutates state. Readers take a
//! [`AirspaceSnapshot`], an owned copy of the settled post-tick state.

use crate::config::{AirspaceConfig, Volume};
use crate::detector::ConflictDetector;
use crate::event_log::EventLog;
use crate::motion::{MotionIntegrator, MotionSummary};
use crate::resolver::{NegotiationResolver, Resolution};
use crate::stats::AirspaceStats;
use crate::store::AgentStore;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use skytwin_core::error::{Result, SkyTwinError};
use skytwin_core::types::{AgentId, DroneAgent, NegotiationEvent, RunId, Tick};
use tracing::{debug, trace};

/// What happened during one tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    /// The tick that just completed.
    pub tick: Tick,
    pub resolutions: Vec<Resolution>,
    pub motion: MotionSummary,
    /// Events created this tick, oldest first.
    pub events: Vec<NegotiationEvent>,
}

impl TickReport {
    pub fn conflicts(&self) -> usize {
        self.resolutions.len()
    }
}

/// Owned, serializable view of an airspace after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirspaceSnapshot {
    pub run_id: RunId,
    pub tick: Tick,
    pub world: Volume,
    pub agents: Vec<DroneAgent>,
    /// Newest first.
    pub events: Vec<NegotiationEvent>,
}

/// A single simulation run.
#[derive(Debug, Clone)]
pub struct Airspace {
    config: AirspaceConfig,
    run_id: RunId,
    tick: Tick,
    store: AgentStore,
    log: EventLog,
    rng: ChaCha8Rng,
    detector: ConflictDetector,
    resolver: NegotiationResolver,
    motion: MotionIntegrator,
}

impl Airspace {
    /// Validate `config` and spawn its fleet.
    pub fn new(config: AirspaceConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = seeded_rng(&config);
        let store = AgentStore::spawn_fleet(&config, &mut rng);
        Ok(Self::assemble(config, store, rng))
    }

    /// Build an airspace around explicit drones instead of a spawned fleet.
    ///
    /// `config.agent_count` is ignored; the generator is still used for
    /// arrival targets.
    pub fn from_agents(config: AirspaceConfig, agents: Vec<DroneAgent>) -> Result<Self> {
        config.validate()?;
        if agents.is_empty() {
            return Err(SkyTwinError::invalid_config("agents", 0, "must be at least 1"));
        }
        let store = AgentStore::from_agents(agents)?;
        let rng = seeded_rng(&config);
        Ok(Self::assemble(config, store, rng))
    }

    fn assemble(config: AirspaceConfig, store: AgentStore, rng: ChaCha8Rng) -> Self {
        let run_id = RunId::new();
        debug!(run = %run_id.0, agents = store.len(), seed = ?config.seed, "airspace initialized");
        Self {
            detector: ConflictDetector::from_config(&config),
            resolver: NegotiationResolver::from_config(&config),
            motion: MotionIntegrator::from_config(&config),
            log: EventLog::new(config.event_log_capacity),
            run_id,
            tick: 0,
            store,
            rng,
            config,
        }
    }

    /// Run one full pipeline.
    pub fn tick(&mut self) -> TickReport {
        let tick = self.tick + 1;
        let mut batch = self.log.batch(tick);

        let conflicts = self.detector.scan(&mut self.store);
        let mut resolutions = Vec::with_capacity(conflicts.len());
        for conflict in &conflicts {
            self.detector.announce(&mut self.store, conflict, &mut batch);
            let (resolution, _) = self.resolver.resolve(&mut self.store, conflict, &mut batch);
            resolutions.push(resolution);
        }

        let motion = self.motion.advance(&mut self.store, &mut self.rng, &mut batch);
        let events = self.log.merge(batch);
        self.tick = tick;

        trace!(
            tick,
            conflicts = resolutions.len(),
            arrived = motion.arrived,
            events = events.len(),
            "tick complete"
        );

        TickReport {
            tick,
            resolutions,
            motion,
            events,
        }
    }

    /// Run `ticks` pipelines back to back.
    pub fn run(&mut self, ticks: u64) -> Vec<TickReport> {
        (0..ticks).map(|_| self.tick()).collect()
    }

    /// Replace this run with a fresh one built from `config`.
    ///
    /// On error the current run is left exactly as it was.
    pub fn reset(&mut self, config: AirspaceConfig) -> Result<()> {
        *self = Self::new(config)?;
        Ok(())
    }

    pub fn config(&self) -> &AirspaceConfig {
        &self.config
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Number of completed ticks.
    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn agents(&self) -> &[DroneAgent] {
        self.store.as_slice()
    }

    pub fn agent(&self, id: AgentId) -> Result<&DroneAgent> {
        self.store.get(id).ok_or_else(|| SkyTwinError::agent_not_found(id))
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn snapshot(&self) -> AirspaceSnapshot {
        AirspaceSnapshot {
            run_id: self.run_id,
            tick: self.tick,
            world: self.config.world,
            agents: self.store.to_vec(),
            events: self.log.to_vec(),
        }
    }

    pub fn stats(&self) -> AirspaceStats {
        AirspaceStats::from_parts(self.tick, self.store.as_slice(), &self.log.to_vec())
    }
}

fn seeded_rng(config: &AirspaceConfig) -> ChaCha8Rng {
    match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}
