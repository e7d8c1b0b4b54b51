//! Simulation clock.
//!
//! Owns the [`Airspace`] and a running flag. [`SimulationClock::advance`] is
//! what a timer calls on every cadence beat and only ticks while running;
//! [`SimulationClock::step`] ticks unconditionally, which is how a paused
//! simulation is single-stepped. The clock itself never sleeps; pacing
//! belongs to whoever drives it (see the `driver` module with the `async`
//! feature).

use crate::airspace::{Airspace, AirspaceSnapshot, TickReport};
use crate::config::AirspaceConfig;
use serde::{Deserialize, Serialize};
use skytwin_core::error::Result;
use std::time::Duration;
use tracing::info;

/// Snapshot of a clock and the airspace it drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub running: bool,
    #[serde(flatten)]
    pub airspace: AirspaceSnapshot,
}

/// Start/pause/reset control over one airspace.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    airspace: Airspace,
    running: bool,
}

impl SimulationClock {
    /// A running clock over a fresh airspace.
    pub fn new(config: AirspaceConfig) -> Result<Self> {
        Ok(Self::from_airspace(Airspace::new(config)?))
    }

    /// Wrap an existing airspace. The clock starts running.
    pub fn from_airspace(airspace: Airspace) -> Self {
        Self {
            airspace,
            running: true,
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            info!(tick = self.airspace.current_tick(), "simulation started");
        }
        self.running = true;
    }

    pub fn pause(&mut self) {
        if self.running {
            info!(tick = self.airspace.current_tick(), "simulation paused");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Tick if running.
    pub fn advance(&mut self) -> Option<TickReport> {
        self.running.then(|| self.airspace.tick())
    }

    /// Tick regardless of the running flag.
    pub fn step(&mut self) -> TickReport {
        self.airspace.tick()
    }

    /// Start a new run from `config`. The running flag is kept.
    ///
    /// An invalid config is rejected and the current run continues.
    pub fn reset(&mut self, config: AirspaceConfig) -> Result<()> {
        self.airspace.reset(config)?;
        info!(
            run = %self.airspace.run_id().0,
            agents = self.airspace.agents().len(),
            "simulation reset"
        );
        Ok(())
    }

    /// Start a new run with the current configuration.
    pub fn restart(&mut self) -> Result<()> {
        let config = self.airspace.config().clone();
        self.reset(config)
    }

    pub fn tick_interval(&self) -> Duration {
        self.airspace.config().tick_interval()
    }

    pub fn airspace(&self) -> &Airspace {
        &self.airspace
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            running: self.running,
            airspace: self.airspace.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> SimulationClock {
        SimulationClock::new(AirspaceConfig::compact().with_seed(5)).unwrap()
    }

    #[test]
    fn starts_running() {
        let mut clock = clock();
        assert!(clock.is_running());
        assert!(clock.advance().is_some());
        assert_eq!(clock.airspace().current_tick(), 1);
    }

    #[test]
    fn paused_clock_does_not_advance() {
        let mut clock = clock();
        clock.pause();
        assert!(clock.advance().is_none());
        assert!(clock.advance().is_none());
        assert_eq!(clock.airspace().current_tick(), 0);
    }

    #[test]
    fn step_ticks_while_paused() {
        let mut clock = clock();
        clock.pause();
        let report = clock.step();
        assert_eq!(report.tick, 1);
        assert!(!clock.is_running());
    }

    #[test]
    fn reset_keeps_running_flag() {
        let mut clock = clock();
        clock.pause();
        clock.step();
        clock.reset(AirspaceConfig::default().with_seed(1)).unwrap();
        assert!(!clock.is_running());
        assert_eq!(clock.airspace().current_tick(), 0);
        assert_eq!(clock.airspace().agents().len(), 12);
    }

    #[test]
    fn restart_reuses_config() {
        let mut clock = clock();
        for _ in 0..4 {
            clock.advance();
        }
        let run = clock.airspace().run_id();
        clock.restart().unwrap();
        assert_ne!(clock.airspace().run_id(), run);
        assert_eq!(clock.airspace().agents().len(), 6);
        assert_eq!(clock.tick_interval(), Duration::from_millis(100));
    }

    #[test]
    fn snapshot_flattens_airspace() {
        let clock = clock();
        let json = serde_json::to_value(clock.snapshot()).unwrap();
        assert_eq!(json["running"], true);
        assert_eq!(json["tick"], 0);
        assert_eq!(json["agents"].as_array().unwrap().len(), 6);
    }
}
