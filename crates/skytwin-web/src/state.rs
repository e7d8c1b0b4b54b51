//! Application state for the web server.
//!
//! The simulation clock lives on its own task (see
//! `skytwin_runtime::driver`); handlers only ever talk to it through the
//! cloneable [`ClockHandle`].

use anyhow::Result;
use skytwin_core::types::NegotiationEvent;
use skytwin_runtime::clock::{ClockSnapshot, SimulationClock};
use skytwin_runtime::config::AirspaceConfig;
use skytwin_runtime::driver::{spawn_clock, ClockHandle, TickSource, TickTimer};
use tokio::sync::{broadcast, watch};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    clock: ClockHandle,
}

impl AppState {
    /// Spawn a clock ticking at the configured cadence.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: AirspaceConfig, paused: bool) -> Result<Self> {
        let timer = TickTimer::from_config(&config);
        let mut clock = SimulationClock::new(config)?;
        if paused {
            clock.pause();
        }
        Ok(Self::with_source(clock, timer))
    }

    /// Spawn `clock` on an arbitrary tick source.
    pub fn with_source<S: TickSource + 'static>(clock: SimulationClock, source: S) -> Self {
        let (clock, _task) = spawn_clock(clock, source);
        Self { clock }
    }

    pub fn clock(&self) -> &ClockHandle {
        &self.clock
    }

    /// Latest post-tick snapshot.
    pub fn snapshot(&self) -> ClockSnapshot {
        self.clock.snapshot()
    }

    /// Subscribe to new negotiation events.
    pub fn subscribe(&self) -> broadcast::Receiver<NegotiationEvent> {
        self.clock.subscribe()
    }

    pub fn watch_snapshots(&self) -> watch::Receiver<ClockSnapshot> {
        self.clock.watch_snapshots()
    }
}
