//! Async driver for the simulation clock.
//!
//! Requires the `async` feature:
//! ```toml
//! skytwin-runtime = { version = "0.1", features = ["async"] }
//! ```
//!
//! [`spawn_clock`] moves a [`SimulationClock`] into a tokio task that is its
//! only owner. The task waits on a [`TickSource`] and a command channel;
//! every tick or command that changes state is followed by a fresh
//! [`ClockSnapshot`] on a `watch` channel, and each new event is sent on a
//! `broadcast` channel in creation order. Everything outside the task talks
//! to it through a [`ClockHandle`].
//!
//! # Example
//!
//! ```rust,ignore
//! use skytwin_runtime::clock::SimulationClock;
//! use skytwin_runtime::config::AirspaceConfig;
//! use skytwin_runtime::driver::{spawn_clock, TickTimer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AirspaceConfig::default();
//!     let timer = TickTimer::from_config(&config);
//!     let clock = SimulationClock::new(config).unwrap();
//!     let (handle, task) = spawn_clock(clock, timer);
//!
//!     let mut events = handle.subscribe();
//!     while let Ok(event) = events.recv().await {
//!         println!("{}: {}", event.id, event.description);
//!     }
//! }
//! ```

#![cfg(feature = "async")]

use crate::airspace::TickReport;
use crate::clock::{ClockSnapshot, SimulationClock};
use crate::config::AirspaceConfig;
use async_trait::async_trait;
use skytwin_core::error::{Result, SkyTwinError};
use skytwin_core::types::NegotiationEvent;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::debug;

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 1024;

/// Something that says when the next tick is due.
#[async_trait]
pub trait TickSource: Send {
    /// Wait for the next beat. `false` means no further beats will come.
    async fn next_tick(&mut self) -> bool;

    /// Change the cadence after a reset. Sources without a period ignore it.
    fn set_period(&mut self, _period: Duration) {}
}

/// Wall-clock cadence.
///
/// A late beat is followed by a full period rather than a burst of
/// catch-up ticks.
pub struct TickTimer {
    interval: Interval,
}

impl TickTimer {
    pub fn new(period: Duration) -> Self {
        Self::with_interval(tokio::time::interval(period))
    }

    fn with_interval(mut interval: Interval) -> Self {
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }

    pub fn from_config(config: &AirspaceConfig) -> Self {
        Self::new(config.tick_interval())
    }
}

#[async_trait]
impl TickSource for TickTimer {
    async fn next_tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }

    /// The first beat at the new period comes one full period from now.
    fn set_period(&mut self, period: Duration) {
        if period == self.interval.period() {
            return;
        }
        let start = tokio::time::Instant::now() + period;
        *self = Self::with_interval(tokio::time::interval_at(start, period));
        debug!(period_ms = period.as_millis() as u64, "tick period changed");
    }
}

/// Beats fired by hand through a [`ManualTrigger`].
pub struct ManualTicks {
    rx: mpsc::UnboundedReceiver<()>,
}

/// Fires beats for a [`ManualTicks`] source.
#[derive(Clone)]
pub struct ManualTrigger {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualTrigger {
    /// Queue one beat. Returns `false` once the source is gone.
    pub fn fire(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

/// A manual tick source and the trigger that feeds it.
pub fn manual_ticks() -> (ManualTrigger, ManualTicks) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ManualTrigger { tx }, ManualTicks { rx })
}

#[async_trait]
impl TickSource for ManualTicks {
    async fn next_tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}

enum ClockCommand {
    Start(oneshot::Sender<()>),
    Pause(oneshot::Sender<()>),
    Step(oneshot::Sender<TickReport>),
    /// `None` restarts with the current configuration.
    Reset(Option<AirspaceConfig>, oneshot::Sender<Result<()>>),
    Shutdown,
}

/// Cloneable handle to a running clock task.
#[derive(Clone)]
pub struct ClockHandle {
    cmd_tx: mpsc::Sender<ClockCommand>,
    snapshots: watch::Receiver<ClockSnapshot>,
    events: broadcast::Sender<NegotiationEvent>,
}

impl ClockHandle {
    async fn send(&self, cmd: ClockCommand) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| SkyTwinError::ClockStopped)
    }

    async fn request<T>(&self, cmd: impl FnOnce(oneshot::Sender<T>) -> ClockCommand) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.send(cmd(tx)).await?;
        rx.await.map_err(|_| SkyTwinError::ClockStopped)
    }

    /// Resume ticking on the tick source.
    pub async fn start(&self) -> Result<()> {
        self.request(ClockCommand::Start).await
    }

    /// Stop ticking. Beats that arrive while paused are dropped.
    pub async fn pause(&self) -> Result<()> {
        self.request(ClockCommand::Pause).await
    }

    /// Run exactly one tick, running or not.
    pub async fn step(&self) -> Result<TickReport> {
        self.request(ClockCommand::Step).await
    }

    /// Start a new run, from `config` or from the current configuration.
    pub async fn reset(&self, config: Option<AirspaceConfig>) -> Result<()> {
        self.request(|tx| ClockCommand::Reset(config, tx)).await?
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> ClockSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn watch_snapshots(&self) -> watch::Receiver<ClockSnapshot> {
        self.snapshots.clone()
    }

    /// Receive every event created after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<NegotiationEvent> {
        self.events.subscribe()
    }

    /// Ask the task to stop. Its join handle yields the clock back.
    pub async fn shutdown(&self) -> Result<()> {
        self.send(ClockCommand::Shutdown).await
    }
}

struct ClockDriver<S> {
    clock: SimulationClock,
    source: S,
    commands: mpsc::Receiver<ClockCommand>,
    snapshots: watch::Sender<ClockSnapshot>,
    events: broadcast::Sender<NegotiationEvent>,
}

impl<S: TickSource> ClockDriver<S> {
    async fn run(mut self) -> SimulationClock {
        let mut source_done = false;

        loop {
            tokio::select! {
                biased;

                cmd = self.commands.recv() => match cmd {
                    Some(ClockCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle(cmd),
                },

                more = self.source.next_tick(), if !source_done => {
                    if !more {
                        debug!("tick source exhausted");
                        source_done = true;
                    } else if let Some(report) = self.clock.advance() {
                        self.publish(&report);
                    }
                }
            }
        }

        debug!(tick = self.clock.airspace().current_tick(), "clock driver stopped");
        self.clock
    }

    fn handle(&mut self, cmd: ClockCommand) {
        match cmd {
            ClockCommand::Start(reply) => {
                self.clock.start();
                self.publish_snapshot();
                let _ = reply.send(());
            }
            ClockCommand::Pause(reply) => {
                self.clock.pause();
                self.publish_snapshot();
                let _ = reply.send(());
            }
            ClockCommand::Step(reply) => {
                let report = self.clock.step();
                self.publish(&report);
                let _ = reply.send(report);
            }
            ClockCommand::Reset(config, reply) => {
                let result = match config {
                    Some(config) => self.clock.reset(config),
                    None => self.clock.restart(),
                };
                if result.is_ok() {
                    let period = self.clock.airspace().config().tick_interval();
                    self.source.set_period(period);
                    self.publish_snapshot();
                }
                let _ = reply.send(result);
            }
            ClockCommand::Shutdown => {}
        }
    }

    fn publish(&self, report: &TickReport) {
        for event in &report.events {
            // No subscribers is fine.
            let _ = self.events.send(event.clone());
        }
        self.publish_snapshot();
    }

    fn publish_snapshot(&self) {
        self.snapshots.send_replace(self.clock.snapshot());
    }
}

/// Move `clock` into a new task driven by `source`.
pub fn spawn_clock<S>(clock: SimulationClock, source: S) -> (ClockHandle, JoinHandle<SimulationClock>)
where
    S: TickSource + 'static,
{
    let (cmd_tx, commands) = mpsc::channel(COMMAND_BUFFER);
    let (snapshot_tx, snapshots) = watch::channel(clock.snapshot());
    let (events, _) = broadcast::channel(EVENT_BUFFER);

    let driver = ClockDriver {
        clock,
        source,
        commands,
        snapshots: snapshot_tx,
        events: events.clone(),
    };
    let task = tokio::spawn(driver.run());

    (
        ClockHandle {
            cmd_tx,
            snapshots,
            events,
        },
        task,
    )
}
