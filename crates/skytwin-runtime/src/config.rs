//! Simulation configuration.
//!
//! Every tunable parameter of the airspace lives here with its default.
//! A configuration is validated when an [`Airspace`](crate::airspace::Airspace)
//! is built or reset; an invalid one is rejected and the running simulation
//! is left untouched.

use rand::Rng;
use serde::{Deserialize, Serialize};
use skytwin_core::error::{Result, SkyTwinError};
use skytwin_core::types::Position;

/// Largest fleet a single run may hold.
pub const MAX_AGENT_COUNT: usize = 10_000;
/// Largest per-drone trail or negotiation history.
pub const MAX_HISTORY_CAPACITY: usize = 10_000;
/// Largest event log.
pub const MAX_EVENT_LOG_CAPACITY: usize = 100_000;
/// Slowest accepted cadence, one tick per hour.
pub const MAX_TICK_INTERVAL_MS: u64 = 3_600_000;

/// A half-open interval `[min, max)` used for sampling and bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Inclusive containment check.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Uniform sample. A degenerate range yields `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max > self.min {
            rng.gen_range(self.min..self.max)
        } else {
            self.min
        }
    }

    fn check(&self, field: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(SkyTwinError::invalid_config(
                field,
                format!("[{}, {})", self.min, self.max),
                "bounds must be finite",
            ));
        }
        if self.min > self.max {
            return Err(SkyTwinError::empty_range(field, self.min, self.max));
        }
        Ok(())
    }
}

/// An axis-aligned box in the airspace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub x: ValueRange,
    pub y: ValueRange,
    pub z: ValueRange,
}

impl Volume {
    pub const fn new(x: ValueRange, y: ValueRange, z: ValueRange) -> Self {
        Self { x, y, z }
    }

    pub fn contains(&self, p: &Position) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// Whether `other` lies entirely inside this volume.
    pub fn encloses(&self, other: &Volume) -> bool {
        self.x.min <= other.x.min
            && other.x.max <= self.x.max
            && self.y.min <= other.y.min
            && other.y.max <= self.y.max
            && self.z.min <= other.z.min
            && other.z.max <= self.z.max
    }

    /// A uniformly random point inside the volume.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        Position::new(self.x.sample(rng), self.y.sample(rng), self.z.sample(rng))
    }

    fn check(&self, field: &str) -> Result<()> {
        self.x.check(&format!("{}.x", field))?;
        self.y.check(&format!("{}.y", field))?;
        self.z.check(&format!("{}.z", field))
    }
}

/// Configuration for an airspace simulation.
///
/// Missing fields deserialize to their defaults, so a partial TOML or JSON
/// document is a valid override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirspaceConfig {
    /// Number of drones created at initialization (default: 12).
    pub agent_count: usize,
    /// Extent of the airspace exposed to renderers (default: x,y 0-100, z 15-70).
    pub world: Volume,
    /// Where new targets are drawn after an arrival (default: x,y 20-80, z 15-55).
    pub operating_volume: Volume,
    /// Ticks of horizontal projection used for conflict prediction (default: 5).
    pub lookahead_ticks: u32,
    /// Target cadence of the tick loop in milliseconds (default: 100).
    pub tick_interval_ms: u64,
    /// Remaining distance at or below which a drone has arrived (default: 2.0).
    pub arrival_threshold: f64,
    /// Trail length kept per drone (default: 20).
    pub path_history_capacity: usize,
    /// Event ids kept per drone (default: 10).
    pub negotiation_history_capacity: usize,
    /// Events retained in the log (default: 50).
    pub event_log_capacity: usize,
    /// Battery percentage lost per tick (default: 0.1).
    pub battery_drain_per_tick: f64,
    /// Speed drawn per drone at creation (default: 0.8-2.0).
    pub speed: ValueRange,
    /// Safety radius drawn per drone at creation (default: 8-12).
    pub safety_radius: ValueRange,
    /// Starting battery drawn per drone (default: 60-100).
    pub initial_battery: ValueRange,
    /// Seed for the simulation's random generator. `None` draws from entropy.
    pub seed: Option<u64>,
    /// Ground drones whose battery reaches zero (default: false).
    pub ground_on_depletion: bool,
}

impl Default for AirspaceConfig {
    fn default() -> Self {
        Self {
            agent_count: 12,
            world: Volume::new(
                ValueRange::new(0.0, 100.0),
                ValueRange::new(0.0, 100.0),
                ValueRange::new(15.0, 70.0),
            ),
            operating_volume: Volume::new(
                ValueRange::new(20.0, 80.0),
                ValueRange::new(20.0, 80.0),
                ValueRange::new(15.0, 55.0),
            ),
            lookahead_ticks: 5,
            tick_interval_ms: 100,
            arrival_threshold: 2.0,
            path_history_capacity: 20,
            negotiation_history_capacity: 10,
            event_log_capacity: 50,
            battery_drain_per_tick: 0.1,
            speed: ValueRange::new(0.8, 2.0),
            safety_radius: ValueRange::new(8.0, 12.0),
            initial_battery: ValueRange::new(60.0, 100.0),
            seed: None,
            ground_on_depletion: false,
        }
    }
}

impl AirspaceConfig {
    /// Reduced fleet for constrained displays.
    pub fn compact() -> Self {
        Self {
            agent_count: 6,
            ..Self::default()
        }
    }

    /// Same configuration with a fixed seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_agent_count(mut self, count: usize) -> Self {
        self.agent_count = count;
        self
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }

    /// Check every field. The first violation is returned.
    pub fn validate(&self) -> Result<()> {
        if self.agent_count == 0 {
            return Err(SkyTwinError::invalid_config(
                "agent_count",
                self.agent_count,
                "must be at least 1",
            ));
        }
        if self.agent_count > MAX_AGENT_COUNT {
            return Err(SkyTwinError::out_of_range(
                "agent_count",
                1.0,
                MAX_AGENT_COUNT as f64,
                self.agent_count as f64,
            ));
        }
        self.world.check("world")?;
        self.operating_volume.check("operating_volume")?;
        if !self.world.encloses(&self.operating_volume) {
            return Err(SkyTwinError::invalid_config(
                "operating_volume",
                format!("{:?}", self.operating_volume),
                "must lie inside world",
            ));
        }
        if self.lookahead_ticks == 0 {
            return Err(SkyTwinError::invalid_config(
                "lookahead_ticks",
                self.lookahead_ticks,
                "must be at least 1",
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(SkyTwinError::invalid_config(
                "tick_interval_ms",
                self.tick_interval_ms,
                "must be at least 1",
            ));
        }
        if self.tick_interval_ms > MAX_TICK_INTERVAL_MS {
            return Err(SkyTwinError::out_of_range(
                "tick_interval_ms",
                1.0,
                MAX_TICK_INTERVAL_MS as f64,
                self.tick_interval_ms as f64,
            ));
        }
        if !(self.arrival_threshold > 0.0 && self.arrival_threshold.is_finite()) {
            return Err(SkyTwinError::invalid_config(
                "arrival_threshold",
                self.arrival_threshold,
                "must be positive",
            ));
        }
        for (field, value, max) in [
            ("path_history_capacity", self.path_history_capacity, MAX_HISTORY_CAPACITY),
            (
                "negotiation_history_capacity",
                self.negotiation_history_capacity,
                MAX_HISTORY_CAPACITY,
            ),
            ("event_log_capacity", self.event_log_capacity, MAX_EVENT_LOG_CAPACITY),
        ] {
            if value == 0 {
                return Err(SkyTwinError::invalid_config(field, value, "must be at least 1"));
            }
            if value > max {
                return Err(SkyTwinError::out_of_range(field, 1.0, max as f64, value as f64));
            }
        }
        if !(self.battery_drain_per_tick >= 0.0 && self.battery_drain_per_tick.is_finite()) {
            return Err(SkyTwinError::invalid_config(
                "battery_drain_per_tick",
                self.battery_drain_per_tick,
                "must be non-negative",
            ));
        }
        self.speed.check("speed")?;
        if self.speed.min <= 0.0 {
            return Err(SkyTwinError::invalid_config(
                "speed",
                self.speed.min,
                "must be positive",
            ));
        }
        self.safety_radius.check("safety_radius")?;
        if self.safety_radius.min <= 0.0 {
            return Err(SkyTwinError::invalid_config(
                "safety_radius",
                self.safety_radius.min,
                "must be positive",
            ));
        }
        self.initial_battery.check("initial_battery")?;
        for value in [self.initial_battery.min, self.initial_battery.max] {
            if !(0.0..=100.0).contains(&value) {
                return Err(SkyTwinError::out_of_range("initial_battery", 0.0, 100.0, value));
            }
        }
        Ok(())
    }
}
