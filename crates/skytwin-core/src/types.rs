//! Shared types used across the SkyTwin crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The current tick of the simulation.
pub type Tick = u64;

/// Unique identifier for a simulated drone.
///
/// Rendered and serialized as `DRONE-001`; ordering is numeric, which the
/// negotiation tie-break relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct AgentId(pub u32);

impl AgentId {
    /// Id for the agent at a zero-based creation index.
    pub fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).map_or(u32::MAX, |i| i.saturating_add(1)))
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DRONE-{:03}", self.0)
    }
}

impl FromStr for AgentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("DRONE-").unwrap_or(s);
        digits
            .parse::<u32>()
            .map(AgentId)
            .map_err(|_| format!("not an agent id: {}", s))
    }
}

impl From<AgentId> for String {
    fn from(id: AgentId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for AgentId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Identifier of a negotiation event, a per-run sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EVT-{:06}", self.0)
    }
}

/// Identifier of one simulation run. A reset starts a new run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

/// A point in the 3-D airspace. `z` is altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2))
            .sqrt()
    }

    /// Distance in the x/y plane, ignoring altitude.
    pub fn horizontal_distance_to(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// This position shifted by the given deltas.
    pub fn offset(&self, dx: f64, dy: f64, dz: f64) -> Position {
        Position::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

/// Mission priority of a drone, or urgency of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn is_high(&self) -> bool {
        matches!(self, Priority::High)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        };
        f.write_str(s)
    }
}

/// Where a drone is in the negotiation state machine.
///
/// ```text
/// active -> negotiating -> rerouting -> active (on arrival)
///                       \-> active   (winner, after its motion step)
/// any non-resolved -> resolved       (battery depleted, when grounding is on)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Flying its mission and eligible for conflict detection.
    Active,
    /// Part of a conflict detected this tick.
    Negotiating,
    /// Yielded a negotiation and flying a biased target.
    Rerouting,
    /// Grounded. Terminal.
    Resolved,
}

impl AgentStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, AgentStatus::Active)
    }

    /// Whether the state machine permits moving from `self` to `next`.
    pub fn can_transition_to(&self, next: AgentStatus) -> bool {
        use AgentStatus::*;
        match (self, next) {
            (Resolved, _) => false,
            (_, Resolved) => true,
            (Active, Negotiating) => true,
            (Negotiating, Rerouting) | (Negotiating, Active) => true,
            (Rerouting, Active) => true,
            // Arrival reassigns the target and re-arms an already active agent.
            (Active, Active) => true,
            _ => false,
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentStatus::Active => "active",
            AgentStatus::Negotiating => "negotiating",
            AgentStatus::Rerouting => "rerouting",
            AgentStatus::Resolved => "resolved",
        };
        f.write_str(s)
    }
}

/// A simulated drone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneAgent {
    pub id: AgentId,
    pub position: Position,
    pub target: Position,
    /// Horizontal step length per tick. Vertical moves at half this rate.
    pub speed: f64,
    pub priority: Priority,
    pub status: AgentStatus,
    /// Mission label. Descriptive only.
    pub intent: String,
    /// Recent positions, oldest first.
    pub path_history: VecDeque<Position>,
    pub safety_radius: f64,
    /// 0.0..=100.0, never increases.
    pub battery_level: f64,
    /// Events this drone took part in, oldest first.
    pub negotiation_history: VecDeque<EventId>,
}

impl DroneAgent {
    /// An active, medium-priority drone with speed 1, safety radius 8 and a
    /// full battery. Adjust with the `with_*` builders.
    pub fn new(id: AgentId, position: Position, target: Position) -> Self {
        Self {
            id,
            position,
            target,
            speed: 1.0,
            priority: Priority::Medium,
            status: AgentStatus::Active,
            intent: String::new(),
            path_history: VecDeque::new(),
            safety_radius: 8.0,
            battery_level: 100.0,
            negotiation_history: VecDeque::new(),
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_safety_radius(mut self, radius: f64) -> Self {
        self.safety_radius = radius;
        self
    }

    pub fn with_battery(mut self, level: f64) -> Self {
        self.battery_level = level.clamp(0.0, 100.0);
        self
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = intent.into();
        self
    }

    /// 3-D distance left to the current target.
    pub fn remaining_distance(&self) -> f64 {
        self.position.distance_to(&self.target)
    }

    /// Horizontal distance left to the current target.
    pub fn horizontal_remaining(&self) -> f64 {
        self.position.horizontal_distance_to(&self.target)
    }

    /// Append a position to the trail, evicting the oldest past `capacity`.
    pub fn record_position(&mut self, position: Position, capacity: usize) {
        self.path_history.push_back(position);
        while self.path_history.len() > capacity {
            self.path_history.pop_front();
        }
    }

    /// Remember participation in an event, evicting the oldest past `capacity`.
    pub fn record_negotiation(&mut self, event: EventId, capacity: usize) {
        self.negotiation_history.push_back(event);
        while self.negotiation_history.len() > capacity {
            self.negotiation_history.pop_front();
        }
    }

    /// Move to `next` if the state machine allows it. Returns whether it did.
    pub fn transition(&mut self, next: AgentStatus) -> bool {
        if self.status.can_transition_to(next) {
            self.status = next;
            true
        } else {
            false
        }
    }
}

/// Kind of a negotiation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ConflictDetected,
    PathNegotiation,
    PriorityExchange,
    ResolutionComplete,
}

impl EventKind {
    /// Whether this kind closes out a detected conflict.
    pub fn is_resolution(&self) -> bool {
        matches!(self, EventKind::PathNegotiation | EventKind::PriorityExchange)
    }
}

/// An entry in the negotiation log. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationEvent {
    pub id: EventId,
    pub tick: Tick,
    pub timestamp: DateTime<Utc>,
    /// One or two agents, in detection order.
    pub participants: Vec<AgentId>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub description: String,
    /// Urgency of the event, independent of the agents' own priority.
    pub priority: Priority,
}

impl NegotiationEvent {
    pub fn involves(&self, agent: AgentId) -> bool {
        self.participants.contains(&agent)
    }
}
