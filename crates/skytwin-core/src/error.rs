//! Error types for SkyTwin operations.
//!
//! The simulation has no external I/O; errors are invalid configuration
//! and lookups of agents that do not exist.

use thiserror::Error;

/// Result type for SkyTwin operations.
pub type Result<T> = std::result::Result<T, SkyTwinError>;

/// Errors that can occur during SkyTwin operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkyTwinError {
    /// Configuration rejected at construction or reset.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// No agent with this id in the current run.
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    /// The task driving the simulation clock has shut down.
    #[error("Simulation clock is not running")]
    ClockStopped,

    /// Serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SkyTwinError {
    fn from(e: serde_json::Error) -> Self {
        SkyTwinError::Serialization(e.to_string())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Invalid value.
    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Out of range.
    #[error("{field} out of range: {value} (must be {min}-{max})")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    /// A `[min, max)` range whose bounds are reversed or equal.
    #[error("{field} is an empty range: [{min}, {max})")]
    EmptyRange { field: String, min: f64, max: f64 },
}

// Convenience constructors
impl SkyTwinError {
    pub fn agent_not_found(id: impl ToString) -> Self {
        SkyTwinError::AgentNotFound(id.to_string())
    }

    pub fn invalid_config(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        SkyTwinError::Config(ConfigError::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        })
    }

    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, value: f64) -> Self {
        SkyTwinError::Config(ConfigError::OutOfRange {
            field: field.into(),
            min,
            max,
            value,
        })
    }

    pub fn empty_range(field: impl Into<String>, min: f64, max: f64) -> Self {
        SkyTwinError::Config(ConfigError::EmptyRange {
            field: field.into(),
            min,
            max,
        })
    }

    /// Whether this error came from configuration validation.
    pub fn is_config(&self) -> bool {
        matches!(self, SkyTwinError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_message_names_field() {
        let err = SkyTwinError::invalid_config("agent_count", 0, "must be at least 1");
        assert!(err.is_config());
        assert_eq!(
            err.to_string(),
            "Config error: Invalid value for agent_count: 0 (must be at least 1)"
        );
    }

    #[test]
    fn agent_not_found_is_not_config() {
        let err = SkyTwinError::agent_not_found("DRONE-099");
        assert!(!err.is_config());
        assert_eq!(err.to_string(), "Agent not found: DRONE-099");
    }
}
