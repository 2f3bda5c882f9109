use thiserror::Error;

use crate::model::customer::CustomerId;
use crate::model::time::SimulationTime;

/// Errors raised while configuring or running a checkout simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Event schedule is empty")]
    EmptySchedule,

    /// Schedule and register lines disagree; the run cannot continue
    #[error(
        "Invariant violated for customer {customer} at {time}: {reason} (lines: {lines:?})"
    )]
    InvariantViolation {
        customer: CustomerId,
        time: SimulationTime,
        reason: String,
        lines: Vec<Vec<CustomerId>>,
    },

    #[error("Cannot {operation} while the engine is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Failed to read config: {0}")]
    ConfigRead(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
