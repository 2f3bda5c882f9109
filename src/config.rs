//! Run parameters for a checkout simulation, loadable from JSON.
//!
//! ```json
//! {
//!   "customers": { "poisson_mean": 600.0 },
//!   "operating_period": { "hours": 16 },
//!   "registers": 5,
//!   "expected_service_time": { "minutes": 6, "seconds": 15 },
//!   "minimum_service_time": { "minutes": 1 },
//!   "seed": 42
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::model::time::SimDuration;

/// Largest customer count, exact or as a Poisson mean
pub const MAX_CUSTOMERS: u32 = 1_000_000;
/// Longest operating period accepted: one leap year
pub const MAX_OPERATING_PERIOD_SECONDS: u64 = 366 * 24 * 3600;
/// Longest expected service time accepted: one day
pub const MAX_EXPECTED_SERVICE_SECONDS: u64 = 24 * 3600;

/// How many customers show up during the operating period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerCount {
    /// Exactly this many customers
    Exact(u32),
    /// Draw the count once from a Poisson distribution with this mean
    PoissonMean(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_customers")]
    pub customers: CustomerCount,
    #[serde(default = "default_operating_period")]
    pub operating_period: SimDuration,
    #[serde(default = "default_registers")]
    pub registers: usize,
    #[serde(default = "default_expected_service_time")]
    pub expected_service_time: SimDuration,
    #[serde(default = "default_minimum_service_time")]
    pub minimum_service_time: SimDuration,
    /// Fixed seed for a reproducible run; drawn from entropy when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_customers() -> CustomerCount {
    CustomerCount::PoissonMean(600.0)
}

fn default_operating_period() -> SimDuration {
    SimDuration::from_hours(16)
}

fn default_registers() -> usize {
    5
}

fn default_expected_service_time() -> SimDuration {
    SimDuration::from_min_sec(6, 15)
}

fn default_minimum_service_time() -> SimDuration {
    SimDuration::from_min_sec(1, 0)
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            customers: default_customers(),
            operating_period: default_operating_period(),
            registers: default_registers(),
            expected_service_time: default_expected_service_time(),
            minimum_service_time: default_minimum_service_time(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Read a config from a JSON file. The result is not validated yet.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every parameter before any simulation state is built
    ///
    /// The upper bounds keep every arrival and departure time, and the
    /// service time totals, far inside `u64` seconds.
    pub fn validate(&self) -> Result<(), SimulationError> {
        match self.customers {
            CustomerCount::PoissonMean(mean) => {
                if !(mean.is_finite() && mean > 0.0) {
                    return Err(invalid(format!(
                        "customer mean must be a positive number, got {}",
                        mean
                    )));
                }
                if mean > MAX_CUSTOMERS as f64 {
                    return Err(invalid(format!(
                        "customer mean {} exceeds the limit of {}",
                        mean, MAX_CUSTOMERS
                    )));
                }
            }
            CustomerCount::Exact(count) => {
                if count > MAX_CUSTOMERS {
                    return Err(invalid(format!(
                        "customer count {} exceeds the limit of {}",
                        count, MAX_CUSTOMERS
                    )));
                }
            }
        }
        if self.operating_period.is_zero() {
            return Err(invalid("operating period must be longer than zero"));
        }
        if self.operating_period.as_seconds() > MAX_OPERATING_PERIOD_SECONDS {
            return Err(invalid(format!(
                "operating period {} exceeds the limit of {}",
                self.operating_period,
                SimDuration::from_seconds(MAX_OPERATING_PERIOD_SECONDS)
            )));
        }
        if self.expected_service_time.as_seconds() > MAX_EXPECTED_SERVICE_SECONDS {
            return Err(invalid(format!(
                "expected service time {} exceeds the limit of {}",
                self.expected_service_time,
                SimDuration::from_seconds(MAX_EXPECTED_SERVICE_SECONDS)
            )));
        }
        if self.registers == 0 {
            return Err(invalid("at least one register is required"));
        }
        if self.expected_service_time <= self.minimum_service_time {
            return Err(invalid(format!(
                "expected service time {} must exceed the minimum {}",
                self.expected_service_time, self.minimum_service_time
            )));
        }
        Ok(())
    }

    /// Mean of the exponential part of a service time, in seconds
    pub fn service_time_spread(&self) -> SimDuration {
        self.expected_service_time
            .saturating_sub(self.minimum_service_time)
    }
}

fn invalid(message: impl Into<String>) -> SimulationError {
    SimulationError::InvalidConfiguration(message.into())
}
