//! Discrete-event simulation of customers checking out at a bank of
//! supermarket registers.
//!
//! The core lives in [`model`]: a time-ordered event schedule, random
//! variates for arrivals and service times, shortest-line routing across the
//! registers, and running statistics. A [`SimulationEngine`] processes one
//! event per `step()` and returns a [`Snapshot`] for whatever is presenting
//! the run.

pub mod config;
pub mod error;
pub mod logger;
pub mod model;

pub use config::{CustomerCount, SimulationConfig};
pub use error::SimulationError;
pub use logger::{LogLevel, Logger};
pub use model::customer::{Customer, CustomerId};
pub use model::engine::{EngineState, SimulationEngine, Snapshot};
pub use model::random::{RandomVariates, ScriptedUniforms, SeededUniforms, UniformSource};
pub use model::register::RegisterBank;
pub use model::schedule::{Event, EventKind, EventSchedule};
pub use model::statistics::{FinalStatistics, StatisticsAccumulator};
pub use model::time::{SimDuration, SimulationTime};
