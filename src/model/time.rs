/// This module handles all time-related values for the simulation
///
/// Key concepts:
/// - SimulationTime: a point on the simulated clock (seconds since the store opened)
/// - SimDuration: a span of simulated time (service times, queue waits, opening hours)
///
/// The checkout model only ever needs whole seconds, so both are plain u64
/// counters. Nothing here reads the wall clock.
use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// A point in simulated time, measured in seconds since the operating period started
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimulationTime(pub u64);

impl SimulationTime {
    /// The moment the store opens
    pub const OPENING: SimulationTime = SimulationTime(0);

    pub fn new(seconds: u64) -> Self {
        SimulationTime(seconds)
    }

    pub fn as_seconds(&self) -> u64 {
        self.0
    }

    /// Time elapsed from `self` until `later`, zero if `later` is not later
    pub fn duration_until(&self, later: SimulationTime) -> SimDuration {
        SimDuration(later.0.saturating_sub(self.0))
    }

    /// The time point `duration` after this one
    /// Example: service start + time to serve = departure time
    pub fn after(&self, duration: SimDuration) -> SimulationTime {
        SimulationTime(self.0 + duration.0)
    }
}

impl fmt::Display for SimulationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_clock(f, self.0)
    }
}

/// A span of simulated time in whole seconds
///
/// In configuration files a duration is written as its parts, for example
/// `{"minutes": 6, "seconds": 15}` or `{"hours": 16}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "DurationParts", into = "DurationParts")]
pub struct SimDuration(u64);

impl SimDuration {
    pub const ZERO: SimDuration = SimDuration(0);

    pub fn from_seconds(seconds: u64) -> Self {
        SimDuration(seconds)
    }

    pub fn from_min_sec(minutes: u64, seconds: u64) -> Self {
        SimDuration(minutes * 60 + seconds)
    }

    pub fn from_hours(hours: u64) -> Self {
        SimDuration(hours * 3600)
    }

    pub fn as_seconds(&self) -> u64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn saturating_sub(&self, other: SimDuration) -> SimDuration {
        SimDuration(self.0.saturating_sub(other.0))
    }

    /// Integer mean over `count` samples, truncated to whole seconds.
    /// `None` when there is nothing to average over.
    pub fn checked_mean(&self, count: u64) -> Option<SimDuration> {
        self.0.checked_div(count).map(SimDuration)
    }
}

impl Add for SimDuration {
    type Output = SimDuration;

    fn add(self, rhs: SimDuration) -> SimDuration {
        SimDuration(self.0 + rhs.0)
    }
}

impl AddAssign for SimDuration {
    fn add_assign(&mut self, rhs: SimDuration) {
        self.0 += rhs.0;
    }
}

impl fmt::Display for SimDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_clock(f, self.0)
    }
}

/// hh:mm:ss, hours are not wrapped at 24
fn write_clock(f: &mut fmt::Formatter<'_>, total_seconds: u64) -> fmt::Result {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// On-disk form of a duration
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct DurationParts {
    #[serde(default, skip_serializing_if = "is_zero")]
    hours: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    minutes: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    seconds: u64,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

impl TryFrom<DurationParts> for SimDuration {
    type Error = String;

    fn try_from(parts: DurationParts) -> Result<Self, Self::Error> {
        if parts.hours > 0 && parts.minutes >= 60 {
            return Err(format!(
                "minutes must be below 60 when hours are given (got {})",
                parts.minutes
            ));
        }
        if (parts.hours > 0 || parts.minutes > 0) && parts.seconds >= 60 {
            return Err(format!(
                "seconds must be below 60 when minutes or hours are given (got {})",
                parts.seconds
            ));
        }
        parts
            .hours
            .checked_mul(3600)
            .and_then(|total| total.checked_add(parts.minutes.checked_mul(60)?))
            .and_then(|total| total.checked_add(parts.seconds))
            .map(SimDuration)
            .ok_or_else(|| "duration too large".to_string())
    }
}

impl From<SimDuration> for DurationParts {
    fn from(duration: SimDuration) -> Self {
        DurationParts {
            hours: duration.0 / 3600,
            minutes: (duration.0 % 3600) / 60,
            seconds: duration.0 % 60,
        }
    }
}
