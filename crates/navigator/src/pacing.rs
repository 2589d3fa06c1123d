//! Settle-time pacing between navigation steps

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GoldenMultipliers;
use crate::error::{NavError, NavResult};

/// Blocking wall-clock delay, swappable so tests can observe requested sleeps
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// Sleeps the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Settle times of a navigate-and-compare run, in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    /// Before the initial snapshot
    pub first: f64,
    /// After each instruction
    pub instruction: f64,
    /// Before the final snapshot
    pub last: f64,
}

/// Which part of a run a sleep belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    First,
    Middle,
    Last,
}

impl Pacing {
    pub fn new(first: f64, instruction: f64, last: f64) -> Self {
        Self { first, instruction, last }
    }

    /// Every settle time must be a representable, non-negative duration
    pub fn validate(&self) -> NavResult<()> {
        checked_seconds("pacing.first", self.first)?;
        checked_seconds("pacing.instruction", self.instruction)?;
        checked_seconds("pacing.last", self.last)?;
        Ok(())
    }

    /// Delay for `phase`, stretched by the golden multipliers when recording
    pub fn delay(&self, phase: Phase, golden: Option<&GoldenMultipliers>) -> Duration {
        let (base, multiplier) = match phase {
            Phase::First => (self.first, golden.map(|m| m.first)),
            Phase::Middle => (self.instruction, golden.map(|m| m.middle)),
            Phase::Last => (self.last, golden.map(|m| m.last)),
        };
        seconds(base * multiplier.unwrap_or(1.0))
    }
}

/// Duration from float seconds, saturating: negative or NaN maps to zero,
/// anything too large for a `Duration` to `Duration::MAX`
pub(crate) fn seconds(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}

/// Duration from the float seconds of setting `name`, rejecting values that
/// are negative, NaN, or out of range
pub(crate) fn checked_seconds(name: &str, value: f64) -> NavResult<Duration> {
    if value.is_nan() || value < 0.0 {
        return Err(NavError::InvalidConfig(format!(
            "{} must be a non-negative number of seconds, got {}",
            name, value
        )));
    }
    Duration::try_from_secs_f64(value)
        .map_err(|e| NavError::InvalidConfig(format!("{} = {} seconds: {}", name, value, e)))
}
