//! Navigator configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{NavError, NavResult};
use crate::pacing::checked_seconds;

/// Environment variable that switches golden-run mode on
pub const GOLDEN_RUN_ENV: &str = "SNAPNAV_GOLDEN_RUN";

/// Navigator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Record reference snapshots instead of comparing against them
    pub golden_run: bool,

    /// Settle-time multipliers applied in golden-run mode
    pub golden_multipliers: GoldenMultipliers,

    /// Budget for retried snapshot comparisons, in seconds
    pub snapshot_timeout: f64,

    /// Default budget for text polling, in seconds
    pub text_timeout: f64,

    /// Wait slice when polling without an ongoing instruction, in seconds
    pub poll_interval: f64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            golden_run: false,
            golden_multipliers: GoldenMultipliers::default(),
            snapshot_timeout: 5.0,
            text_timeout: 30.0,
            poll_interval: 0.1,
        }
    }
}

/// Sleep multipliers for the first, middle, and last phases of a golden run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoldenMultipliers {
    pub first: f64,
    pub middle: f64,
    pub last: f64,
}

impl Default for GoldenMultipliers {
    fn default() -> Self {
        Self {
            first: 2.0,
            middle: 5.0,
            last: 2.0,
        }
    }
}

impl NavigatorConfig {
    /// Configuration recording golden snapshots
    pub fn golden() -> Self {
        Self {
            golden_run: true,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file, defaults if it does not exist
    pub fn load(path: &Path) -> NavResult<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> NavResult<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `SNAPNAV_GOLDEN_RUN` if set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var(GOLDEN_RUN_ENV) {
            self.golden_run = parse_flag(&value);
        }
        self
    }

    pub fn validate(&self) -> NavResult<()> {
        self.snapshot_timeout()?;
        self.text_timeout()?;
        self.poll_interval()?;

        let m = &self.golden_multipliers;
        for (name, value) in [("first", m.first), ("middle", m.middle), ("last", m.last)] {
            if !value.is_finite() || value < 1.0 {
                return Err(NavError::InvalidConfig(format!(
                    "golden multiplier '{}' must be at least 1.0, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn snapshot_timeout(&self) -> NavResult<Duration> {
        checked_seconds("snapshot_timeout", self.snapshot_timeout)
    }

    pub fn text_timeout(&self) -> NavResult<Duration> {
        checked_seconds("text_timeout", self.text_timeout)
    }

    pub fn poll_interval(&self) -> NavResult<Duration> {
        checked_seconds("poll_interval", self.poll_interval)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
