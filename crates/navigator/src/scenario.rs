//! Declarative YAML navigation scenarios

use serde::{Deserialize, Serialize};
use std::path::Path;

use snapnav_common::Instruction;
use tracing::info;

use crate::backend::Backend;
use crate::error::{NavError, NavResult};
use crate::navigator::{Navigator, SnapshotTarget};
use crate::pacing::{checked_seconds, Pacing};

/// A navigation scenario parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Test name, also the snapshot directory name
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Instructions for a navigate-and-compare run
    #[serde(default)]
    pub instructions: Vec<Instruction>,

    /// Settle times, in seconds
    #[serde(default)]
    pub pacing: Pacing,

    /// Poll for a text instead of replaying `instructions`
    #[serde(default)]
    pub until_text: Option<UntilText>,

    /// Whether screens are captured and compared
    #[serde(default = "default_snapshots")]
    pub snapshots: bool,
}

fn default_snapshots() -> bool {
    true
}

/// Text polling step of a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UntilText {
    pub text: String,

    /// Repeated until the text shows up
    #[serde(default)]
    pub ongoing: Option<Instruction>,

    /// Run once the text shows up
    #[serde(default)]
    pub validation: Option<Instruction>,

    /// Seconds; the navigator's configured default when absent
    #[serde(default)]
    pub timeout: Option<f64>,
}

impl Scenario {
    /// Parse a scenario from a YAML string
    pub fn from_yaml(yaml: &str) -> NavResult<Self> {
        let scenario: Self = serde_yaml::from_str(yaml)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> NavResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load all scenarios from a directory, recursively
    pub fn load_all(dir: &Path) -> NavResult<Vec<Self>> {
        let mut scenarios = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            scenarios.push(Self::from_file(entry.path())?);
        }

        Ok(scenarios)
    }

    /// Filter scenarios by tag
    pub fn filter_by_tag<'a>(scenarios: &'a [Self], tag: &str) -> Vec<&'a Self> {
        scenarios.iter().filter(|s| s.tags.iter().any(|t| t == tag)).collect()
    }

    /// The test name ends up as a directory name, and every duration must be
    /// representable
    pub fn validate(&self) -> NavResult<()> {
        let name = self.name.trim();
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(NavError::InvalidConfig(format!(
                "scenario name '{}' is not a valid directory name",
                self.name
            )));
        }
        self.pacing.validate()?;
        if let Some(timeout) = self.until_text.as_ref().and_then(|u| u.timeout) {
            checked_seconds("until_text.timeout", timeout)?;
        }
        Ok(())
    }

    /// Run the scenario. Golden snapshots live under `golden_root`,
    /// captures under `temp_root`.
    pub fn run<B: Backend>(&self, navigator: &mut Navigator<B>, golden_root: &Path, temp_root: &Path) -> NavResult<()> {
        self.validate()?;
        info!("Running scenario '{}'", self.name);
        let target = self.snapshots.then(|| {
            SnapshotTarget::new(golden_root, self.name.clone()).with_temp_root(temp_root)
        });

        match &self.until_text {
            Some(until) => {
                let timeout = match until.timeout {
                    Some(secs) => checked_seconds("until_text.timeout", secs)?,
                    None => navigator.config().text_timeout()?,
                };
                navigator.navigate_until_text_and_compare(
                    until.ongoing.as_ref(),
                    until.validation.as_ref(),
                    &until.text,
                    target.as_ref(),
                    timeout,
                )
            }
            None => navigator.navigate_and_compare(target.as_ref(), &self.instructions, self.pacing),
        }
    }
}
