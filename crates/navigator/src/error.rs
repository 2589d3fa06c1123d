//! Error types for navigation sessions

use std::path::PathBuf;
use std::time::Duration;

use snapnav_common::InstructionId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavError {
    #[error("No reference snapshots to compare against: {} does not exist", .path.display())]
    MissingGoldenDir { path: PathBuf },

    #[error("No callback registered for instruction {0}")]
    UnregisteredInstruction(InstructionId),

    #[error("Invalid arguments for instruction {id}: {reason}")]
    InvalidArguments { id: InstructionId, reason: String },

    #[error("Snapshot {index:05} does not match golden {}", .golden.display())]
    SnapshotMismatch {
        index: usize,
        golden: PathBuf,
        temp: Option<PathBuf>,
    },

    #[error("Snapshot index {0} exceeds the 5-digit file name range")]
    SnapshotIndexOverflow(usize),

    #[error("Screen never matched starting snapshot {}", .0.display())]
    StartSnapshotNotFound(PathBuf),

    #[error("Timeout after {timeout:?} waiting for: {what}")]
    Timeout { what: String, timeout: Duration },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type NavResult<T> = Result<T, NavError>;
