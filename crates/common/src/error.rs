//! Error types shared across crates

use thiserror::Error;

/// Device name that matches no known model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown device model: {0}")]
pub struct UnknownDevice(pub String);
