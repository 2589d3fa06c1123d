//! Snapnav Common Library
//!
//! Plain value types shared by the navigator and its backends: navigation
//! instructions, device models, and screen geometry.

pub mod error;
pub mod firmware;
pub mod instruction;
pub mod types;

pub use error::UnknownDevice;
pub use firmware::{Device, Firmware};
pub use instruction::{Instruction, InstructionId};
pub use types::*;

/// Snapnav version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
