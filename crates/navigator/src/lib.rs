//! Snapnav Navigator
//!
//! Replays navigation instructions on a device under test and checks each
//! resulting screen against reference ("golden") snapshots:
//! - Dispatches instructions to handlers registered per identifier
//! - Manages golden and temporary snapshot directories per device and test
//! - Paces steps with settle times, stretched when recording goldens
//! - Polls the screen for a text with a bounded timeout
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Navigator<B: Backend>                                       │
//! │    ├── navigate(instructions)                                │
//! │    ├── navigate_and_compare(target?, instructions, pacing)   │
//! │    ├── navigate_until_text_and_compare(ongoing, validation,  │
//! │    │                                   text, target?, timeout)│
//! │    └── navigate_until_snap(...)                              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  CallbackRegistry   InstructionId -> handler(backend, ins)   │
//! │  SnapshotLayout     <base>/snapshots[-tmp]/<device>/<test>/  │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Backend (+ TextComparable capability)                       │
//! │    ├── SimulatedBackend   scripted screen stream             │
//! │    └── PhysicalBackend    headless or operator viewer        │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod callbacks;
pub mod config;
pub mod error;
pub mod logging;
pub mod navigator;
pub mod pacing;
pub mod physical;
pub mod scenario;
pub mod simulated;
pub mod snapshot;

pub use backend::{Backend, TextComparable};
pub use callbacks::{Callback, CallbackRegistry};
pub use config::{GoldenMultipliers, NavigatorConfig};
pub use error::{NavError, NavResult};
pub use navigator::{Navigator, SnapshotTarget};
pub use pacing::{Pacing, Sleeper, ThreadSleeper};
pub use scenario::Scenario;
pub use snapshot::{snapshot_path, SnapshotLayout};

pub use snapnav_common::{Crop, Device, Firmware, Instruction, InstructionId};
