//! Screen geometry

use serde::{Deserialize, Serialize};

/// Rectangular region of a screenshot.
///
/// Bounds follow the usual image convention: `left`/`upper` inclusive,
/// `right`/`lower` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crop {
    pub left: u32,
    pub upper: u32,
    pub right: u32,
    pub lower: u32,
}

impl Crop {
    pub const fn new(left: u32, upper: u32, right: u32, lower: u32) -> Self {
        Self { left, upper, right, lower }
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.lower.saturating_sub(self.upper)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}
