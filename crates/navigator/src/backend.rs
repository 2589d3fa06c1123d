//! Device backend contract
//!
//! The navigator only talks to the device under test through [`Backend`].
//! Backends that can read the current screen's text additionally expose
//! [`TextComparable`] through [`Backend::as_text_comparable`]; callers probe
//! for the capability instead of inspecting the concrete backend type.

use std::path::Path;
use std::time::Duration;

use snapnav_common::Crop;

use crate::error::NavResult;

/// Input and screen-capture primitives of a device under test
pub trait Backend {
    /// Touch the screen at `(x, y)`
    fn finger_touch(&mut self, x: u32, y: u32) -> NavResult<()>;

    fn right_click(&mut self) -> NavResult<()>;

    fn left_click(&mut self) -> NavResult<()>;

    fn both_click(&mut self) -> NavResult<()>;

    /// Compare the current screen with the reference at `golden`.
    ///
    /// When `tmp` is given the captured screen is written there. In golden
    /// mode the capture is recorded as the new reference and the call
    /// returns `true`.
    fn compare_screen_with_snapshot(
        &mut self,
        golden: &Path,
        crop: Option<Crop>,
        tmp: Option<&Path>,
        golden_run: bool,
    ) -> NavResult<bool>;

    /// Block until the screen content changes or `timeout` elapses.
    ///
    /// Backends without change detection return immediately.
    fn wait_for_screen_change(&mut self, timeout: Duration) -> NavResult<()>;

    /// Text-comparison capability, if this backend streams its screen content
    fn as_text_comparable(&mut self) -> Option<&mut dyn TextComparable> {
        None
    }
}

/// Backends able to search the current screen for text
pub trait TextComparable {
    /// `true` if `text` appears in the current screen's content
    fn compare_screen_with_text(&mut self, text: &str) -> NavResult<bool>;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn finger_touch(&mut self, x: u32, y: u32) -> NavResult<()> {
        (**self).finger_touch(x, y)
    }

    fn right_click(&mut self) -> NavResult<()> {
        (**self).right_click()
    }

    fn left_click(&mut self) -> NavResult<()> {
        (**self).left_click()
    }

    fn both_click(&mut self) -> NavResult<()> {
        (**self).both_click()
    }

    fn compare_screen_with_snapshot(
        &mut self,
        golden: &Path,
        crop: Option<Crop>,
        tmp: Option<&Path>,
        golden_run: bool,
    ) -> NavResult<bool> {
        (**self).compare_screen_with_snapshot(golden, crop, tmp, golden_run)
    }

    fn wait_for_screen_change(&mut self, timeout: Duration) -> NavResult<()> {
        (**self).wait_for_screen_change(timeout)
    }

    fn as_text_comparable(&mut self) -> Option<&mut dyn TextComparable> {
        (**self).as_text_comparable()
    }
}
