//! Physical device backend
//!
//! A physical device cannot be driven or captured by the harness itself. An
//! optional [`Viewer`] (a GUI shown to the operator) relays the requested
//! inputs and confirms each expected screen. Without a viewer the backend is
//! headless: inputs are dropped and every comparison succeeds.

use std::path::{Path, PathBuf};
use std::time::Duration;

use image::DynamicImage;
use snapnav_common::{Crop, Firmware, InstructionId};
use tracing::{debug, info, warn};

use crate::backend::{Backend, TextComparable};
use crate::error::NavResult;

/// Operator-facing GUI process
pub trait Viewer {
    fn is_alive(&self) -> bool;

    fn start(&mut self) -> NavResult<()>;

    /// Stop the process. Must be safe to call on a stopped viewer.
    fn kill(&mut self);

    /// Ask the operator to perform a click
    fn ask_for_click(&mut self, click: InstructionId) -> NavResult<()>;

    /// Ask the operator to touch the screen at `(x, y)`
    fn ask_for_touch(&mut self, x: u32, y: u32) -> NavResult<()>;

    /// Ask the operator whether the device shows the `golden` screen
    fn check_screenshot(&mut self, golden: &Path) -> NavResult<bool>;

    /// Ask the operator whether the device shows `text`
    fn check_text(&mut self, text: &str) -> NavResult<bool>;
}

/// Text recognition over a screenshot
pub trait Ocr {
    /// Words found in `image`
    fn words(&self, image: &DynamicImage) -> NavResult<Vec<String>>;
}

/// Viewer started on first use and stopped when the session ends
pub struct ViewerSession {
    viewer: Box<dyn Viewer>,
}

impl ViewerSession {
    pub fn new(viewer: Box<dyn Viewer>) -> Self {
        Self { viewer }
    }

    /// The running viewer, started if needed
    pub fn get(&mut self) -> NavResult<&mut dyn Viewer> {
        if !self.viewer.is_alive() {
            info!("Starting viewer");
            self.viewer.start()?;
        }
        Ok(self.viewer.as_mut())
    }

    pub fn is_alive(&self) -> bool {
        self.viewer.is_alive()
    }

    pub fn stop(&mut self) {
        if self.viewer.is_alive() {
            info!("Stopping viewer");
            self.viewer.kill();
        }
    }
}

impl Drop for ViewerSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Backend for a physical device, optionally relayed through a viewer
pub struct PhysicalBackend {
    firmware: Firmware,
    session: Option<ViewerSession>,
    ocr: Option<Box<dyn Ocr>>,
    last_valid_snap: Option<PathBuf>,
}

impl PhysicalBackend {
    /// Backend without a viewer
    pub fn headless(firmware: Firmware) -> Self {
        Self {
            firmware,
            session: None,
            ocr: None,
            last_valid_snap: None,
        }
    }

    /// Backend relaying inputs and checks through `viewer`
    pub fn with_viewer(firmware: Firmware, viewer: Box<dyn Viewer>) -> Self {
        Self {
            firmware,
            session: Some(ViewerSession::new(viewer)),
            ocr: None,
            last_valid_snap: None,
        }
    }

    /// Use `ocr` to read text from the last confirmed snapshot
    pub fn with_ocr(mut self, ocr: Box<dyn Ocr>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    pub fn firmware(&self) -> &Firmware {
        &self.firmware
    }

    pub fn is_headless(&self) -> bool {
        self.session.is_none()
    }

    /// Golden snapshot the operator confirmed most recently
    pub fn last_valid_snap(&self) -> Option<&Path> {
        self.last_valid_snap.as_deref()
    }

    /// Stop the viewer, if one is running. Dropping the backend does the
    /// same.
    pub fn shutdown(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.stop();
        }
    }

    fn viewer(&mut self) -> NavResult<Option<&mut dyn Viewer>> {
        match self.session.as_mut() {
            Some(session) => Ok(Some(session.get()?)),
            None => Ok(None),
        }
    }

    fn click(&mut self, click: InstructionId) -> NavResult<()> {
        match self.viewer()? {
            Some(viewer) => viewer.ask_for_click(click),
            None => Ok(()),
        }
    }

    /// Search the last confirmed snapshot for `text` with OCR
    fn text_in_last_snapshot(&self, snap: &Path, ocr: &dyn Ocr, text: &str) -> NavResult<bool> {
        let mut image = image::open(snap)?;
        // OCR expects dark text on a light background.
        if self.firmware.device.is_nano() {
            image.invert();
        }
        let words = ocr.words(&image)?;
        debug!("OCR read {} word(s) from {}", words.len(), snap.display());
        Ok(words.iter().any(|word| word.contains(text)))
    }
}

impl Backend for PhysicalBackend {
    fn finger_touch(&mut self, x: u32, y: u32) -> NavResult<()> {
        match self.viewer()? {
            Some(viewer) => viewer.ask_for_touch(x, y),
            None => Ok(()),
        }
    }

    fn right_click(&mut self) -> NavResult<()> {
        self.click(InstructionId::RightClick)
    }

    fn left_click(&mut self) -> NavResult<()> {
        self.click(InstructionId::LeftClick)
    }

    fn both_click(&mut self) -> NavResult<()> {
        self.click(InstructionId::BothClick)
    }

    fn compare_screen_with_snapshot(
        &mut self,
        golden: &Path,
        _crop: Option<Crop>,
        _tmp: Option<&Path>,
        _golden_run: bool,
    ) -> NavResult<bool> {
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => return Ok(true),
        };

        if self.last_valid_snap.as_deref() == Some(golden) {
            debug!("{} already confirmed", golden.display());
            return Ok(true);
        }

        let confirmed = session.get()?.check_screenshot(golden)?;
        if confirmed {
            self.last_valid_snap = Some(golden.to_path_buf());
        } else {
            warn!("Operator rejected {}", golden.display());
            self.last_valid_snap = None;
        }
        Ok(confirmed)
    }

    fn wait_for_screen_change(&mut self, _timeout: Duration) -> NavResult<()> {
        Ok(())
    }
}

impl TextComparable for PhysicalBackend {
    fn compare_screen_with_text(&mut self, text: &str) -> NavResult<bool> {
        if self.is_headless() {
            return Ok(true);
        }

        if let (Some(snap), Some(ocr)) = (self.last_valid_snap.as_deref(), self.ocr.as_deref()) {
            return self.text_in_last_snapshot(snap, ocr, text);
        }

        match self.viewer()? {
            Some(viewer) => viewer.check_text(text),
            None => Ok(true),
        }
    }
}
