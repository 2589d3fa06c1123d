//! In-process simulated device
//!
//! [`SimulatedBackend`] streams a scripted list of screens. Inputs move
//! through the list, captures are written as PNG files, and the current
//! screen's text is available for text polling.

use std::path::Path;
use std::time::Duration;

use image::{DynamicImage, GenericImageView};
use sha2::{Digest, Sha256};
use snapnav_common::Crop;
use tracing::{debug, info};

use crate::backend::{Backend, TextComparable};
use crate::error::{NavError, NavResult};

/// One screen of the simulated device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// PNG-encoded screen content
    pub png: Vec<u8>,
    /// Text lines rendered on the screen
    pub text: Vec<String>,
}

impl Frame {
    pub fn new(png: Vec<u8>, text: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            png,
            text: text.into_iter().map(Into::into).collect(),
        }
    }

    /// Frame whose content is `image`, encoded as PNG
    pub fn from_image(image: &DynamicImage, text: impl IntoIterator<Item = impl Into<String>>) -> NavResult<Self> {
        let mut png = std::io::Cursor::new(Vec::new());
        image.write_to(&mut png, image::ImageOutputFormat::Png)?;
        Ok(Self::new(png.into_inner(), text))
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.text.iter().any(|line| line.contains(needle))
    }

    fn digest(&self) -> String {
        sha256_hex(&self.png)
    }
}

/// Input received by the simulated device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendEvent {
    RightClick,
    LeftClick,
    BothClick,
    Touch { x: u32, y: u32 },
}

/// Screen-streaming backend over a fixed list of frames.
///
/// Right clicks, both clicks, and touches advance to the next frame; left
/// clicks go back. Both stop at the ends of the list.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    frames: Vec<Frame>,
    current: usize,
    events: Vec<BackendEvent>,
}

impl SimulatedBackend {
    pub fn new(frames: Vec<Frame>) -> NavResult<Self> {
        if frames.is_empty() {
            return Err(NavError::Backend("simulated device needs at least one frame".to_string()));
        }
        Ok(Self {
            frames,
            current: 0,
            events: Vec::new(),
        })
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_frame(&self) -> &Frame {
        &self.frames[self.current]
    }

    /// Every input received so far, oldest first
    pub fn events(&self) -> &[BackendEvent] {
        &self.events
    }

    fn advance(&mut self) {
        if self.current + 1 < self.frames.len() {
            self.current += 1;
        }
    }

    fn go_back(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    fn matches_golden(&self, golden: &Path, crop: Option<Crop>) -> NavResult<bool> {
        if !golden.is_file() {
            debug!("No golden snapshot at {}", golden.display());
            return Ok(false);
        }

        let reference = std::fs::read(golden)?;
        match crop {
            None => Ok(sha256_hex(&reference) == self.current_frame().digest()),
            Some(crop) => {
                let actual = image::load_from_memory(&self.current_frame().png)?;
                let expected = image::load_from_memory(&reference)?;
                Ok(cropped_pixels(&actual, crop) == cropped_pixels(&expected, crop))
            }
        }
    }
}

impl Backend for SimulatedBackend {
    fn finger_touch(&mut self, x: u32, y: u32) -> NavResult<()> {
        self.events.push(BackendEvent::Touch { x, y });
        self.advance();
        Ok(())
    }

    fn right_click(&mut self) -> NavResult<()> {
        self.events.push(BackendEvent::RightClick);
        self.advance();
        Ok(())
    }

    fn left_click(&mut self) -> NavResult<()> {
        self.events.push(BackendEvent::LeftClick);
        self.go_back();
        Ok(())
    }

    fn both_click(&mut self) -> NavResult<()> {
        self.events.push(BackendEvent::BothClick);
        self.advance();
        Ok(())
    }

    fn compare_screen_with_snapshot(
        &mut self,
        golden: &Path,
        crop: Option<Crop>,
        tmp: Option<&Path>,
        golden_run: bool,
    ) -> NavResult<bool> {
        if let Some(tmp) = tmp {
            std::fs::write(tmp, &self.current_frame().png)?;
        }

        if golden_run {
            info!("Recording golden snapshot {}", golden.display());
            std::fs::write(golden, &self.current_frame().png)?;
            return Ok(true);
        }

        self.matches_golden(golden, crop)
    }

    fn wait_for_screen_change(&mut self, _timeout: Duration) -> NavResult<()> {
        // The screen only changes on input, so there is nothing to wait for.
        Ok(())
    }

    fn as_text_comparable(&mut self) -> Option<&mut dyn TextComparable> {
        Some(self as &mut dyn TextComparable)
    }
}

impl TextComparable for SimulatedBackend {
    fn compare_screen_with_text(&mut self, text: &str) -> NavResult<bool> {
        Ok(self.current_frame().contains_text(text))
    }
}

/// Hash bytes using SHA256
fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// RGBA bytes of `image` inside `crop`, clamped to the image bounds
fn cropped_pixels(image: &DynamicImage, crop: Crop) -> Vec<u8> {
    let (width, height) = image.dimensions();
    let left = crop.left.min(width);
    let upper = crop.upper.min(height);
    let right = crop.right.min(width).max(left);
    let lower = crop.lower.min(height).max(upper);
    image
        .crop_imm(left, upper, right - left, lower - upper)
        .to_rgba8()
        .into_raw()
}
