//! Navigation engine
//!
//! A [`Navigator`] replays instruction sequences on a backend, and optionally
//! checks the screen against golden snapshots after each step:
//!
//! ```text
//! IDLE -> DISPATCHING -> (CAPTURING)? -> COMPARING? -> IDLE | FAILED
//! ```
//!
//! Snapshot indices are local to each navigation call and start at 0.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use snapnav_common::{Firmware, Instruction};
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::callbacks::CallbackRegistry;
use crate::config::{GoldenMultipliers, NavigatorConfig};
use crate::error::{NavError, NavResult};
use crate::pacing::{Pacing, Phase, Sleeper, ThreadSleeper};
use crate::snapshot::{check_index, snapshot_path, SnapshotLayout};

/// Where the snapshots of one test live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotTarget {
    /// Base directory holding `snapshots/`
    pub golden_root: PathBuf,
    /// Base directory holding `snapshots-tmp/`
    pub temp_root: PathBuf,
    pub test_name: String,
}

impl SnapshotTarget {
    /// Golden and temporary snapshots under the same base directory
    pub fn new(root: impl Into<PathBuf>, test_name: impl Into<String>) -> Self {
        let root = root.into();
        Self {
            golden_root: root.clone(),
            temp_root: root,
            test_name: test_name.into(),
        }
    }

    pub fn with_temp_root(mut self, temp_root: impl Into<PathBuf>) -> Self {
        self.temp_root = temp_root.into();
        self
    }
}

/// Resolved directories of a navigation session
#[derive(Debug, Clone)]
struct SnapshotDirs {
    golden: PathBuf,
    temp: PathBuf,
}

/// Drives instruction sequences through a backend
pub struct Navigator<B: Backend> {
    backend: B,
    firmware: Firmware,
    layout: SnapshotLayout,
    callbacks: CallbackRegistry,
    config: NavigatorConfig,
    sleeper: Box<dyn Sleeper>,
}

impl<B: Backend> Navigator<B> {
    /// Create a navigator with an explicit callback registry.
    ///
    /// Fails with [`NavError::InvalidConfig`] if `config` does not validate.
    pub fn new(
        backend: B,
        firmware: Firmware,
        callbacks: CallbackRegistry,
        config: NavigatorConfig,
    ) -> NavResult<Self> {
        config.validate()?;
        let layout = SnapshotLayout::new(firmware.device_name());
        Ok(Self {
            backend,
            firmware,
            layout,
            callbacks,
            config,
            sleeper: Box::new(ThreadSleeper),
        })
    }

    /// Create a navigator with the standard callbacks of `firmware`'s device
    pub fn for_firmware(backend: B, firmware: Firmware, config: NavigatorConfig) -> NavResult<Self> {
        let callbacks = CallbackRegistry::for_firmware(&firmware);
        Self::new(backend, firmware, callbacks, config)
    }

    /// Replace the sleeper used for settle times, retry pauses, and `Wait`
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn firmware(&self) -> &Firmware {
        &self.firmware
    }

    pub fn layout(&self) -> &SnapshotLayout {
        &self.layout
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn callbacks_mut(&mut self) -> &mut CallbackRegistry {
        &mut self.callbacks
    }

    pub fn is_golden_run(&self) -> bool {
        self.config.golden_run
    }

    /// Run each instruction's handler in order. No snapshot is taken.
    pub fn navigate(&mut self, instructions: &[Instruction]) -> NavResult<()> {
        for instruction in instructions {
            self.dispatch(instruction)?;
        }
        Ok(())
    }

    /// Navigate while checking the screen after every step.
    ///
    /// Sleeps `pacing.first`, then captures snapshot 0; runs each
    /// instruction followed by `pacing.instruction` and a capture; finally
    /// sleeps `pacing.last` and captures once more. Without a `target` the
    /// same sequence runs with no capture at all.
    pub fn navigate_and_compare(
        &mut self,
        target: Option<&SnapshotTarget>,
        instructions: &[Instruction],
        pacing: Pacing,
    ) -> NavResult<()> {
        pacing.validate()?;
        let dirs = target.map(|t| self.prepare_dirs(t)).transpose()?;
        let golden = self.golden_multipliers();
        let mut index = 0;

        if let Some(t) = target {
            info!("Navigating '{}' ({} instruction(s))", t.test_name, instructions.len());
        }

        self.settle(pacing.delay(Phase::First, golden.as_ref()));
        self.capture(dirs.as_ref(), &mut index)?;

        for instruction in instructions {
            self.dispatch(instruction)?;
            self.settle(pacing.delay(Phase::Middle, golden.as_ref()));
            self.capture(dirs.as_ref(), &mut index)?;
        }

        self.settle(pacing.delay(Phase::Last, golden.as_ref()));
        self.capture(dirs.as_ref(), &mut index)?;

        Ok(())
    }

    /// Repeat `ongoing` until `text` shows up on screen, then run `validation`.
    ///
    /// Without an ongoing instruction the loop waits for the screen to
    /// change between polls. Every screen observed after an input is
    /// captured when a `target` is given. Returns immediately when the
    /// backend cannot compare text.
    pub fn navigate_until_text_and_compare(
        &mut self,
        ongoing: Option<&Instruction>,
        validation: Option<&Instruction>,
        text: &str,
        target: Option<&SnapshotTarget>,
        timeout: Duration,
    ) -> NavResult<()> {
        if self.backend.as_text_comparable().is_none() {
            debug!("Backend cannot compare text, skipping wait for {:?}", text);
            return Ok(());
        }

        let dirs = target.map(|t| self.prepare_dirs(t)).transpose()?;
        let mut index = 0;
        let start = Instant::now();
        let mut polls = 0usize;

        loop {
            polls += 1;
            if self.screen_has_text(text)? {
                debug!("Found {:?} after {} poll(s)", text, polls);
                break;
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                warn!("Gave up waiting for {:?} after {} poll(s)", text, polls);
                return Err(NavError::Timeout {
                    what: format!("text {:?}", text),
                    timeout,
                });
            }

            match ongoing {
                Some(instruction) => self.dispatch(instruction)?,
                None => {
                    let slice = self.config.poll_interval()?.min(timeout - elapsed);
                    self.backend.wait_for_screen_change(slice)?;
                }
            }
            self.capture(dirs.as_ref(), &mut index)?;
        }

        if let Some(instruction) = validation {
            self.dispatch(instruction)?;
            self.capture(dirs.as_ref(), &mut index)?;
        }
        Ok(())
    }

    /// Repeat `ongoing` until the screen matches golden `last_snap`.
    ///
    /// The screen must first match golden `start_snap`. Both are file names
    /// inside the target's golden directory and must already exist; this
    /// never records references. Returns the number of `ongoing` dispatches.
    pub fn navigate_until_snap(
        &mut self,
        ongoing: &Instruction,
        validation: Option<&Instruction>,
        target: &SnapshotTarget,
        start_snap: &str,
        last_snap: &str,
        timeout: Duration,
    ) -> NavResult<usize> {
        let golden_dir = self.layout.ensure_golden_dir(&target.golden_root, &target.test_name, false)?;
        let start_path = golden_dir.join(start_snap);
        let last_path = golden_dir.join(last_snap);

        let snapshot_timeout = self.config.snapshot_timeout()?;
        if !self.compare_snap_with_timeout(&start_path, snapshot_timeout)? {
            return Err(NavError::StartSnapshotNotFound(start_path));
        }

        let start = Instant::now();
        let mut steps = 0usize;
        while !self.compare_snap_with_timeout(&last_path, Duration::ZERO)? {
            if start.elapsed() >= timeout {
                return Err(NavError::Timeout {
                    what: format!("snapshot {}", last_path.display()),
                    timeout,
                });
            }
            self.dispatch(ongoing)?;
            steps += 1;
        }
        debug!("Reached {} after {} step(s)", last_path.display(), steps);

        if let Some(instruction) = validation {
            self.dispatch(instruction)?;
        }
        Ok(steps)
    }

    /// Compare the screen with golden snapshot `index`, saving the capture
    /// as temp snapshot `index`.
    pub fn compare_snap(&mut self, golden_dir: &Path, temp_dir: &Path, index: usize) -> NavResult<()> {
        let index = check_index(index)?;
        let golden = snapshot_path(golden_dir, index);
        let temp = snapshot_path(temp_dir, index);

        let golden_run = self.config.golden_run;
        if self
            .backend
            .compare_screen_with_snapshot(&golden, None, Some(&temp), golden_run)?
        {
            debug!("Snapshot {:05} ok", index);
            Ok(())
        } else {
            warn!("Snapshot {:05} differs from {}", index, golden.display());
            Err(NavError::SnapshotMismatch {
                index,
                golden,
                temp: Some(temp),
            })
        }
    }

    /// Retry comparing the screen with `golden` until it matches or
    /// `timeout` has elapsed. At least one comparison is always made, and
    /// attempts are spaced by the configured poll interval.
    pub fn compare_snap_with_timeout(&mut self, golden: &Path, timeout: Duration) -> NavResult<bool> {
        let poll_interval = self.config.poll_interval()?;
        let start = Instant::now();
        loop {
            if self.backend.compare_screen_with_snapshot(golden, None, None, false)? {
                return Ok(true);
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Ok(false);
            }
            self.sleeper.sleep(poll_interval.min(timeout - elapsed));
        }
    }

    fn dispatch(&mut self, instruction: &Instruction) -> NavResult<()> {
        self.callbacks
            .dispatch(&mut self.backend, self.sleeper.as_mut(), instruction)
    }

    fn screen_has_text(&mut self, text: &str) -> NavResult<bool> {
        match self.backend.as_text_comparable() {
            Some(screen) => screen.compare_screen_with_text(text),
            None => Ok(false),
        }
    }

    fn prepare_dirs(&self, target: &SnapshotTarget) -> NavResult<SnapshotDirs> {
        let golden = self
            .layout
            .ensure_golden_dir(&target.golden_root, &target.test_name, self.config.golden_run)?;
        let temp = self.layout.reset_temp_dir(&target.temp_root, &target.test_name)?;
        Ok(SnapshotDirs { golden, temp })
    }

    fn capture(&mut self, dirs: Option<&SnapshotDirs>, index: &mut usize) -> NavResult<()> {
        if let Some(dirs) = dirs {
            self.compare_snap(&dirs.golden, &dirs.temp, *index)?;
            *index += 1;
        }
        Ok(())
    }

    fn golden_multipliers(&self) -> Option<GoldenMultipliers> {
        self.config.golden_run.then_some(self.config.golden_multipliers)
    }

    fn settle(&mut self, duration: Duration) {
        debug!("Settling for {:?}", duration);
        self.sleeper.sleep(duration);
    }
}
