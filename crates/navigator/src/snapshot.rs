//! Golden and temporary snapshot directories
//!
//! ```text
//! <base>/snapshots/<device>/<test_name>/00000.png, 00001.png, ...
//! <base>/snapshots-tmp/<device>/<test_name>/00000.png, ...
//! ```
//!
//! Golden directories hold the reference screens and are only written in
//! golden-run mode. Temporary directories receive every capture of the
//! current run and are emptied before each navigation.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{NavError, NavResult};

/// Root directory name for reference snapshots
pub const GOLDEN_DIR_NAME: &str = "snapshots";

/// Root directory name for snapshots captured during a run
pub const TEMP_DIR_NAME: &str = "snapshots-tmp";

/// Largest index representable by the 5-digit file name
pub const MAX_SNAPSHOT_INDEX: usize = 99_999;

/// Path of snapshot `index` inside `dir`: `dir/00042.png`.
///
/// Only indices up to [`MAX_SNAPSHOT_INDEX`] produce 5-digit names; larger
/// indices widen the name and must be rejected by callers (see
/// [`check_index`]).
pub fn snapshot_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("{:05}.png", index))
}

/// Reject indices that do not fit the 5-digit naming scheme
pub fn check_index(index: usize) -> NavResult<usize> {
    if index > MAX_SNAPSHOT_INDEX {
        return Err(NavError::SnapshotIndexOverflow(index));
    }
    Ok(index)
}

/// Snapshot directory layout for one device model
#[derive(Debug, Clone)]
pub struct SnapshotLayout {
    device: String,
}

impl SnapshotLayout {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    /// Golden or temporary directory for `test_name`. No I/O.
    pub fn resolve_dir(&self, base: &Path, test_name: &str, golden: bool) -> PathBuf {
        let root = if golden { GOLDEN_DIR_NAME } else { TEMP_DIR_NAME };
        base.join(root).join(&self.device).join(test_name)
    }

    /// Golden directory for `test_name`, created in golden-run mode.
    ///
    /// Outside golden-run mode the directory must already exist, otherwise
    /// there is nothing to compare against.
    pub fn ensure_golden_dir(&self, base: &Path, test_name: &str, golden_run: bool) -> NavResult<PathBuf> {
        let path = self.resolve_dir(base, test_name, true);
        if golden_run {
            if !path.is_dir() {
                info!("Creating golden snapshot directory {}", path.display());
                std::fs::create_dir_all(&path)?;
            }
        } else if !path.is_dir() {
            return Err(NavError::MissingGoldenDir { path });
        }
        Ok(path)
    }

    /// Temporary directory for `test_name`, created if needed and emptied of
    /// any file left by a previous run. Subdirectories are left untouched.
    pub fn reset_temp_dir(&self, base: &Path, test_name: &str) -> NavResult<PathBuf> {
        let path = self.resolve_dir(base, test_name, false);
        if !path.exists() {
            std::fs::create_dir_all(&path)?;
            return Ok(path);
        }

        let mut removed = 0usize;
        for entry in std::fs::read_dir(&path)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                std::fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        if removed > 0 {
            debug!("Removed {} stale snapshot(s) from {}", removed, path.display());
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    fn layout() -> SnapshotLayout {
        SnapshotLayout::new("nanos")
    }

    #[test_case(1, "00001.png")]
    #[test_case(11, "00011.png")]
    #[test_case(111, "00111.png")]
    #[test_case(1111, "01111.png")]
    #[test_case(11111, "11111.png")]
    #[test_case(0, "00000.png")]
    fn test_snapshot_path(index: usize, name: &str) {
        let dir = Path::new("not important");
        assert_eq!(snapshot_path(dir, index), dir.join(name));
    }

    #[test]
    fn test_check_index_bounds() {
        assert_eq!(check_index(MAX_SNAPSHOT_INDEX).unwrap(), MAX_SNAPSHOT_INDEX);
        assert!(matches!(
            check_index(MAX_SNAPSHOT_INDEX + 1),
            Err(NavError::SnapshotIndexOverflow(100_000))
        ));
    }

    #[test]
    fn test_resolve_dir() {
        let base = Path::new("/base");
        assert_eq!(
            layout().resolve_dir(base, "foo", true),
            PathBuf::from("/base/snapshots/nanos/foo")
        );
        assert_eq!(
            layout().resolve_dir(base, "foo", false),
            PathBuf::from("/base/snapshots-tmp/nanos/foo")
        );
    }

    #[test]
    fn test_ensure_golden_dir_creates_in_golden_run() {
        let tmp = TempDir::new().unwrap();
        let expected = tmp.path().join("snapshots").join("nanos").join("some_name");
        assert!(!expected.exists());

        let result = layout().ensure_golden_dir(tmp.path(), "some_name", true).unwrap();
        assert_eq!(result, expected);
        assert!(expected.is_dir());
    }

    #[test]
    fn test_ensure_golden_dir_existing_dir() {
        let tmp = TempDir::new().unwrap();
        let expected = tmp.path().join("snapshots").join("nanos").join("some_name");
        std::fs::create_dir_all(&expected).unwrap();

        for golden_run in [true, false] {
            let result = layout().ensure_golden_dir(tmp.path(), "some_name", golden_run).unwrap();
            assert_eq!(result, expected);
        }
    }

    #[test]
    fn test_ensure_golden_dir_missing_fails() {
        let tmp = TempDir::new().unwrap();
        let expected = tmp.path().join("snapshots").join("nanos").join("some_name");

        let err = layout().ensure_golden_dir(tmp.path(), "some_name", false).unwrap_err();
        assert!(matches!(err, NavError::MissingGoldenDir { ref path } if *path == expected));
        assert!(!expected.exists());
    }

    #[test]
    fn test_reset_temp_dir_creates_dir() {
        let tmp = TempDir::new().unwrap();
        let expected = tmp.path().join("snapshots-tmp").join("nanos").join("some_name");

        let result = layout().reset_temp_dir(tmp.path(), "some_name").unwrap();
        assert_eq!(result, expected);
        assert!(expected.is_dir());
    }

    #[test]
    fn test_reset_temp_dir_unlinks_files_only() {
        let tmp = TempDir::new().unwrap();
        let expected = tmp.path().join("snapshots-tmp").join("nanos").join("some_name");
        std::fs::create_dir_all(expected.join("nested")).unwrap();
        for name in ["first", "second"] {
            std::fs::write(expected.join(name), b"stale").unwrap();
        }

        let result = layout().reset_temp_dir(tmp.path(), "some_name").unwrap();
        assert_eq!(result, expected);
        assert!(expected.is_dir());
        assert!(!expected.join("first").exists());
        assert!(!expected.join("second").exists());
        assert!(expected.join("nested").is_dir());
    }
}
