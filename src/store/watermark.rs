//! Watermark store.
//!
//! Holds the last ranked instant already notified, as a single RFC3339
//! string on disk. Loading never fails on bad content: an unreadable value
//! is replaced with the epoch default and the cycle continues from there.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use chrono_tz::Tz;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::datetime::{epoch_default, parse_instant};
use crate::{MapwatchError, Result};

/// File name of the watermark inside the data directory.
pub const WATERMARK_FILE: &str = "watermark.txt";

/// Durable single-value store for the notification watermark.
pub struct WatermarkStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl WatermarkStore {
    /// Open the store inside the given data directory, creating the
    /// directory if needed.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = data_dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            MapwatchError::Persistence(format!("failed to create data dir: {e}"))
        })?;

        Ok(Self {
            path: dir.join(WATERMARK_FILE),
            lock: Mutex::new(()),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted watermark.
    ///
    /// An absent file is created with the epoch default; unparsable content
    /// is overwritten with the epoch default and logged, never surfaced as
    /// an error.
    pub async fn load(&self) -> Result<DateTime<Tz>> {
        let _guard = self.lock.lock().await;

        if !self.path.exists() {
            let initial = epoch_default();
            self.write_value(initial)?;
            info!("created watermark file at {}", self.path.display());
            return Ok(initial);
        }

        let raw = fs::read_to_string(&self.path).map_err(|e| {
            MapwatchError::Persistence(format!("failed to read watermark: {e}"))
        })?;

        match parse_instant(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!("watermark file is not a valid instant ({e}), resetting to default");
                let initial = epoch_default();
                self.write_value(initial)?;
                Ok(initial)
            }
        }
    }

    /// Persist a new watermark, replacing the previous value atomically.
    pub async fn save(&self, value: DateTime<Tz>) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.write_value(value)
    }

    fn write_value(&self, value: DateTime<Tz>) -> Result<()> {
        let dir = self.path.parent().ok_or_else(|| {
            MapwatchError::Persistence("watermark path has no parent directory".to_string())
        })?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| {
            MapwatchError::Persistence(format!("failed to create temp file: {e}"))
        })?;
        tmp.write_all(value.to_rfc3339().as_bytes()).map_err(|e| {
            MapwatchError::Persistence(format!("failed to write watermark: {e}"))
        })?;
        tmp.as_file_mut().sync_all().map_err(|e| {
            MapwatchError::Persistence(format!("failed to sync watermark: {e}"))
        })?;
        tmp.persist(&self.path).map_err(|e| {
            MapwatchError::Persistence(format!("failed to replace watermark: {e}"))
        })?;

        Ok(())
    }
}
