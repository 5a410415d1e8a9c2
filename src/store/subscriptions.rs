//! Subscription store.
//!
//! A JSON object on disk maps group ids to an enabled flag. Mutations
//! reload the file, change the map, and persist it before returning, all
//! under one lock.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{MapwatchError, Result};

/// File name of the subscription set inside the data directory.
pub const SUBSCRIPTIONS_FILE: &str = "subscriptions.json";

/// Durable set of subscribed group ids.
pub struct SubscriptionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SubscriptionStore {
    /// Open the store inside the given data directory, creating the
    /// directory if needed.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = data_dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            MapwatchError::Persistence(format!("failed to create data dir: {e}"))
        })?;

        Ok(Self {
            path: dir.join(SUBSCRIPTIONS_FILE),
            lock: Mutex::new(()),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Enable push notifications for a group.
    ///
    /// Returns `true` if the group was newly enabled, `false` if it was
    /// already subscribed. The full set is persisted before returning.
    pub async fn enable(&self, group_id: i64) -> Result<bool> {
        let _guard = self.lock.lock().await;

        let mut groups = self.read_map()?;
        if groups.get(&group_id).copied().unwrap_or(false) {
            return Ok(false);
        }
        groups.insert(group_id, true);
        self.write_map(&groups)?;
        Ok(true)
    }

    /// Disable push notifications for a group.
    ///
    /// Returns `true` if the group was removed, `false` if it was not
    /// subscribed.
    pub async fn disable(&self, group_id: i64) -> Result<bool> {
        let _guard = self.lock.lock().await;

        let mut groups = self.read_map()?;
        if groups.remove(&group_id).is_none() {
            return Ok(false);
        }
        self.write_map(&groups)?;
        Ok(true)
    }

    /// List enabled group ids in ascending order.
    pub async fn list(&self) -> Result<Vec<i64>> {
        let _guard = self.lock.lock().await;

        let groups = self.read_map()?;
        Ok(groups
            .into_iter()
            .filter(|(_, enabled)| *enabled)
            .map(|(group_id, _)| group_id)
            .collect())
    }

    /// Read the persisted map, creating it empty when absent and resetting
    /// it when corrupt.
    fn read_map(&self) -> Result<BTreeMap<i64, bool>> {
        if !self.path.exists() {
            let empty = BTreeMap::new();
            self.write_map(&empty)?;
            info!("created subscription file at {}", self.path.display());
            return Ok(empty);
        }

        let raw = fs::read_to_string(&self.path).map_err(|e| {
            MapwatchError::Persistence(format!("failed to read subscriptions: {e}"))
        })?;

        match serde_json::from_str(&raw) {
            Ok(groups) => Ok(groups),
            Err(e) => {
                warn!("subscription file is not valid JSON ({e}), resetting to empty set");
                let empty = BTreeMap::new();
                self.write_map(&empty)?;
                Ok(empty)
            }
        }
    }

    fn write_map(&self, groups: &BTreeMap<i64, bool>) -> Result<()> {
        let dir = self.path.parent().ok_or_else(|| {
            MapwatchError::Persistence("subscription path has no parent directory".to_string())
        })?;

        let content = serde_json::to_string(groups).map_err(|e| {
            MapwatchError::Persistence(format!("failed to encode subscriptions: {e}"))
        })?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| {
            MapwatchError::Persistence(format!("failed to create temp file: {e}"))
        })?;
        tmp.write_all(content.as_bytes()).map_err(|e| {
            MapwatchError::Persistence(format!("failed to write subscriptions: {e}"))
        })?;
        tmp.as_file_mut().sync_all().map_err(|e| {
            MapwatchError::Persistence(format!("failed to sync subscriptions: {e}"))
        })?;
        tmp.persist(&self.path).map_err(|e| {
            MapwatchError::Persistence(format!("failed to replace subscriptions: {e}"))
        })?;

        Ok(())
    }
}
