//! Persistence layer.
//!
//! Stores the user's hidden result rows as a JSON file: a flat set of
//! opaque row keys (the dashboard builds them from start id, end id,
//! and quality). The file format carries a timestamp for debugging;
//! the keys themselves are never interpreted server-side.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// On-disk shape of the hidden item file.
#[derive(Debug, Serialize, Deserialize)]
struct HiddenFile {
    hidden: Vec<String>,
    updated_at: DateTime<Utc>,
}

/// Set of hidden row keys, kept in memory and flushed to disk on every
/// mutation.
pub struct HiddenItemStore {
    path: PathBuf,
    keys: RwLock<HashSet<String>>,
}

impl HiddenItemStore {
    /// Open the store, loading existing keys if the file exists.
    pub fn open(path: &str) -> Result<Self> {
        let keys = if Path::new(path).exists() {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read hidden items from {path}"))?;
            let file: HiddenFile = serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse hidden items from {path}"))?;
            info!(path, count = file.hidden.len(), "Hidden items loaded");
            file.hidden.into_iter().collect()
        } else {
            info!(path, "No hidden items file, starting empty");
            HashSet::new()
        };

        Ok(Self {
            path: PathBuf::from(path),
            keys: RwLock::new(keys),
        })
    }

    /// All hidden keys, sorted for a stable wire order.
    pub async fn all(&self) -> Vec<String> {
        let keys = self.keys.read().await;
        let mut out: Vec<String> = keys.iter().cloned().collect();
        out.sort();
        out
    }

    /// Hide a row key. Idempotent.
    pub async fn hide(&self, key: &str) -> Result<()> {
        let mut keys = self.keys.write().await;
        keys.insert(key.to_string());
        self.persist(&keys)
    }

    /// Unhide a row key. Returns whether it was present.
    pub async fn unhide(&self, key: &str) -> Result<bool> {
        let mut keys = self.keys.write().await;
        let removed = keys.remove(key);
        self.persist(&keys)?;
        Ok(removed)
    }

    /// Drop all hidden keys.
    pub async fn clear(&self) -> Result<()> {
        let mut keys = self.keys.write().await;
        keys.clear();
        self.persist(&keys)
    }

    fn persist(&self, keys: &HashSet<String>) -> Result<()> {
        let mut hidden: Vec<String> = keys.iter().cloned().collect();
        hidden.sort();
        let file = HiddenFile {
            hidden,
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&file)
            .context("Failed to serialise hidden items")?;
        std::fs::write(&self.path, &json)
            .with_context(|| format!("Failed to write hidden items to {}", self.path.display()))?;
        debug!(path = %self.path.display(), count = keys.len(), "Hidden items saved");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
