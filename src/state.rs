// src/state.rs

//! Installed-state store
//!
//! A single JSON array at `<data_dir>/installed.json` is the sole source of
//! truth for which mods are installed; it is never derived from filesystem
//! inspection. Every mutation is a full read-modify-write of the file,
//! which is safe under the single-writer model this tool assumes.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File holding the installed-mod records, relative to the data directory
const STATE_FILE: &str = "installed.json";

/// One installed mod
///
/// Serialized camelCase so state files written by earlier deployments of
/// this tool remain readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledEntry {
    pub full_name: String,
    pub name: String,
    pub owner: String,
    pub version: String,
    pub icon: String,
    /// RFC 3339 timestamp of when the install completed
    pub installed_at: String,
}

/// Durable record of installed mods
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Create a store backed by `<data_dir>/installed.json`
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(STATE_FILE),
        }
    }

    /// List all installed mods
    ///
    /// A missing state file is the initial state, not an error, and reads
    /// as an empty list.
    pub fn list(&self) -> Result<Vec<InstalledEntry>> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No state file at {}, treating as empty", self.path.display());
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a mod with this `Owner-Name` key is recorded as installed
    pub fn contains(&self, full_name: &str) -> Result<bool> {
        Ok(self.list()?.iter().any(|m| m.full_name == full_name))
    }

    /// Record a mod as installed
    ///
    /// Replaces any existing record with the same key, preserving the
    /// at-most-one-entry-per-mod invariant.
    pub fn add(&self, entry: InstalledEntry) -> Result<()> {
        let mut entries = self.list()?;
        entries.retain(|m| m.full_name != entry.full_name);
        entries.push(entry);
        self.save(&entries)
    }

    /// Remove a mod's record; returns false when it was not present
    pub fn remove(&self, full_name: &str) -> Result<bool> {
        let mut entries = self.list()?;
        let before = entries.len();
        entries.retain(|m| m.full_name != full_name);

        if entries.len() == before {
            return Ok(false);
        }

        self.save(&entries)?;
        Ok(true)
    }

    /// Overwrite the state file with the given entries
    fn save(&self, entries: &[InstalledEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
