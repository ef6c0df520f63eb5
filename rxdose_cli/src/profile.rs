//! Patient profile storage.
//!
//! The recommendation engine never reads or writes profiles; the CLI keeps a
//! patient here between invocations and converts it to
//! [`PatientParameters`] per call.

use chrono::{DateTime, Utc};
use fs2::FileExt;
use rxdose_core::{Error, PatientParameters, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Medical conditions offered by the profile form
pub const KNOWN_CONDITIONS: &[&str] = &[
    "Hypertension",
    "Diabetes",
    "Heart Disease",
    "Asthma",
    "COPD",
    "Kidney Disease",
    "Liver Disease",
];

/// Drug allergies offered by the profile form
pub const KNOWN_ALLERGIES: &[&str] = &[
    "Penicillin",
    "NSAIDs",
    "ACE Inhibitors",
    "Sulfonamides",
    "Codeine",
];

/// A saved patient profile
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PatientProfile {
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: u32,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    pub saved_at: DateTime<Utc>,
}

impl PatientProfile {
    pub fn patient_parameters(&self) -> PatientParameters {
        PatientParameters::new(f64::from(self.age), self.weight_kg)
    }
}

/// Key-value store for patient profiles
pub trait ProfileStore {
    fn get(&self, key: &str) -> Result<Option<PatientProfile>>;
    fn put(&mut self, key: &str, profile: PatientProfile) -> Result<()>;
}

/// In-process store, lost when dropped
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub struct MemoryProfileStore {
    profiles: BTreeMap<String, PatientProfile>,
}

#[cfg(test)]
impl ProfileStore for MemoryProfileStore {
    fn get(&self, key: &str) -> Result<Option<PatientProfile>> {
        Ok(self.profiles.get(key).cloned())
    }

    fn put(&mut self, key: &str, profile: PatientProfile) -> Result<()> {
        self.profiles.insert(key.to_string(), profile);
        Ok(())
    }
}

/// Profiles kept in a single JSON file
///
/// A sidecar `<file>.lock` serializes access: reads hold it shared, and a
/// `put` holds it exclusively across the whole read-modify-write. The data
/// file itself is replaced by renaming a synced temp file over it.
#[derive(Clone, Debug)]
pub struct JsonProfileStore {
    path: PathBuf,
}

impl JsonProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".lock");
        PathBuf::from(name)
    }

    fn open_lock(&self) -> Result<File> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| Error::Profile(format!("{:?} has no parent directory", self.path)))?;
        std::fs::create_dir_all(parent)?;

        Ok(OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())?)
    }

    /// Read every profile; caller must hold the lock
    ///
    /// A missing file is empty. An unreadable or corrupted file logs a
    /// warning and is treated as empty.
    fn read_unlocked(&self) -> BTreeMap<String, PatientProfile> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No profile file at {:?}", self.path);
                return BTreeMap::new();
            }
            Err(e) => {
                tracing::warn!("Failed to read profile file {:?}: {}", self.path, e);
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(profiles) => profiles,
            Err(e) => {
                tracing::warn!(
                    "Failed to parse profile file {:?}: {}. Ignoring saved profiles.",
                    self.path,
                    e
                );
                BTreeMap::new()
            }
        }
    }

    /// Atomically replace the data file; caller must hold the lock exclusively
    fn write_unlocked(&self, profiles: &BTreeMap<String, PatientProfile>) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| Error::Profile(format!("{:?} has no parent directory", self.path)))?;

        let temp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, profiles)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} profile(s) to {:?}", profiles.len(), self.path);
        Ok(())
    }
}

impl ProfileStore for JsonProfileStore {
    fn get(&self, key: &str) -> Result<Option<PatientProfile>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let lock = self.open_lock()?;
        lock.lock_shared()?;
        let mut profiles = self.read_unlocked();
        lock.unlock()?;

        Ok(profiles.remove(key))
    }

    fn put(&mut self, key: &str, profile: PatientProfile) -> Result<()> {
        let lock = self.open_lock()?;
        lock.lock_exclusive()?;

        let mut profiles = self.read_unlocked();
        profiles.insert(key.to_string(), profile);
        let written = self.write_unlocked(&profiles);

        lock.unlock()?;
        written
    }
}
