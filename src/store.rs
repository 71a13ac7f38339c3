//! Medication list persistence: one JSON file, rewritten whole on every
//! change.
//!
//! The list is small (a person's active prescriptions, not a formulary),
//! so a full rewrite through a temp file beats incremental updates: the
//! file on disk is always either the old complete list or the new one.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CandidateRecord, Frequency, MedicationRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Medication name is required")]
    EmptyName,

    #[error("Failed to read medication file: {0}")]
    Load(#[source] std::io::Error),

    #[error("Failed to write medication file: {0}")]
    Persist(#[source] std::io::Error),
}

/// Where the in-memory list came from at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Parsed from an existing well-formed file.
    Persisted,
    /// No file yet; started from the seed prescriptions.
    Seeded,
    /// File existed but would not parse; it was removed and the seeds
    /// took its place.
    Recovered,
}

/// The medication list plus its backing file.
pub struct MedicationStore {
    path: PathBuf,
    records: Vec<MedicationRecord>,
    load_source: LoadSource,
}

impl MedicationStore {
    /// Open the store at `path`.
    ///
    /// A missing file is the first-run case and yields the seeds without
    /// writing anything; the file appears on the first change. A corrupt
    /// file is logged, deleted and replaced by the seeds so one bad write
    /// can never wedge the app.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let (records, load_source) = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Vec<MedicationRecord>>(&bytes) {
                Ok(records) => (records, LoadSource::Persisted),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Medication file is corrupt, replacing with seed data"
                    );
                    if let Err(e) = fs::remove_file(&path) {
                        tracing::warn!(error = %e, "Could not remove corrupt medication file");
                    }
                    (seed_records(), LoadSource::Recovered)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                (seed_records(), LoadSource::Seeded)
            }
            Err(e) => return Err(StoreError::Load(e)),
        };

        Ok(Self {
            path,
            records,
            load_source,
        })
    }

    pub fn list(&self) -> &[MedicationRecord] {
        &self.records
    }

    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    pub fn find(&self, id: &Uuid) -> Option<&MedicationRecord> {
        self.records.iter().find(|r| r.id == *id)
    }

    /// Append a confirmed candidate and persist the whole list.
    ///
    /// If the write fails the new record is rolled back, so memory and
    /// disk never disagree about what was saved.
    pub fn add(&mut self, candidate: CandidateRecord) -> Result<MedicationRecord, StoreError> {
        if candidate.name.trim().is_empty() {
            return Err(StoreError::EmptyName);
        }

        let record = MedicationRecord::from_candidate(candidate);
        self.records.push(record.clone());

        if let Err(e) = self.persist() {
            self.records.pop();
            return Err(e);
        }

        tracing::debug!(name = %record.name, count = self.records.len(), "Medication added");
        Ok(record)
    }

    /// Write the full list to disk through a temp file in the same
    /// directory, then rename over the target.
    fn persist(&self) -> Result<(), StoreError> {
        let parent = self.path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(parent).map_err(StoreError::Persist)?;

        let json = serde_json::to_vec_pretty(&self.records)
            .map_err(|e| StoreError::Persist(std::io::Error::other(e)))?;

        let mut temp = NamedTempFile::new_in(parent).map_err(StoreError::Persist)?;
        temp.write_all(&json).map_err(StoreError::Persist)?;
        temp.persist(&self.path)
            .map_err(|e| StoreError::Persist(e.error))?;

        Ok(())
    }
}

/// Starter prescriptions for a fresh install, so every screen has
/// something to show before the first scan.
fn seed_records() -> Vec<MedicationRecord> {
    vec![
        MedicationRecord {
            id: Uuid::new_v4(),
            name: "Amoxicillin".to_string(),
            dosage: "500mg".to_string(),
            quantity: 14,
            frequency: Frequency::EveryEightHours,
            refills: 2,
        },
        MedicationRecord {
            id: Uuid::new_v4(),
            name: "Lisinopril".to_string(),
            dosage: "10mg".to_string(),
            quantity: 30,
            frequency: Frequency::OnceDaily,
            refills: 0,
        },
    ]
}
