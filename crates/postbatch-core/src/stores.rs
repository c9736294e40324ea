//! Per-store configuration registry.
//!
//! A CSV file with one row per directory location. Besides static settings
//! (account, folder, photo category) it carries the last successful upload
//! time and a status flag, both stamped by the pipeline after a publish.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Status written after a successful publish.
pub const STATUS_UPLOADED: &str = "uploaded";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub store_name: String,
    pub account_id: String,
    /// Bare location id (`456`) or fully-qualified name
    /// (`accounts/123/locations/456`).
    pub location_id: String,
    pub folder_id: String,
    pub photo_category: String,
    pub last_upload: Option<DateTime<Utc>>,
    pub status: String,
}

impl StoreRecord {
    /// Returns `true` if this record refers to `location_name`, comparing
    /// either the full name or its trailing `locations/{id}` segment.
    #[must_use]
    pub fn matches_location(&self, location_name: &str) -> bool {
        let own = self.location_id.trim();
        if own.is_empty() {
            return false;
        }
        if own == location_name {
            return true;
        }
        let own_id = own.rsplit('/').next().unwrap_or(own);
        location_name
            .rsplit_once("/locations/")
            .is_some_and(|(_, id)| id == own_id)
    }
}

/// Load and validate the store registry from a CSV file with a header row.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_store_registry(path: &Path) -> Result<Vec<StoreRecord>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StoreRegistryIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for record in reader.deserialize::<StoreRecord>() {
        records.push(record?);
    }

    validate_stores(&records)?;
    Ok(records)
}

/// Write the registry back to `path`, replacing its contents.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be written.
pub fn save_store_registry(path: &Path, records: &[StoreRecord]) -> Result<(), ConfigError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ConfigError::StoreRegistryIo {
            path: path.display().to_string(),
            source: e.into_error(),
        })?;

    std::fs::write(path, bytes).map_err(|e| ConfigError::StoreRegistryIo {
        path: path.display().to_string(),
        source: e,
    })
}

/// Stamp every record matching `location_name` as uploaded at `at`.
///
/// Returns the number of records updated.
pub fn mark_uploaded(records: &mut [StoreRecord], location_name: &str, at: DateTime<Utc>) -> usize {
    let mut updated = 0;
    for record in records.iter_mut().filter(|r| r.matches_location(location_name)) {
        record.last_upload = Some(at);
        STATUS_UPLOADED.clone_into(&mut record.status);
        updated += 1;
    }
    updated
}

fn validate_stores(records: &[StoreRecord]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for (idx, record) in records.iter().enumerate() {
        if record.location_id.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "store registry row {} ('{}') has no location_id",
                idx + 2,
                record.store_name
            )));
        }

        if !seen.insert(record.location_id.trim().to_string()) {
            return Err(ConfigError::Validation(format!(
                "duplicate location_id in store registry: '{}'",
                record.location_id
            )));
        }
    }

    Ok(())
}
