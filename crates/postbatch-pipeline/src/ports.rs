//! Collaborator interfaces the processor is written against.
//!
//! Each trait has a local adapter in [`crate::local`]; tests use in-memory
//! doubles.

use async_trait::async_trait;
use postbatch_ingest::Grid;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::results::{LogEntry, RunSummary};

/// MIME type reported for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
}

impl StoredFile {
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }
}

/// Who can reach a file by link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    #[default]
    Private,
    AnyoneWithLink,
}

/// What link holders may do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    #[default]
    None,
    View,
    Edit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sharing {
    pub access: AccessLevel,
    pub permission: Permission,
}

impl Sharing {
    /// Link-viewable, the state a remote API needs to fetch a file by URL.
    pub const PUBLIC_VIEW: Self = Self {
        access: AccessLevel::AnyoneWithLink,
        permission: Permission::View,
    };
}

#[async_trait]
pub trait FileStore: Send + Sync {
    async fn get_file(&self, file_id: &str) -> Result<StoredFile, StoreError>;

    /// Direct children of `folder_id`, folders included.
    async fn list_files(&self, folder_id: &str) -> Result<Vec<StoredFile>, StoreError>;

    async fn find_child(
        &self,
        folder_id: &str,
        name: &str,
    ) -> Result<Option<StoredFile>, StoreError>;

    /// Returns the child folder `name`, creating it if needed.
    async fn ensure_folder(&self, parent_id: &str, name: &str) -> Result<StoredFile, StoreError>;

    /// Moves a file into `folder_id` and returns its new record.
    async fn move_file(&self, file_id: &str, folder_id: &str) -> Result<StoredFile, StoreError>;

    async fn sharing(&self, file_id: &str) -> Result<Sharing, StoreError>;

    async fn set_sharing(&self, file_id: &str, sharing: Sharing) -> Result<(), StoreError>;

    async fn read_text(&self, file_id: &str, encoding: &str) -> Result<String, StoreError>;

    /// Creates a native-spreadsheet copy of a legacy workbook. The caller
    /// owns the copy and must delete it.
    async fn convert_to_native(&self, file_id: &str) -> Result<StoredFile, StoreError>;

    async fn delete_file(&self, file_id: &str) -> Result<(), StoreError>;

    fn root_folder_id(&self) -> String;
}

#[async_trait]
pub trait SheetEngine: Send + Sync {
    /// First worksheet of a native spreadsheet as a grid.
    async fn read_grid(&self, file_id: &str) -> Result<Grid, StoreError>;
}

#[async_trait]
pub trait RunLogWriter: Send + Sync {
    /// Writes one run log into `folder_id` and returns the new file's id.
    async fn write_run_log(
        &self,
        folder_id: &str,
        title: &str,
        entries: &[LogEntry],
        summary: &RunSummary,
    ) -> Result<String, StoreError>;
}
