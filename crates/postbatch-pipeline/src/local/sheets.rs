use std::path::PathBuf;

use async_trait::async_trait;
use postbatch_ingest::{read_workbook, Grid};

use super::resolve_id;
use crate::error::StoreError;
use crate::ports::SheetEngine;

/// Reads workbooks under a storage root with calamine.
pub struct LocalSheets {
    root: PathBuf,
}

impl LocalSheets {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SheetEngine for LocalSheets {
    async fn read_grid(&self, file_id: &str) -> Result<Grid, StoreError> {
        let path = resolve_id(&self.root, file_id)?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StoreError::NotFound(file_id.to_string()));
        }

        tokio::task::spawn_blocking(move || read_workbook(&path))
            .await
            .map_err(|e| StoreError::Backend(format!("workbook reader task failed: {e}")))?
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_workbook_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let sheets = LocalSheets::new(dir.path());
        assert!(matches!(
            sheets.read_grid("inbox/menu.xlsx").await,
            Err(StoreError::NotFound(id)) if id == "inbox/menu.xlsx"
        ));
    }

    #[tokio::test]
    async fn unreadable_workbook_is_a_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("menu.xlsx"), b"not a zip archive").unwrap();

        let err = LocalSheets::new(dir.path())
            .read_grid("menu.xlsx")
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Backend(_)), "{err:?}");
    }
}
