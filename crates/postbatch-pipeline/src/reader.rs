//! Loads a submission file's grid from whichever collaborator holds it.

use postbatch_ingest::{Grid, IngestError, SourceFormat};

use crate::error::StoreError;
use crate::ports::{FileStore, SheetEngine, StoredFile};

/// Reads `file` into a grid according to its declared MIME type.
///
/// Legacy workbooks are converted to a temporary native copy first. The
/// copy is deleted whether or not the read succeeds; a failed delete is
/// logged and does not change the result.
///
/// # Errors
///
/// - [`IngestError::UnsupportedFormat`] for MIME types outside the three
///   supported kinds.
/// - [`IngestError::ReadFailure`] when a collaborator fails.
/// - [`IngestError::Csv`] for malformed CSV text.
pub async fn load_grid(
    store: &dyn FileStore,
    sheets: &dyn SheetEngine,
    file: &StoredFile,
) -> Result<Grid, IngestError> {
    let read_failure = |e: StoreError| IngestError::ReadFailure {
        source_id: file.name.clone(),
        reason: e.to_string(),
    };

    match SourceFormat::from_mime(&file.mime_type)? {
        SourceFormat::NativeSpreadsheet => sheets.read_grid(&file.id).await.map_err(read_failure),
        SourceFormat::DelimitedText => {
            let text = store
                .read_text(&file.id, "utf-8")
                .await
                .map_err(read_failure)?;
            Grid::from_csv_text(&text)
        }
        SourceFormat::LegacyBinary => {
            let converted = store
                .convert_to_native(&file.id)
                .await
                .map_err(read_failure)?;
            let grid = sheets.read_grid(&converted.id).await.map_err(read_failure);

            if let Err(e) = store.delete_file(&converted.id).await {
                tracing::warn!(
                    file = %file.name,
                    converted = %converted.id,
                    error = %e,
                    "failed to delete converted copy"
                );
            }
            grid
        }
    }
}
