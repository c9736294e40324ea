use postbatch_directory::DirectoryError;
use postbatch_ingest::IngestError;
use thiserror::Error;

/// Failures from a file-storage, spreadsheet or run-log collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid file id '{0}'")]
    InvalidId(String),

    #[error("unsupported text encoding '{0}'")]
    UnsupportedEncoding(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("sharing manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn io(path: impl std::fmt::Display, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound(path.to_string());
        }
        Self::Io {
            path: path.to_string(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExposureError {
    #[error("image not found: {0}")]
    AssetNotFound(String),

    #[error("could not change sharing of '{asset}': {source}")]
    Store {
        asset: String,
        #[source]
        source: StoreError,
    },
}

/// Why a single listing could not be published. Recorded against the row,
/// never propagated past it.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("image error: {0}")]
    Image(#[from] ExposureError),

    #[error("directory error: {0}")]
    Provider(#[from] DirectoryError),
}

/// Failures that end processing of one submission file.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("{0}")]
    FatalDocument(String),

    #[error("could not read submission: {0}")]
    Ingest(#[from] IngestError),

    #[error("failed to fetch locations: {0}")]
    DirectoryFetch(#[source] DirectoryError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to write run log: {0}")]
    RunLog(#[source] StoreError),
}
