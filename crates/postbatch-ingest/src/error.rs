use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("failed to read '{source_id}': {reason}")]
    ReadFailure { source_id: String, reason: String },

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
}
