use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read store registry at {path}: {source}")]
    StoreRegistryIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse store registry: {0}")]
    StoreRegistryParse(#[from] csv::Error),

    #[error("invalid trigger schedule \"{spec}\": {reason}")]
    InvalidSchedule { spec: String, reason: String },

    #[error("validation error: {0}")]
    Validation(String),
}
