use thiserror::Error;

/// Errors returned by the directory API client and the location resolver.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status. `message` is the provider's
    /// `error.message` when present, otherwise the raw response body.
    #[error("directory API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("invalid account id '{0}'")]
    InvalidAccount(String),

    #[error("pagination limit reached for {account}: exceeded {max_pages} pages")]
    PaginationLimit { account: String, max_pages: usize },
}
