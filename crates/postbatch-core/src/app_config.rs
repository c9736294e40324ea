use std::path::PathBuf;

/// Download URL template used when none is configured. `{id}` is replaced
/// with the resolved asset identifier.
pub const DEFAULT_ASSET_URL_TEMPLATE: &str = "https://drive.google.com/uc?export=download&id={id}";

#[derive(Clone)]
pub struct AppConfig {
    /// Bearer credential sent with every directory API call.
    pub access_token: String,
    pub directory_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Root of the local file store; file ids are paths relative to it.
    pub storage_root: PathBuf,
    /// Inbox folder id, relative to `storage_root`.
    pub inbox_folder: String,
    /// Folder that relative image paths are resolved against. `None` means
    /// the store root.
    pub image_root: Option<String>,
    pub store_registry_path: Option<PathBuf>,
    /// Pause between consecutive publish calls.
    pub row_delay_ms: u64,
    /// Pause between location listing pages.
    pub page_delay_ms: u64,
    pub asset_url_template: String,
    pub language_code: String,
    pub currency_code: String,
    pub log_level: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("access_token", &"[redacted]")
            .field("directory_base_url", &self.directory_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("storage_root", &self.storage_root)
            .field("inbox_folder", &self.inbox_folder)
            .field("image_root", &self.image_root)
            .field("store_registry_path", &self.store_registry_path)
            .field("row_delay_ms", &self.row_delay_ms)
            .field("page_delay_ms", &self.page_delay_ms)
            .field("asset_url_template", &self.asset_url_template)
            .field("language_code", &self.language_code)
            .field("currency_code", &self.currency_code)
            .field("log_level", &self.log_level)
            .finish()
    }
}
