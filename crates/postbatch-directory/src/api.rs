//! The directory API surface the pipeline depends on.

use async_trait::async_trait;

use crate::client::DirectoryClient;
use crate::error::DirectoryError;
use crate::types::{
    Account, CreateMediaRequest, LocalPost, LocalPostRequest, LocationsPage, MediaItem,
};

/// Operations the pipeline needs from the business directory.
///
/// [`DirectoryClient`] is the HTTP implementation; tests substitute
/// in-memory doubles.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    async fn list_accounts(&self) -> Result<Vec<Account>, DirectoryError>;

    async fn list_locations_page(
        &self,
        account_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<LocationsPage, DirectoryError>;

    async fn list_media(&self, location_name: &str) -> Result<Vec<MediaItem>, DirectoryError>;

    async fn create_local_post(
        &self,
        location_name: &str,
        request: &LocalPostRequest,
    ) -> Result<LocalPost, DirectoryError>;

    async fn create_media(
        &self,
        location_name: &str,
        request: &CreateMediaRequest,
    ) -> Result<MediaItem, DirectoryError>;
}

#[async_trait]
impl DirectoryApi for DirectoryClient {
    async fn list_accounts(&self) -> Result<Vec<Account>, DirectoryError> {
        DirectoryClient::list_accounts(self).await
    }

    async fn list_locations_page(
        &self,
        account_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<LocationsPage, DirectoryError> {
        DirectoryClient::list_locations_page(self, account_id, page_size, page_token).await
    }

    async fn list_media(&self, location_name: &str) -> Result<Vec<MediaItem>, DirectoryError> {
        DirectoryClient::list_media(self, location_name).await
    }

    async fn create_local_post(
        &self,
        location_name: &str,
        request: &LocalPostRequest,
    ) -> Result<LocalPost, DirectoryError> {
        DirectoryClient::create_local_post(self, location_name, request).await
    }

    async fn create_media(
        &self,
        location_name: &str,
        request: &CreateMediaRequest,
    ) -> Result<MediaItem, DirectoryError> {
        DirectoryClient::create_media(self, location_name, request).await
    }
}

/// Normalises an account id to its resource name.
///
/// Accepts `"123"` or `"accounts/123"` (surrounding whitespace and slashes
/// ignored) and returns `"accounts/123"`.
///
/// # Errors
///
/// Returns [`DirectoryError::InvalidAccount`] if the id is blank.
pub fn account_resource(account_id: &str) -> Result<String, DirectoryError> {
    let trimmed = account_id.trim().trim_matches('/');
    let bare = trimmed.strip_prefix("accounts/").unwrap_or(trimmed);
    if bare.is_empty() || bare.contains('/') {
        return Err(DirectoryError::InvalidAccount(account_id.to_string()));
    }
    Ok(format!("accounts/{bare}"))
}
