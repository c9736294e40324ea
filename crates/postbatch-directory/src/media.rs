//! Location media endpoints for the directory API client.

use crate::client::DirectoryClient;
use crate::error::DirectoryError;
use crate::types::{CreateMediaRequest, ListMediaResponse, MediaItem};

/// Upper bound on media pages per location.
const MAX_MEDIA_PAGES: usize = 100;

impl DirectoryClient {
    /// Lists the media items attached to `location_name`, following
    /// pagination.
    ///
    /// # Errors
    ///
    /// - [`DirectoryError::Api`] on a non-2xx response.
    /// - [`DirectoryError::Http`] on network failure.
    /// - [`DirectoryError::Deserialize`] if the response shape is unexpected.
    /// - [`DirectoryError::PaginationLimit`] if the token never runs out.
    pub async fn list_media(&self, location_name: &str) -> Result<Vec<MediaItem>, DirectoryError> {
        let location = location_name.trim_matches('/');
        let mut items = Vec::new();
        let mut token: Option<String> = None;

        for _ in 0..MAX_MEDIA_PAGES {
            let mut url = self.endpoint(&format!("{location}/media"))?;
            if let Some(t) = &token {
                url.query_pairs_mut().append_pair("pageToken", t);
            }
            let page: ListMediaResponse = self
                .get_json(url, &format!("list media ({location})"))
                .await?;
            items.extend(page.media_items);

            token = page.next_page_token.filter(|t| !t.trim().is_empty());
            if token.is_none() {
                return Ok(items);
            }
        }

        Err(DirectoryError::PaginationLimit {
            account: location.to_string(),
            max_pages: MAX_MEDIA_PAGES,
        })
    }

    /// Registers a photo for `location_name`; the provider fetches it from
    /// `request.source_url`.
    ///
    /// # Errors
    ///
    /// - [`DirectoryError::Api`] if the provider rejects the media item.
    /// - [`DirectoryError::Http`] on network failure.
    /// - [`DirectoryError::Deserialize`] if the response shape is unexpected.
    pub async fn create_media(
        &self,
        location_name: &str,
        request: &CreateMediaRequest,
    ) -> Result<MediaItem, DirectoryError> {
        let location = location_name.trim_matches('/');
        let url = self.endpoint(&format!("{location}/media"))?;
        self.post_json(url, request, &format!("create media ({location})"))
            .await
    }
}
