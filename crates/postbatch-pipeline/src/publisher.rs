//! Creates one listing per submission row.

use std::sync::Arc;

use postbatch_core::SubmissionRow;
use postbatch_directory::{build_local_post, DirectoryApi, LocalPostRequest, PostOptions};

use crate::error::PublishError;
use crate::exposure::ExposureManager;

pub struct Publisher {
    api: Arc<dyn DirectoryApi>,
    exposure: ExposureManager,
    options: PostOptions,
}

impl Publisher {
    #[must_use]
    pub fn new(api: Arc<dyn DirectoryApi>, exposure: ExposureManager, options: PostOptions) -> Self {
        Self {
            api,
            exposure,
            options,
        }
    }

    /// Publishes `row` under `location_name` and returns the created
    /// listing's resource name.
    ///
    /// A row with an image path has the image exposed for the duration of
    /// the call and restored afterwards, whatever the provider answers.
    ///
    /// # Errors
    ///
    /// - [`PublishError::Image`] if the image cannot be found or shared; the
    ///   listing is not submitted.
    /// - [`PublishError::Provider`] if the directory rejects the listing.
    pub async fn publish(
        &self,
        account_id: &str,
        location_name: &str,
        row: &SubmissionRow,
    ) -> Result<String, PublishError> {
        let image = row.image_path.trim();
        if image.is_empty() {
            let request = build_local_post(row, None, &self.options);
            return self.submit(account_id, location_name, row, &request).await;
        }

        self.exposure
            .with_exposure(image, |url| async move {
                let request = build_local_post(row, Some(&url), &self.options);
                self.submit(account_id, location_name, row, &request).await
            })
            .await
    }

    async fn submit(
        &self,
        account_id: &str,
        location_name: &str,
        row: &SubmissionRow,
        request: &LocalPostRequest,
    ) -> Result<String, PublishError> {
        let post = self.api.create_local_post(location_name, request).await?;
        tracing::info!(
            account = account_id,
            location = location_name,
            row = row.row_number,
            post = %post.name,
            "listing published"
        );
        Ok(post.name)
    }
}
