//! Temporary link-sharing of private images.
//!
//! The directory API fetches listing photos by URL, so an image has to be
//! link-viewable while the listing is created. [`ExposureManager::acquire`]
//! records the file's sharing state and opens it up;
//! [`ExposureManager::restore`] puts the recorded state back. Prefer
//! [`ExposureManager::with_exposure`], which pairs the two around a closure.

use std::future::Future;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::error::{ExposureError, StoreError};
use crate::ports::{FileStore, Sharing};

static URL_ID_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"/file/d/([A-Za-z0-9_-]+)").expect("valid file/d regex"),
        Regex::new(r"/d/([A-Za-z0-9_-]+)").expect("valid d regex"),
        Regex::new(r"[?&]id=([A-Za-z0-9_-]+)").expect("valid id query regex"),
    ]
});

static BARE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{20,}$").expect("valid bare id regex"));

/// Proof that an asset is currently exposed. Hand it back to
/// [`ExposureManager::restore`]; dropping it unrestored logs an error.
#[derive(Debug)]
pub struct ExposureHandle {
    asset_ref: String,
    asset_id: String,
    public_url: String,
    original: Sharing,
    restored: bool,
}

impl ExposureHandle {
    #[must_use]
    pub fn asset_ref(&self) -> &str {
        &self.asset_ref
    }

    #[must_use]
    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    #[must_use]
    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    /// Sharing state recorded before the asset was exposed.
    #[must_use]
    pub fn original_sharing(&self) -> Sharing {
        self.original
    }
}

impl Drop for ExposureHandle {
    fn drop(&mut self) {
        if !self.restored {
            tracing::error!(
                asset = %self.asset_ref,
                asset_id = %self.asset_id,
                "exposure handle dropped without restore; asset may remain shared"
            );
        }
    }
}

pub struct ExposureManager {
    store: Arc<dyn FileStore>,
    image_root: Option<String>,
    url_template: String,
}

impl ExposureManager {
    /// `url_template` must contain `{id}`; it is replaced with the asset id.
    #[must_use]
    pub fn new(
        store: Arc<dyn FileStore>,
        image_root: Option<String>,
        url_template: impl Into<String>,
    ) -> Self {
        Self {
            store,
            image_root,
            url_template: url_template.into(),
        }
    }

    /// Finds the file id an image reference points at.
    ///
    /// Tried in order: an id embedded in a share URL (which must be known
    /// to the store), a bare id the store knows, then a `folder/.../name` path below the image root.
    ///
    /// # Errors
    ///
    /// Returns [`ExposureError::Store`] if the store fails while walking a
    /// path.
    pub async fn resolve_asset(&self, asset_ref: &str) -> Result<Option<String>, ExposureError> {
        let reference = asset_ref.trim();
        if reference.is_empty() {
            return Ok(None);
        }

        if let Some(id) = id_from_url(reference) {
            return match self.store.get_file(&id).await {
                Ok(file) => Ok(Some(file.id)),
                Err(e) => {
                    tracing::debug!(asset = reference, error = %e, "share url names no known file");
                    Ok(None)
                }
            };
        }

        if BARE_ID.is_match(reference) {
            match self.store.get_file(reference).await {
                Ok(file) => return Ok(Some(file.id)),
                Err(e) => tracing::debug!(asset = reference, error = %e, "not a known file id"),
            }
        }

        let mut current = self
            .image_root
            .clone()
            .unwrap_or_else(|| self.store.root_folder_id());
        for segment in reference.split('/').filter(|s| !s.is_empty()) {
            let child = self
                .store
                .find_child(&current, segment)
                .await
                .map_err(|source| ExposureError::Store {
                    asset: reference.to_string(),
                    source,
                })?;
            match child {
                Some(file) => current = file.id,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Makes the referenced asset link-viewable and returns its handle.
    ///
    /// If opening up the sharing fails, the recorded state is written back
    /// before the error is returned.
    ///
    /// # Errors
    ///
    /// - [`ExposureError::AssetNotFound`] if the reference resolves to no file.
    /// - [`ExposureError::Store`] if reading or changing sharing fails.
    pub async fn acquire(&self, asset_ref: &str) -> Result<ExposureHandle, ExposureError> {
        let asset_id = self
            .resolve_asset(asset_ref)
            .await?
            .ok_or_else(|| ExposureError::AssetNotFound(asset_ref.trim().to_string()))?;

        let store_error = |source: StoreError| ExposureError::Store {
            asset: asset_ref.to_string(),
            source,
        };

        let original = self.store.sharing(&asset_id).await.map_err(store_error)?;
        if let Err(e) = self.store.set_sharing(&asset_id, Sharing::PUBLIC_VIEW).await {
            if let Err(restore_err) = self.store.set_sharing(&asset_id, original).await {
                tracing::warn!(
                    asset = asset_ref,
                    error = %restore_err,
                    "failed to restore sharing after a failed exposure"
                );
            }
            return Err(store_error(e));
        }

        tracing::debug!(asset = asset_ref, asset_id = %asset_id, "asset exposed");
        Ok(ExposureHandle {
            asset_ref: asset_ref.to_string(),
            public_url: self.url_template.replace("{id}", &asset_id),
            asset_id,
            original,
            restored: false,
        })
    }

    /// Writes the recorded sharing state back. Failures are logged, never
    /// returned. `None` is a no-op.
    pub async fn restore(&self, handle: Option<ExposureHandle>) {
        let Some(mut handle) = handle else {
            return;
        };

        match self
            .store
            .set_sharing(&handle.asset_id, handle.original)
            .await
        {
            Ok(()) => tracing::debug!(asset = %handle.asset_ref, "asset sharing restored"),
            Err(e) => tracing::warn!(
                asset = %handle.asset_ref,
                asset_id = %handle.asset_id,
                error = %e,
                "failed to restore asset sharing"
            ),
        }
        handle.restored = true;
    }

    /// Exposes `asset_ref`, runs `f` with its public URL, then restores the
    /// asset whether `f` succeeded or not.
    ///
    /// # Errors
    ///
    /// Returns the acquire error converted into `E` (in which case `f` never
    /// runs), or `f`'s own error.
    pub async fn with_exposure<T, E, F, Fut>(&self, asset_ref: &str, f: F) -> Result<T, E>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<ExposureError>,
    {
        let handle = self.acquire(asset_ref).await?;
        let result = f(handle.public_url().to_string()).await;
        self.restore(Some(handle)).await;
        result
    }
}

fn id_from_url(reference: &str) -> Option<String> {
    if !(reference.starts_with("http://") || reference.starts_with("https://")) {
        return None;
    }
    URL_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(reference))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
#[path = "exposure_test.rs"]
mod tests;
