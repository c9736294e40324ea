//! Store-code lookup table built from a full location listing.
//!
//! The map is built once per submission file: accounts can differ between
//! files, and a listing may change between runs, so nothing is cached
//! across files.

use std::collections::HashMap;
use std::time::Duration;

use crate::api::{account_resource, DirectoryApi};
use crate::error::DirectoryError;

/// Locations requested per page.
pub const LOCATION_PAGE_SIZE: u32 = 100;

/// Maximum number of pages to fetch before returning an error.
/// Prevents infinite loops on cycling continuation tokens.
pub const MAX_LOCATION_PAGES: usize = 1000;

/// Store code → fully-qualified location name for one account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationMap {
    by_store_code: HashMap<String, String>,
    /// Locations seen without a store code.
    pub missing_store_code: usize,
    /// Locations whose store code was already taken by an earlier location.
    pub duplicate_store_code: usize,
}

impl LocationMap {
    /// Looks up the location for `store_code` (surrounding whitespace ignored).
    #[must_use]
    pub fn resolve(&self, store_code: &str) -> Option<&str> {
        self.by_store_code
            .get(store_code.trim())
            .map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_store_code.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_store_code.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_store_code
            .iter()
            .map(|(code, name)| (code.as_str(), name.as_str()))
    }

    /// Records one location. First store code wins; later duplicates and
    /// locations without a code are counted and logged.
    fn insert(&mut self, store_code: Option<&str>, location_name: &str) {
        let Some(code) = store_code.map(str::trim).filter(|c| !c.is_empty()) else {
            tracing::warn!(location = location_name, "location has no store code; excluded from lookup");
            self.missing_store_code += 1;
            return;
        };

        if let Some(existing) = self.by_store_code.get(code) {
            tracing::warn!(
                store_code = code,
                kept = %existing,
                ignored = location_name,
                "duplicate store code; keeping the first location"
            );
            self.duplicate_store_code += 1;
            return;
        }

        self.by_store_code
            .insert(code.to_string(), location_name.to_string());
    }
}

/// Pure lookup: the location registered for `store_code`, or `None` when no
/// location carries that code.
#[must_use]
pub fn resolve_location<'a>(map: &'a LocationMap, store_code: &str) -> Option<&'a str> {
    map.resolve(store_code)
}

/// Fetches every location of `account_id` and indexes them by store code.
///
/// Pages of [`LOCATION_PAGE_SIZE`] are requested until the provider stops
/// returning a continuation token. `page_delay_ms` is slept between pages
/// (not before the first).
///
/// **All-or-nothing semantics**: a failure on any page discards the pages
/// already fetched. A partial map would report real locations as missing.
///
/// # Errors
///
/// - [`DirectoryError::InvalidAccount`] if `account_id` is blank; no request
///   is made.
/// - Any error from [`DirectoryApi::list_locations_page`].
/// - [`DirectoryError::PaginationLimit`] after [`MAX_LOCATION_PAGES`] pages.
pub async fn build_location_map(
    api: &dyn DirectoryApi,
    account_id: &str,
    page_delay_ms: u64,
) -> Result<LocationMap, DirectoryError> {
    let account = account_resource(account_id)?;

    let mut map = LocationMap::default();
    let mut token: Option<String> = None;
    let mut page_count = 0usize;

    loop {
        page_count += 1;
        if page_count > MAX_LOCATION_PAGES {
            return Err(DirectoryError::PaginationLimit {
                account,
                max_pages: MAX_LOCATION_PAGES,
            });
        }

        if page_count > 1 && page_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(page_delay_ms)).await;
        }

        let page = api
            .list_locations_page(&account, LOCATION_PAGE_SIZE, token.as_deref())
            .await?;

        for location in &page.locations {
            map.insert(location.store_code.as_deref(), &location.name);
        }

        token = page.next_token().map(str::to_owned);
        if token.is_none() {
            break;
        }
    }

    tracing::info!(
        account = %account,
        pages = page_count,
        locations = map.len(),
        missing_store_code = map.missing_store_code,
        "location map built"
    );

    Ok(map)
}
