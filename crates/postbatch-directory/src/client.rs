//! HTTP client for the business-directory REST API.
//!
//! Wraps `reqwest` with bearer authentication, JSON request/response
//! handling, and error extraction from the API's `{"error": {...}}`
//! envelope. Non-2xx responses surface as [`DirectoryError::Api`].

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::account_resource;
use crate::error::DirectoryError;
use crate::types::{
    Account, ErrorEnvelope, ListAccountsResponse, LocalPost, LocalPostRequest, LocationsPage,
};

const DEFAULT_BASE_URL: &str = "https://mybusiness.googleapis.com/v4/";

/// Upper bound on account pages; a directory login rarely sees more than a
/// handful of accounts.
const MAX_ACCOUNT_PAGES: usize = 50;

/// Client for the directory REST API.
///
/// Holds only its own configuration: the HTTP client, the bearer token and
/// the base URL. Use [`DirectoryClient::new`] for production or
/// [`DirectoryClient::with_base_url`] to point at a mock server in tests.
pub struct DirectoryClient {
    client: Client,
    access_token: String,
    base_url: Url,
}

impl DirectoryClient {
    /// Creates a new client pointed at the production directory API.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(access_token: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, DirectoryError> {
        Self::with_base_url(access_token, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`DirectoryError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so `Url::join` appends relative paths
        // instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| DirectoryError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            base_url,
        })
    }

    /// Lists every account visible to the credential, following pagination.
    ///
    /// # Errors
    ///
    /// - [`DirectoryError::Api`] on a non-2xx response.
    /// - [`DirectoryError::Http`] on network failure.
    /// - [`DirectoryError::Deserialize`] if the response shape is unexpected.
    /// - [`DirectoryError::PaginationLimit`] if the token never runs out.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, DirectoryError> {
        let mut accounts = Vec::new();
        let mut token: Option<String> = None;

        for _ in 0..MAX_ACCOUNT_PAGES {
            let mut url = self.endpoint("accounts")?;
            if let Some(t) = &token {
                url.query_pairs_mut().append_pair("pageToken", t);
            }
            let page: ListAccountsResponse = self.get_json(url, "list accounts").await?;
            accounts.extend(page.accounts);

            token = page.next_page_token.filter(|t| !t.trim().is_empty());
            if token.is_none() {
                return Ok(accounts);
            }
        }

        Err(DirectoryError::PaginationLimit {
            account: "accounts".to_string(),
            max_pages: MAX_ACCOUNT_PAGES,
        })
    }

    /// Fetches one page of locations for `account_id`.
    ///
    /// # Errors
    ///
    /// - [`DirectoryError::InvalidAccount`] if `account_id` is blank.
    /// - [`DirectoryError::Api`] on a non-2xx response.
    /// - [`DirectoryError::Http`] on network failure.
    /// - [`DirectoryError::Deserialize`] if the response shape is unexpected.
    pub async fn list_locations_page(
        &self,
        account_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<LocationsPage, DirectoryError> {
        let account = account_resource(account_id)?;
        let mut url = self.endpoint(&format!("{account}/locations"))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("pageSize", &page_size.to_string());
            if let Some(t) = page_token {
                pairs.append_pair("pageToken", t);
            }
        }
        self.get_json(url, &format!("list locations ({account})"))
            .await
    }

    /// Creates a listing under `location_name`
    /// (`accounts/{a}/locations/{l}`).
    ///
    /// # Errors
    ///
    /// - [`DirectoryError::Api`] if the provider rejects the listing.
    /// - [`DirectoryError::Http`] on network failure.
    /// - [`DirectoryError::Deserialize`] if the response shape is unexpected.
    pub async fn create_local_post(
        &self,
        location_name: &str,
        request: &LocalPostRequest,
    ) -> Result<LocalPost, DirectoryError> {
        let url = self.endpoint(&format!("{}/localPosts", location_name.trim_matches('/')))?;
        self.post_json(url, request, &format!("create local post ({location_name})"))
            .await
    }

    /// Resolves `path` against the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, DirectoryError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| DirectoryError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: format!("cannot join '{path}': {e}"),
            })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<T, DirectoryError> {
        let request = self.authorized(self.client.get(url));
        Self::send_json(request, context).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
        context: &str,
    ) -> Result<T, DirectoryError> {
        let request = self.authorized(self.client.post(url)).json(body);
        Self::send_json(request, context).await
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token))
            .header(CONTENT_TYPE, "application/json")
    }

    /// Sends the request and parses a 2xx body as JSON. Non-2xx statuses
    /// become [`DirectoryError::Api`] carrying the provider's message.
    async fn send_json<T: DeserializeOwned>(
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, DirectoryError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(DirectoryError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        // Some endpoints answer 200 with an empty body.
        let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
        serde_json::from_str(body).map_err(|e| DirectoryError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

/// Extracts `error.message` from an error body, falling back to the raw
/// body text.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|env| env.error.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
