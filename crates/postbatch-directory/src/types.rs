//! Directory API request and response types.
//!
//! Field names follow the API's camelCase JSON. Optional response fields
//! default so that sparse records (a location without a store code, an
//! account without a display name) still deserialize.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Resource name, e.g. `"accounts/123"`.
    pub name: String,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default, rename = "type")]
    pub account_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListAccountsResponse {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Fully-qualified name, e.g. `"accounts/123/locations/456"`.
    pub name: String,
    #[serde(default)]
    pub store_code: Option<String>,
    #[serde(default)]
    pub location_name: Option<String>,
}

/// One page of `GET accounts/{id}/locations`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationsPage {
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl LocationsPage {
    /// Continuation token for the next page. Blank tokens count as absent.
    #[must_use]
    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Local posts (listings)
// ---------------------------------------------------------------------------

/// Monetary amount in whole currency units. The API takes `units` as a
/// decimal integer string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub currency_code: String,
    pub units: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToAction {
    pub action_type: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalPostMedia {
    pub media_format: String,
    pub source_url: String,
}

/// Body of `POST {location}/localPosts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalPostRequest {
    pub language_code: String,
    pub topic_type: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_to_action: Option<CallToAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<LocalPostMedia>,
}

/// A created listing as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalPost {
    /// Resource name of the post; used as the external id in run logs.
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub search_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationAssociation {
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub name: String,
    #[serde(default)]
    pub media_format: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub google_url: Option<String>,
    #[serde(default)]
    pub location_association: Option<LocationAssociation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListMediaResponse {
    #[serde(default)]
    pub media_items: Vec<MediaItem>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Body of `POST {location}/media`: registers a photo fetched from
/// `source_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMediaRequest {
    pub media_format: String,
    pub location_association: LocationAssociation,
    pub source_url: String,
}

impl CreateMediaRequest {
    #[must_use]
    pub fn photo(category: &str, source_url: &str) -> Self {
        Self {
            media_format: "PHOTO".to_string(),
            location_association: LocationAssociation {
                category: category.to_string(),
            },
            source_url: source_url.to_string(),
        }
    }
}

/// Error envelope returned with non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations_page_tolerates_missing_fields() {
        let page: LocationsPage = serde_json::from_str(r#"{"locations":[{"name":"accounts/1/locations/2"}]}"#).unwrap();
        assert_eq!(page.locations.len(), 1);
        assert!(page.locations[0].store_code.is_none());
        assert!(page.next_token().is_none());
    }

    #[test]
    fn blank_next_page_token_is_absent() {
        let page: LocationsPage = serde_json::from_str(r#"{"nextPageToken":"  "}"#).unwrap();
        assert!(page.next_token().is_none());
    }

    #[test]
    fn local_post_request_omits_empty_blocks() {
        let request = LocalPostRequest {
            language_code: "en".to_string(),
            topic_type: "PRODUCT".to_string(),
            summary: "Latte".to_string(),
            description: None,
            category: None,
            price: None,
            call_to_action: None,
            media: Vec::new(),
        };
        let json = serde_json::to_value(&request).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(obj["languageCode"], "en");
        assert_eq!(obj["topicType"], "PRODUCT");
        assert_eq!(obj["summary"], "Latte");
    }

    #[test]
    fn create_media_request_serializes_camel_case() {
        let req = CreateMediaRequest::photo("PRODUCT", "https://example.com/a.jpg");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["mediaFormat"], "PHOTO");
        assert_eq!(json["locationAssociation"]["category"], "PRODUCT");
        assert_eq!(json["sourceUrl"], "https://example.com/a.jpg");
    }
}
