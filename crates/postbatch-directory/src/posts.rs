//! Listing payload construction.
//!
//! Turns a validated [`SubmissionRow`] into the body of
//! `POST {location}/localPosts`. Only blocks backed by row data are
//! emitted: no price block for free items, no call-to-action without a
//! landing page, no media without an exposed image.

use postbatch_core::actions::{ACTION_LEARN_MORE, ACTION_NONE};
use postbatch_core::SubmissionRow;
use rust_decimal::Decimal;

use crate::types::{CallToAction, LocalPostMedia, LocalPostRequest, Money};

/// Topic marker for product listings.
pub const TOPIC_TYPE_PRODUCT: &str = "PRODUCT";

/// Per-deployment payload settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostOptions {
    pub language_code: String,
    pub currency_code: String,
}

impl Default for PostOptions {
    fn default() -> Self {
        Self {
            language_code: "en".to_string(),
            currency_code: "USD".to_string(),
        }
    }
}

/// Builds the listing payload for `row`.
///
/// `image_url` is the publicly fetchable URL of the row's image, if one was
/// exposed for this call.
#[must_use]
pub fn build_local_post(
    row: &SubmissionRow,
    image_url: Option<&str>,
    options: &PostOptions,
) -> LocalPostRequest {
    LocalPostRequest {
        language_code: options.language_code.clone(),
        topic_type: TOPIC_TYPE_PRODUCT.to_string(),
        summary: row.product_name.trim().to_string(),
        description: non_empty(&row.description),
        category: non_empty(&row.product_category),
        price: price_block(row.price, &options.currency_code),
        call_to_action: call_to_action(row),
        media: image_url
            .filter(|u| !u.trim().is_empty())
            .map(|url| LocalPostMedia {
                media_format: "PHOTO".to_string(),
                source_url: url.to_string(),
            })
            .into_iter()
            .collect(),
    }
}

/// Price in whole units; the fractional part is dropped. `None` unless the
/// price is strictly positive.
fn price_block(price: Decimal, currency_code: &str) -> Option<Money> {
    if price <= Decimal::ZERO {
        return None;
    }
    Some(Money {
        currency_code: currency_code.to_string(),
        units: price.floor().normalize().to_string(),
    })
}

fn call_to_action(row: &SubmissionRow) -> Option<CallToAction> {
    let url = row.landing_page_url.trim();
    if url.is_empty() {
        return None;
    }

    let action = row.button_action_type.trim();
    let action_type = if action.is_empty() {
        ACTION_LEARN_MORE
    } else if action == ACTION_NONE {
        return None;
    } else {
        action
    };

    Some(CallToAction {
        action_type: action_type.to_string(),
        url: url.to_string(),
    })
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
