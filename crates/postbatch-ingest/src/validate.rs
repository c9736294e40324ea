//! Field-level rules for header and detail rows.
//!
//! Every rule is evaluated; a row collects all of its failures rather than
//! stopping at the first.

use std::str::FromStr;

use postbatch_core::actions::ACTION_NONE;
use postbatch_core::{SubmissionHeader, SubmissionRow};
use rust_decimal::Decimal;

/// Errors for the batch header. Empty when both required fields are set.
#[must_use]
pub fn validate_header(header: &SubmissionHeader) -> Vec<String> {
    let mut errors = Vec::new();
    if header.business_group_id.trim().is_empty() {
        errors.push("business group id is required".to_string());
    }
    if header.account_id.trim().is_empty() {
        errors.push("account id is required".to_string());
    }
    errors
}

/// Errors for one detail row. `button_action_type` must already be derived.
#[must_use]
pub fn validate_row(row: &SubmissionRow) -> Vec<String> {
    let mut errors = Vec::new();

    for (value, name) in [
        (&row.business_name, "business name"),
        (&row.store_code, "store code"),
        (&row.product_name, "product name"),
        (&row.description, "description"),
    ] {
        if value.trim().is_empty() {
            errors.push(format!("{name} is required"));
        }
    }

    let url = row.landing_page_url.trim();
    if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(format!(
            "landing page URL '{url}' must start with http:// or https://"
        ));
    }

    let label = row.button_label.trim();
    if !label.is_empty() && row.button_action_type != ACTION_NONE && url.is_empty() {
        errors.push(format!("button '{label}' requires a landing page URL"));
    }

    errors
}

/// Lenient price parse: keeps only digits and `.`, so currency symbols,
/// thousands separators and signs are dropped. Anything unparseable is zero.
#[must_use]
pub fn parse_price(raw: &str) -> Decimal {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return Decimal::ZERO;
    }
    Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_row() -> SubmissionRow {
        SubmissionRow {
            row_number: 7,
            business_name: "Cafe Aoyama".to_string(),
            store_code: "S-01".to_string(),
            product_name: "Matcha Latte".to_string(),
            description: "Stone-ground matcha.".to_string(),
            ..SubmissionRow::default()
        }
    }

    #[test]
    fn complete_row_has_no_errors() {
        assert!(validate_row(&valid_row()).is_empty());
    }

    #[test]
    fn every_missing_required_field_is_reported() {
        let row = SubmissionRow {
            row_number: 8,
            ..SubmissionRow::default()
        };
        let errors = validate_row(&row);
        assert_eq!(
            errors,
            [
                "business name is required",
                "store code is required",
                "product name is required",
                "description is required",
            ]
        );
    }

    #[test]
    fn url_scheme_is_checked() {
        let mut row = valid_row();
        row.landing_page_url = "www.example.com".to_string();
        let errors = validate_row(&row);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("must start with http:// or https://"));

        row.landing_page_url = "https://example.com".to_string();
        assert!(validate_row(&row).is_empty());
    }

    #[test]
    fn button_without_url_is_rejected() {
        let mut row = valid_row();
        row.button_label = "Book".to_string();
        row.button_action_type = "BOOK".to_string();
        assert_eq!(
            validate_row(&row),
            ["button 'Book' requires a landing page URL"]
        );
    }

    #[test]
    fn none_button_needs_no_url() {
        let mut row = valid_row();
        row.button_label = "None".to_string();
        row.button_action_type = ACTION_NONE.to_string();
        assert!(validate_row(&row).is_empty());
    }

    #[test]
    fn header_requires_group_and_account() {
        let header = SubmissionHeader::default();
        assert_eq!(
            validate_header(&header),
            ["business group id is required", "account id is required"]
        );

        let header = SubmissionHeader {
            business_group_id: "G-1".to_string(),
            account_id: "123".to_string(),
            ..SubmissionHeader::default()
        };
        assert!(validate_header(&header).is_empty());
    }

    #[test]
    fn price_keeps_digits_and_dot() {
        assert_eq!(parse_price("$1,200.50"), Decimal::from_str("1200.50").unwrap());
        assert_eq!(parse_price("-15"), Decimal::from(15));
        assert_eq!(parse_price("980 yen"), Decimal::from(980));
    }

    #[test]
    fn unparseable_price_is_zero() {
        assert_eq!(parse_price(""), Decimal::ZERO);
        assert_eq!(parse_price("free"), Decimal::ZERO);
        assert_eq!(parse_price("1.2.3"), Decimal::ZERO);
        assert_eq!(parse_price("."), Decimal::ZERO);
    }
}
