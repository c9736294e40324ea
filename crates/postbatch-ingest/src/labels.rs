//! Column labels recognised in the detail-header row, and the placeholder
//! text templates ship in unfilled header cells.

/// A detail-section field a column can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    BusinessName,
    StoreCode,
    ProductCategory,
    ProductName,
    Description,
    Price,
    ButtonLabel,
    LandingPageUrl,
    ImagePath,
}

/// Accepted labels per field, already normalised.
const FIELD_LABELS: [(Field, &[&str]); 9] = [
    (Field::BusinessName, &["business name", "store name"]),
    (Field::StoreCode, &["store code"]),
    (Field::ProductCategory, &["product category", "category"]),
    (Field::ProductName, &["product name", "product"]),
    (Field::Description, &["description", "product description"]),
    (Field::Price, &["price"]),
    (Field::ButtonLabel, &["button", "button label"]),
    (Field::LandingPageUrl, &["landing page url", "url", "link"]),
    (Field::ImagePath, &["image", "image path", "photo"]),
];

const PLACEHOLDERS: [&str; 4] = ["(required)", "(optional)", "-", "n/a"];

/// Lowercases and collapses runs of whitespace to single spaces.
#[must_use]
pub fn normalise_label(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Field a detail-header cell refers to, if any.
#[must_use]
pub fn field_for_label(raw: &str) -> Option<Field> {
    let label = normalise_label(raw);
    if label.is_empty() {
        return None;
    }
    FIELD_LABELS
        .iter()
        .find(|(_, aliases)| aliases.contains(&label.as_str()))
        .map(|(field, _)| *field)
}

/// Whether a trimmed cell is template filler rather than a value.
#[must_use]
pub fn is_placeholder(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    PLACEHOLDERS.contains(&lower.as_str()) || lower.starts_with("e.g.")
}

/// Trimmed value of a header cell, with placeholders collapsed to `""`.
#[must_use]
pub fn header_value(raw: &str) -> String {
    let trimmed = raw.trim();
    if is_placeholder(trimmed) {
        String::new()
    } else {
        trimmed.to_string()
    }
}
