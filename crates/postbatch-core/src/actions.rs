//! Call-to-action codes understood by the directory API and the button
//! labels that map to them.

/// Sentinel code for "no button". Rows using it never get a call-to-action.
pub const ACTION_NONE: &str = "NONE";

/// Code used when a row has a landing page but no button label.
pub const ACTION_LEARN_MORE: &str = "LEARN_MORE";

const BUTTON_ACTIONS: [(&str, &str); 8] = [
    ("book", "BOOK"),
    ("order online", "ORDER"),
    ("buy", "SHOP"),
    ("shop", "SHOP"),
    ("learn more", ACTION_LEARN_MORE),
    ("sign up", "SIGN_UP"),
    ("call now", "CALL"),
    ("none", ACTION_NONE),
];

/// Map a spreadsheet button label to its action code.
///
/// Matching is case-insensitive on the trimmed label. Labels outside the
/// table are returned unchanged (trimmed) so callers can pass raw action
/// codes straight through.
#[must_use]
pub fn action_for_label(label: &str) -> String {
    let trimmed = label.trim();
    let lower = trimmed.to_lowercase();
    BUTTON_ACTIONS
        .iter()
        .find(|(known, _)| *known == lower)
        .map_or_else(|| trimmed.to_string(), |(_, code)| (*code).to_string())
}
