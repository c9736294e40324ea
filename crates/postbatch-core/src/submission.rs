//! Canonical record types produced by the submission parser and consumed by
//! the publishing pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Batch-level fields read from the fixed header block of a submission file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionHeader {
    pub business_group_id: String,
    pub business_group_name: String,
    /// Directory account the batch publishes into, bare (`123`) or
    /// qualified (`accounts/123`).
    pub account_id: String,
    pub pass: String,
}

/// One product/service line from the detail section of a submission file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRow {
    /// 1-indexed row number in the source grid.
    pub row_number: usize,
    pub business_name: String,
    pub store_code: String,
    pub product_category: String,
    pub product_name: String,
    pub description: String,
    /// Non-negative; zero when the source cell was blank or unparseable.
    pub price: Decimal,
    pub button_label: String,
    /// Action code derived from `button_label`; unknown labels are carried
    /// through verbatim.
    pub button_action_type: String,
    pub landing_page_url: String,
    pub image_path: String,
    pub errors: Vec<String>,
}

impl SubmissionRow {
    /// Returns `true` when no validation rule fired for this row.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Result of parsing one submission grid.
///
/// `header` is `None` only for fatal documents; in that case `rows` is empty
/// and `header_errors` explains why.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSubmission {
    pub header: Option<SubmissionHeader>,
    pub rows: Vec<SubmissionRow>,
    pub header_errors: Vec<String>,
}

impl ParsedSubmission {
    /// Builds a fatal result carrying a single error and no rows.
    #[must_use]
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            header: None,
            rows: Vec::new(),
            header_errors: vec![message.into()],
        }
    }

    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.header.is_none()
    }
}

/// Per-row result recorded in the run log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowOutcome {
    Success,
    Skip,
    Error,
}

impl std::fmt::Display for RowOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowOutcome::Success => write!(f, "success"),
            RowOutcome::Skip => write!(f, "skip"),
            RowOutcome::Error => write!(f, "error"),
        }
    }
}

/// Folder a submission file lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRoutingState {
    Inbox,
    Processed,
    Error,
}

impl FileRoutingState {
    /// Terminal state for a file given how its rows went. Any success wins;
    /// a file with no successes, including one where nothing was attempted,
    /// is an error.
    #[must_use]
    pub fn from_counts(success: usize) -> Self {
        if success > 0 {
            FileRoutingState::Processed
        } else {
            FileRoutingState::Error
        }
    }

    /// Subfolder name under the inbox, or `None` for the inbox itself.
    #[must_use]
    pub fn folder_name(self) -> Option<&'static str> {
        match self {
            FileRoutingState::Inbox => None,
            FileRoutingState::Processed => Some("Processed"),
            FileRoutingState::Error => Some("Error"),
        }
    }
}

impl std::fmt::Display for FileRoutingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileRoutingState::Inbox => write!(f, "inbox"),
            FileRoutingState::Processed => write!(f, "processed"),
            FileRoutingState::Error => write!(f, "error"),
        }
    }
}
