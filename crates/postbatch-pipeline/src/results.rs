//! Per-file run log: counters plus one entry per recorded outcome.
//!
//! The recorder is a passive observer. The processor keeps its own counters
//! for the routing decision and only reads the recorder to write the log.

use chrono::{DateTime, Utc};
use postbatch_core::{RowOutcome, SubmissionHeader, SubmissionRow};

/// Column titles of the detail section, in order.
pub const LOG_COLUMNS: [&str; 10] = [
    "Timestamp",
    "Source File",
    "Business Group ID",
    "Account ID",
    "Row",
    "Store Code",
    "Product Name",
    "Outcome",
    "External ID",
    "Message",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub source_file: String,
    pub business_group_id: String,
    pub account_id: String,
    /// Grid row; `None` for header-level entries.
    pub row: Option<usize>,
    pub store_code: String,
    pub product_name: String,
    pub outcome: RowOutcome,
    pub external_id: String,
    pub message: String,
}

impl LogEntry {
    /// Cells in [`LOG_COLUMNS`] order.
    #[must_use]
    pub fn to_record(&self) -> [String; 10] {
        [
            self.timestamp.to_rfc3339(),
            self.source_file.clone(),
            self.business_group_id.clone(),
            self.account_id.clone(),
            self.row.map(|r| r.to_string()).unwrap_or_default(),
            self.store_code.clone(),
            self.product_name.clone(),
            self.outcome.to_string(),
            self.external_id.clone(),
            self.message.clone(),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub success: usize,
    pub skip: usize,
    pub error: usize,
}

impl RunSummary {
    /// Percentage of successful records, rounded; `None` for an empty run.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn success_rate(&self) -> Option<u32> {
        if self.total == 0 {
            return None;
        }
        Some((self.success as f64 / self.total as f64 * 100.0).round() as u32)
    }

    /// `"75%"`, or `"n/a"` for an empty run.
    #[must_use]
    pub fn success_rate_display(&self) -> String {
        self.success_rate()
            .map_or_else(|| "n/a".to_string(), |rate| format!("{rate}%"))
    }

    fn count(&mut self, outcome: RowOutcome) {
        self.total += 1;
        match outcome {
            RowOutcome::Success => self.success += 1,
            RowOutcome::Skip => self.skip += 1,
            RowOutcome::Error => self.error += 1,
        }
    }
}

#[derive(Debug)]
pub struct RunRecorder {
    source_file: String,
    entries: Vec<LogEntry>,
    summary: RunSummary,
    sealed: bool,
}

impl RunRecorder {
    #[must_use]
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            entries: Vec::new(),
            summary: RunSummary::default(),
            sealed: false,
        }
    }

    pub fn record_row(
        &mut self,
        header: &SubmissionHeader,
        row: &SubmissionRow,
        outcome: RowOutcome,
        external_id: Option<&str>,
        message: &str,
    ) {
        self.push(LogEntry {
            timestamp: Utc::now(),
            source_file: self.source_file.clone(),
            business_group_id: header.business_group_id.clone(),
            account_id: header.account_id.clone(),
            row: Some(row.row_number),
            store_code: row.store_code.clone(),
            product_name: row.product_name.clone(),
            outcome,
            external_id: external_id.unwrap_or_default().to_string(),
            message: message.to_string(),
        });
    }

    /// Records a file-level problem as an error entry. Header fields are
    /// filled in when the header was parsed.
    pub fn record_header_error(&mut self, header: Option<&SubmissionHeader>, message: &str) {
        self.push(LogEntry {
            timestamp: Utc::now(),
            source_file: self.source_file.clone(),
            business_group_id: header.map(|h| h.business_group_id.clone()).unwrap_or_default(),
            account_id: header.map(|h| h.account_id.clone()).unwrap_or_default(),
            row: None,
            store_code: String::new(),
            product_name: String::new(),
            outcome: RowOutcome::Error,
            external_id: String::new(),
            message: message.to_string(),
        });
    }

    /// Seals the run and returns its counters. Calling it again returns the
    /// same counters.
    pub fn finalize(&mut self) -> RunSummary {
        self.sealed = true;
        self.summary
    }

    #[must_use]
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    fn push(&mut self, entry: LogEntry) {
        if self.sealed {
            tracing::warn!(
                file = %self.source_file,
                outcome = %entry.outcome,
                "record added after the run was finalized"
            );
        }
        self.summary.count(entry.outcome);
        self.entries.push(entry);
    }
}
