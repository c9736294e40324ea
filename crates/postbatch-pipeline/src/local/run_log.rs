use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::{child_id, resolve_id};
use crate::error::StoreError;
use crate::ports::RunLogWriter;
use crate::results::{LogEntry, RunSummary, LOG_COLUMNS};

/// Writes run logs as CSV files: the detail section, then a summary block.
/// An existing log is never replaced; a taken name gets a ` (n)` suffix.
pub struct CsvRunLogWriter {
    root: PathBuf,
}

impl CsvRunLogWriter {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl RunLogWriter for CsvRunLogWriter {
    async fn write_run_log(
        &self,
        folder_id: &str,
        title: &str,
        entries: &[LogEntry],
        summary: &RunSummary,
    ) -> Result<String, StoreError> {
        let stem = safe_file_name(title);
        let bytes = render(entries, summary)?;

        let mut n = 0;
        let (file_id, mut file) = loop {
            let name = if n == 0 {
                format!("{stem}.csv")
            } else {
                format!("{stem} ({n}).csv")
            };
            let file_id = child_id(folder_id, &name);
            let path = resolve_id(&self.root, &file_id)?;
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => break (file_id, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(StoreError::io(&file_id, e)),
            }
        };

        file.write_all(&bytes)
            .await
            .map_err(|e| StoreError::io(&file_id, e))?;
        file.flush()
            .await
            .map_err(|e| StoreError::io(&file_id, e))?;

        tracing::debug!(file_id = %file_id, entries = entries.len(), "run log written");
        Ok(file_id)
    }
}

/// Detail rows, a `Summary` marker row, then one `label,value` row per counter.
fn render(entries: &[LogEntry], summary: &RunSummary) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record(LOG_COLUMNS)?;
    for entry in entries {
        writer.write_record(entry.to_record())?;
    }

    writer.write_record(["Summary"])?;
    writer.write_record(["Total", summary.total.to_string().as_str()])?;
    writer.write_record(["Success", summary.success.to_string().as_str()])?;
    writer.write_record(["Skip", summary.skip.to_string().as_str()])?;
    writer.write_record(["Error", summary.error.to_string().as_str()])?;
    writer.write_record(["Success Rate", summary.success_rate_display().as_str()])?;

    writer
        .into_inner()
        .map_err(|e| StoreError::io("run log", e.into_error()))
}

fn safe_file_name(title: &str) -> String {
    let cleaned: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '(' | ')') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches(['.', '_']).to_string();
    if cleaned.is_empty() {
        "run log".to_string()
    } else {
        cleaned
    }
}
