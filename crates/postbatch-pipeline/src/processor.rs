//! Drives submission files from the inbox to a terminal folder.
//!
//! Per file: read and parse the grid, check the header, build the account's
//! location map, publish each valid row in order, write the run log into
//! `Results`, then move the file to `Processed` (at least one listing
//! published) or `Error` (none).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use postbatch_core::{
    load_store_registry, mark_uploaded, save_store_registry, AppConfig, FileRoutingState,
    RowOutcome, SubmissionHeader, SubmissionRow,
};
use postbatch_directory::{build_location_map, DirectoryApi, LocationMap, PostOptions};
use postbatch_ingest::{parse_submission, SourceFormat};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{FileError, StoreError};
use crate::exposure::ExposureManager;
use crate::ports::{FileStore, RunLogWriter, SheetEngine, StoredFile};
use crate::publisher::Publisher;
use crate::reader::load_grid;
use crate::results::{RunRecorder, RunSummary};

/// Subfolder of the inbox that receives run logs.
pub const RESULTS_FOLDER: &str = "Results";

/// Header error recorded for a well-formed file with nothing to publish.
pub const NO_DATA_ROWS: &str = "submission contains no data rows";

#[derive(Debug, Clone)]
pub struct ProcessorOptions {
    pub inbox_folder_id: String,
    pub image_root: Option<String>,
    pub asset_url_template: String,
    pub post_options: PostOptions,
    /// Pause between consecutive publish calls.
    pub row_delay: Duration,
    /// Pause between location pages, in milliseconds.
    pub page_delay_ms: u64,
    pub store_registry: Option<PathBuf>,
}

impl ProcessorOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig, inbox_folder_id: impl Into<String>) -> Self {
        Self {
            inbox_folder_id: inbox_folder_id.into(),
            image_root: config.image_root.clone(),
            asset_url_template: config.asset_url_template.clone(),
            post_options: PostOptions {
                language_code: config.language_code.clone(),
                currency_code: config.currency_code.clone(),
            },
            row_delay: Duration::from_millis(config.row_delay_ms),
            page_delay_ms: config.page_delay_ms,
            store_registry: config.store_registry_path.clone(),
        }
    }
}

/// What happened to one submission file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub file_id: String,
    pub file_name: String,
    pub routed_to: FileRoutingState,
    pub summary: RunSummary,
    /// Listings created.
    pub published: usize,
    pub run_log_id: Option<String>,
}

#[derive(Debug, Default)]
pub struct InboxReport {
    pub files: Vec<FileReport>,
    /// Files that failed outside the normal flow: `(file name, error)`.
    pub failures: Vec<(String, String)>,
}

/// Mutable state of one file's run.
struct FileRun {
    recorder: RunRecorder,
    header: Option<SubmissionHeader>,
    /// Publish calls made so far.
    attempted: usize,
    published: usize,
}

pub struct Processor {
    store: Arc<dyn FileStore>,
    sheets: Arc<dyn SheetEngine>,
    run_logs: Arc<dyn RunLogWriter>,
    api: Arc<dyn DirectoryApi>,
    publisher: Publisher,
    options: ProcessorOptions,
    /// Held for the whole of a scan or single-file run. Runs never overlap,
    /// so a file is published once and exposures never interleave.
    run_lock: Mutex<()>,
}

impl Processor {
    #[must_use]
    pub fn new(
        store: Arc<dyn FileStore>,
        sheets: Arc<dyn SheetEngine>,
        run_logs: Arc<dyn RunLogWriter>,
        api: Arc<dyn DirectoryApi>,
        options: ProcessorOptions,
    ) -> Self {
        let exposure = ExposureManager::new(
            Arc::clone(&store),
            options.image_root.clone(),
            options.asset_url_template.clone(),
        );
        let publisher = Publisher::new(Arc::clone(&api), exposure, options.post_options.clone());
        Self {
            store,
            sheets,
            run_logs,
            api,
            publisher,
            options,
            run_lock: Mutex::new(()),
        }
    }

    /// Processes every supported file directly inside the inbox, one at a
    /// time. Subfolders and other file types are left alone. A file that
    /// fails unexpectedly is moved to `Error` (best effort) and the scan
    /// continues. Waits for any run already in progress; the inbox is
    /// listed only once the lock is held.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only if the inbox itself cannot be listed.
    pub async fn process_inbox_files(&self) -> Result<InboxReport, StoreError> {
        let _run = self.run_lock.lock().await;
        let files = self.store.list_files(&self.options.inbox_folder_id).await?;
        let candidates: Vec<StoredFile> = files
            .into_iter()
            .filter(|f| !f.is_folder() && SourceFormat::is_supported(&f.mime_type))
            .collect();

        tracing::info!(
            inbox = %self.options.inbox_folder_id,
            files = candidates.len(),
            "scanning inbox"
        );

        let mut report = InboxReport::default();
        for file in &candidates {
            match self.process_file(file).await {
                Ok(file_report) => report.files.push(file_report),
                Err(e) => {
                    tracing::error!(file = %file.name, error = %e, "unexpected error processing file");
                    if let Err(route_err) = self.route(file, FileRoutingState::Error).await {
                        tracing::error!(
                            file = %file.name,
                            error = %route_err,
                            "failed to move file to Error"
                        );
                    }
                    report.failures.push((file.name.clone(), e.to_string()));
                }
            }
        }

        tracing::info!(
            processed = report.files.len(),
            failed = report.failures.len(),
            "inbox scan complete"
        );
        Ok(report)
    }

    /// Processes a single file by id, wherever it lives. Waits for any run
    /// already in progress.
    ///
    /// # Errors
    ///
    /// - [`FileError::Store`] if the file cannot be looked up, or if writing
    ///   its final folder fails.
    pub async fn process_file_by_id(&self, file_id: &str) -> Result<FileReport, FileError> {
        let _run = self.run_lock.lock().await;
        let file = self.store.get_file(file_id).await?;
        self.process_file(&file).await
    }

    async fn process_file(&self, file: &StoredFile) -> Result<FileReport, FileError> {
        let run_id = Uuid::new_v4();
        tracing::info!(file = %file.name, file_id = %file.id, %run_id, "processing submission");

        let mut run = FileRun {
            recorder: RunRecorder::new(&file.name),
            header: None,
            attempted: 0,
            published: 0,
        };

        if let Err(e) = self.run_file(file, &mut run).await {
            tracing::warn!(file = %file.name, %run_id, error = %e, "submission aborted");
            run.recorder
                .record_header_error(run.header.as_ref(), &e.to_string());
        }

        let summary = run.recorder.finalize();
        let routed_to = FileRoutingState::from_counts(run.published);

        let run_log_id = match self.write_run_log(file, run_id, &run.recorder, &summary).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::error!(file = %file.name, %run_id, error = %e, "run log not written");
                None
            }
        };

        self.route(file, routed_to).await?;

        tracing::info!(
            file = %file.name,
            %run_id,
            routed_to = %routed_to,
            total = summary.total,
            success = summary.success,
            error = summary.error,
            success_rate = %summary.success_rate_display(),
            "submission finished"
        );

        Ok(FileReport {
            file_id: file.id.clone(),
            file_name: file.name.clone(),
            routed_to,
            summary,
            published: run.published,
            run_log_id,
        })
    }

    /// Parsing through the row loop. An `Err` aborts the file before or
    /// instead of the row loop; row failures are recorded, never returned.
    async fn run_file(&self, file: &StoredFile, run: &mut FileRun) -> Result<(), FileError> {
        let grid = load_grid(self.store.as_ref(), self.sheets.as_ref(), file).await?;
        let parsed = parse_submission(&grid);

        let Some(header) = parsed.header.clone() else {
            return Err(FileError::FatalDocument(parsed.header_errors.join("; ")));
        };
        run.header = Some(header.clone());

        for message in &parsed.header_errors {
            tracing::warn!(file = %file.name, error = %message, "header problem");
            run.recorder.record_header_error(Some(&header), message);
        }

        if parsed.rows.is_empty() {
            return Err(FileError::FatalDocument(NO_DATA_ROWS.to_string()));
        }

        let locations = build_location_map(
            self.api.as_ref(),
            &header.account_id,
            self.options.page_delay_ms,
        )
        .await
        .map_err(FileError::DirectoryFetch)?;

        for row in &parsed.rows {
            self.process_row(file, &header, row, &locations, run).await;
        }
        Ok(())
    }

    async fn process_row(
        &self,
        file: &StoredFile,
        header: &SubmissionHeader,
        row: &SubmissionRow,
        locations: &LocationMap,
        run: &mut FileRun,
    ) {
        if !row.is_valid() {
            let message = row.errors.join("; ");
            tracing::warn!(file = %file.name, row = row.row_number, error = %message, "row invalid");
            run.recorder
                .record_row(header, row, RowOutcome::Error, None, &message);
            return;
        }

        let Some(location) = locations.resolve(&row.store_code) else {
            let message = format!("no location found for store code '{}'", row.store_code);
            tracing::warn!(file = %file.name, row = row.row_number, store_code = %row.store_code, "store code not matched");
            run.recorder
                .record_row(header, row, RowOutcome::Error, None, &message);
            return;
        };

        if run.attempted > 0 && !self.options.row_delay.is_zero() {
            tokio::time::sleep(self.options.row_delay).await;
        }
        run.attempted += 1;

        match self
            .publisher
            .publish(&header.account_id, location, row)
            .await
        {
            Ok(external_id) => {
                run.published += 1;
                run.recorder.record_row(
                    header,
                    row,
                    RowOutcome::Success,
                    Some(&external_id),
                    "published",
                );
                self.stamp_store_registry(location).await;
            }
            Err(e) => {
                tracing::warn!(
                    file = %file.name,
                    row = row.row_number,
                    store_code = %row.store_code,
                    error = %e,
                    "publish failed"
                );
                run.recorder
                    .record_row(header, row, RowOutcome::Error, None, &e.to_string());
            }
        }
    }

    async fn write_run_log(
        &self,
        file: &StoredFile,
        run_id: Uuid,
        recorder: &RunRecorder,
        summary: &RunSummary,
    ) -> Result<String, FileError> {
        let folder = self
            .store
            .ensure_folder(&self.options.inbox_folder_id, RESULTS_FOLDER)
            .await
            .map_err(FileError::RunLog)?;
        let title = run_log_title(&file.name, run_id, Utc::now());
        self.run_logs
            .write_run_log(&folder.id, &title, recorder.entries(), summary)
            .await
            .map_err(FileError::RunLog)
    }

    async fn route(
        &self,
        file: &StoredFile,
        state: FileRoutingState,
    ) -> Result<StoredFile, StoreError> {
        let Some(folder_name) = state.folder_name() else {
            return Ok(file.clone());
        };
        let folder = self
            .store
            .ensure_folder(&self.options.inbox_folder_id, folder_name)
            .await?;
        self.store.move_file(&file.id, &folder.id).await
    }

    /// Stamps the registry row for `location_name` as uploaded. Failures are
    /// logged; the listing is already live.
    async fn stamp_store_registry(&self, location_name: &str) {
        let Some(path) = self.options.store_registry.clone() else {
            return;
        };

        let location = location_name.to_string();
        let registry = path.clone();
        let result = tokio::task::spawn_blocking(move || {
            load_store_registry(&registry).and_then(|mut records| {
                let stamped = mark_uploaded(&mut records, &location, Utc::now());
                if stamped > 0 {
                    save_store_registry(&registry, &records)?;
                }
                Ok(stamped)
            })
        })
        .await;

        match result {
            Ok(Ok(0)) => tracing::debug!(location = location_name, "location not in store registry"),
            Ok(Ok(_)) => tracing::debug!(location = location_name, "store registry stamped"),
            Ok(Err(e)) => tracing::warn!(
                location = location_name,
                path = %path.display(),
                error = %e,
                "failed to update store registry"
            ),
            Err(e) => tracing::warn!(
                location = location_name,
                error = %e,
                "store registry task failed"
            ),
        }
    }
}

/// `"<stem> results <timestamp> <run>"`. The short run id keeps titles
/// distinct for files sharing a stem within the same second.
fn run_log_title(file_name: &str, run_id: Uuid, at: DateTime<Utc>) -> String {
    let run = run_id.simple().to_string();
    format!(
        "{} results {} {}",
        file_stem(file_name),
        at.format("%Y-%m-%d %H%M%S"),
        &run[..8]
    )
}

fn file_stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

#[cfg(test)]
#[path = "processor_test.rs"]
mod tests;
