//! Inbox processing command handlers.
//!
//! The processor is wired from configuration: a local file store rooted at
//! `storage_root`, calamine for workbooks, CSV run logs and the directory
//! REST client.

use std::sync::Arc;

use postbatch_core::AppConfig;
use postbatch_pipeline::{
    CsvRunLogWriter, FileReport, FileStore, LocalFileStore, LocalSheets, Processor,
    ProcessorOptions,
};

use crate::directory::directory_client;

/// Builds a [`Processor`] for the configured inbox, creating the inbox
/// folder if it does not exist yet.
///
/// # Errors
///
/// Returns an error if the storage root or inbox cannot be created, or the
/// directory client cannot be constructed.
pub(crate) async fn build_processor(config: &AppConfig) -> anyhow::Result<Processor> {
    let store = Arc::new(LocalFileStore::open(config.storage_root.clone()).await?);
    let inbox = store
        .ensure_folder(&store.root_folder_id(), &config.inbox_folder)
        .await?;
    tracing::debug!(inbox = %inbox.id, root = %store.root().display(), "inbox ready");

    let sheets = Arc::new(LocalSheets::new(config.storage_root.clone()));
    let run_logs = Arc::new(CsvRunLogWriter::new(config.storage_root.clone()));
    let api = Arc::new(directory_client(config)?);

    Ok(Processor::new(
        store,
        sheets,
        run_logs,
        api,
        ProcessorOptions::from_config(config, inbox.id),
    ))
}

pub(crate) async fn run_process_inbox(config: &AppConfig) -> anyhow::Result<()> {
    let processor = build_processor(config).await?;
    let report = processor.process_inbox_files().await?;

    if report.files.is_empty() && report.failures.is_empty() {
        println!("inbox is empty");
        return Ok(());
    }

    for file in &report.files {
        print_report(file);
    }
    for (name, error) in &report.failures {
        eprintln!("error: {name}: {error}");
    }

    println!(
        "processed {} files, {} failed unexpectedly",
        report.files.len(),
        report.failures.len()
    );
    Ok(())
}

pub(crate) async fn run_process_file(config: &AppConfig, file_id: &str) -> anyhow::Result<()> {
    let processor = build_processor(config).await?;
    let report = processor.process_file_by_id(file_id).await?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &FileReport) {
    println!(
        "{}: {} ({} published, {} errors, success rate {}){}",
        report.file_name,
        report.routed_to,
        report.summary.success,
        report.summary.error,
        report.summary.success_rate_display(),
        report
            .run_log_id
            .as_deref()
            .map(|id| format!(", log {id}"))
            .unwrap_or_default()
    );
}
