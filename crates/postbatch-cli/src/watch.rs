//! Scheduled inbox processing.
//!
//! One cron job per trigger schedule, each running a full inbox scan.
//! Schedules fire in the host's local time zone. A trigger that fires while
//! another scan is still running is skipped. Jobs are removed and the
//! scheduler shut down on ctrl-c.

use std::fmt::Display;
use std::sync::Arc;

use chrono::Local;
use postbatch_core::{AppConfig, TriggerSchedule};
use postbatch_pipeline::Processor;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::inbox::build_processor;

pub(crate) async fn run_watch(
    config: &AppConfig,
    schedules: &[TriggerSchedule],
) -> anyhow::Result<()> {
    let processor = Arc::new(build_processor(config).await?);
    let busy = Arc::new(Mutex::new(()));
    let mut scheduler = JobScheduler::new().await?;

    let mut job_ids = Vec::with_capacity(schedules.len());
    for schedule in schedules {
        let cron = schedule.to_cron();
        let job = inbox_job(&cron, Arc::clone(&processor), Arc::clone(&busy))?;
        let job_id = scheduler.add(job).await?;
        tracing::info!(%job_id, schedule = %schedule, cron = %cron, "trigger registered");
        println!("trigger {job_id}: {schedule} ({cron}, local time)");
        job_ids.push(job_id);
    }

    scheduler.start().await?;
    tracing::info!(triggers = job_ids.len(), "watching inbox; press ctrl-c to stop");

    tokio::signal::ctrl_c().await?;
    tracing::info!("received shutdown signal, removing triggers");

    for job_id in &job_ids {
        if let Err(e) = scheduler.remove(job_id).await {
            tracing::warn!(%job_id, error = %e, "failed to remove trigger");
        }
    }
    scheduler.shutdown().await?;
    Ok(())
}

fn inbox_job(cron: &str, processor: Arc<Processor>, busy: Arc<Mutex<()>>) -> anyhow::Result<Job> {
    let job = Job::new_async_tz(cron, Local, move |job_id, _scheduler| {
        let processor = Arc::clone(&processor);
        let busy = Arc::clone(&busy);
        Box::pin(async move {
            scheduled_run(&processor, &busy, job_id).await;
        })
    })?;
    Ok(job)
}

/// Runs one inbox scan unless another is in progress. Returns whether the
/// scan ran.
async fn scheduled_run(processor: &Processor, busy: &Mutex<()>, job_id: impl Display) -> bool {
    let Ok(_running) = busy.try_lock() else {
        tracing::warn!(%job_id, "previous inbox run still in progress, skipping trigger");
        return false;
    };

    tracing::info!(%job_id, "scheduled inbox run starting");
    match processor.process_inbox_files().await {
        Ok(report) => tracing::info!(
            %job_id,
            files = report.files.len(),
            failed = report.failures.len(),
            "scheduled inbox run finished"
        ),
        Err(e) => tracing::error!(%job_id, error = %e, "scheduled inbox run failed"),
    }
    true
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;

    fn config(root: &std::path::Path) -> AppConfig {
        AppConfig {
            access_token: "test-token".to_string(),
            directory_base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 5,
            user_agent: "postbatch-test/0.1".to_string(),
            storage_root: root.to_path_buf(),
            inbox_folder: "inbox".to_string(),
            image_root: None,
            store_registry_path: None,
            row_delay_ms: 0,
            page_delay_ms: 0,
            asset_url_template: "https://files.example/{id}".to_string(),
            language_code: "en".to_string(),
            currency_code: "USD".to_string(),
            log_level: "info".to_string(),
        }
    }

    #[tokio::test]
    async fn trigger_is_skipped_while_a_run_is_in_progress() {
        let dir = tempfile::tempdir().unwrap();
        let processor = build_processor(&config(dir.path())).await.unwrap();
        let busy = Mutex::new(());

        let held = busy.lock().await;
        assert!(!scheduled_run(&processor, &busy, "daily").await);
        drop(held);

        assert!(scheduled_run(&processor, &busy, "daily").await);
        assert!(busy.try_lock().is_ok());
    }

    #[tokio::test]
    async fn every_schedule_kind_builds_a_local_time_job() {
        let dir = tempfile::tempdir().unwrap();
        let processor = Arc::new(build_processor(&config(dir.path())).await.unwrap());
        let busy = Arc::new(Mutex::new(()));

        for schedule in [
            TriggerSchedule::DailyAt { hour: 9 },
            TriggerSchedule::WeeklyOn {
                weekday: Weekday::Fri,
                hour: 17,
            },
            TriggerSchedule::EveryHours { hours: 4 },
        ] {
            let cron = schedule.to_cron();
            assert!(
                inbox_job(&cron, Arc::clone(&processor), Arc::clone(&busy)).is_ok(),
                "{cron}"
            );
        }
    }
}
