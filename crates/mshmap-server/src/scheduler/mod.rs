//! Background job scheduler.
//!
//! Registers the daily analytics recalculation and the weekly report job
//! at server startup. Cron expressions are evaluated in
//! `AppConfig::schedule_timezone`.

use std::sync::Arc;

use chrono_tz::Tz;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use mshmap_analytics::{build_weekly_report, run_full_recalculation, AnalyticsStore};
use mshmap_core::{AnalyticsConfig, AppConfig};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    store: Arc<dyn AnalyticsStore>,
    analytics: Arc<AnalyticsConfig>,
    config: &AppConfig,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let tz = config.schedule_timezone;

    register_recalculation_job(
        &scheduler,
        &config.daily_cron,
        tz,
        Arc::clone(&store),
        analytics,
    )
    .await?;
    register_weekly_report_job(&scheduler, &config.weekly_cron, tz, store).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_recalculation_job(
    scheduler: &JobScheduler,
    cron: &str,
    tz: Tz,
    store: Arc<dyn AnalyticsStore>,
    analytics: Arc<AnalyticsConfig>,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async_tz(cron, tz, move |_uuid, _lock| {
        let store = Arc::clone(&store);
        let analytics = Arc::clone(&analytics);

        Box::pin(async move {
            run_recalculation_job(store.as_ref(), &analytics).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, tz = %tz, "scheduler: registered daily recalculation job");
    Ok(())
}

async fn register_weekly_report_job(
    scheduler: &JobScheduler,
    cron: &str,
    tz: Tz,
    store: Arc<dyn AnalyticsStore>,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async_tz(cron, tz, move |_uuid, _lock| {
        let store = Arc::clone(&store);

        Box::pin(async move {
            run_weekly_report_job(store.as_ref()).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, tz = %tz, "scheduler: registered weekly report job");
    Ok(())
}

/// Runs one recalculation. Failures are logged; the next tick retries.
async fn run_recalculation_job(store: &dyn AnalyticsStore, analytics: &AnalyticsConfig) {
    tracing::info!("scheduler: starting daily analytics recalculation");
    match run_full_recalculation(store, analytics).await {
        Ok(summary) => tracing::info!(
            locations = summary.locations,
            cities = summary.cities,
            gaps = summary.gaps,
            insights = summary.insights,
            "scheduler: daily analytics recalculation complete"
        ),
        Err(e) => tracing::error!(error = %e, "scheduler: daily analytics recalculation failed"),
    }
}

async fn run_weekly_report_job(store: &dyn AnalyticsStore) {
    tracing::info!("scheduler: starting weekly report");
    match build_weekly_report(store).await {
        Ok(summary) => tracing::info!(
            locations = summary.locations,
            cities = summary.cities,
            gaps = summary.gaps,
            "scheduler: weekly report complete"
        ),
        Err(e) => tracing::error!(error = %e, "scheduler: weekly report failed"),
    }
}
