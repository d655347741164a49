//! `analytics` command handlers.

use chrono::Utc;
use clap::Subcommand;

use mshmap_analytics::{
    build_weekly_report, compute_artifacts, run_full_recalculation, AnalyticsStore, Artifacts,
};
use mshmap_core::AnalyticsConfig;
use mshmap_db::PgStore;

/// Sub-commands available under `analytics`.
#[derive(Debug, Subcommand)]
pub enum AnalyticsCommands {
    /// Recompute overview, city stats, gaps and insights
    Recalculate {
        /// Print the computed artifacts as JSON instead of writing them
        #[arg(long)]
        dry_run: bool,
    },
    /// Build and store the weekly report
    Report,
}

pub(crate) async fn run(
    pool: &sqlx::PgPool,
    config: &AnalyticsConfig,
    command: AnalyticsCommands,
) -> anyhow::Result<()> {
    let store = PgStore::new(pool.clone());

    match command {
        AnalyticsCommands::Recalculate { dry_run: true } => {
            let locations = store.read_all_locations().await?;
            tracing::info!(locations = locations.len(), "dry-run: computing artifacts");
            let artifacts = compute_artifacts(&locations, config, Utc::now());
            println!("{}", render_artifacts(&artifacts)?);
        }
        AnalyticsCommands::Recalculate { dry_run: false } => {
            let summary = run_full_recalculation(&store, config).await?;
            println!(
                "recalculated {} locations: {} cities, {} gaps, {} insights",
                summary.locations, summary.cities, summary.gaps, summary.insights
            );
        }
        AnalyticsCommands::Report => {
            let summary = build_weekly_report(&store).await?;
            println!(
                "weekly report stored: {} locations, {} cities, {} gaps",
                summary.locations, summary.cities, summary.gaps
            );
        }
    }

    Ok(())
}

/// Pretty JSON for `recalculate --dry-run`.
pub(crate) fn render_artifacts(artifacts: &Artifacts) -> serde_json::Result<String> {
    serde_json::to_string_pretty(artifacts)
}
