//! Full batch recalculation against an `AnalyticsStore`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use mshmap_core::AnalyticsConfig;

use crate::aggregator::{build_city_stats, build_region_overview};
use crate::gaps::detect_gaps;
use crate::insights::generate_insights;
use crate::store::{AnalyticsStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalculationSummary {
    pub locations: usize,
    pub cities: usize,
    pub gaps: usize,
    pub insights: usize,
    pub completed_at: DateTime<Utc>,
}

/// Overview, city stats, gaps, then insights, each written before the next
/// phase starts.
///
/// Insights are generated from the overview read back from the store. If none
/// is stored no insights are written.
///
/// # Errors
///
/// Returns the first `StoreError`; artifacts written by earlier phases stay.
pub async fn run_full_recalculation(
    store: &dyn AnalyticsStore,
    config: &AnalyticsConfig,
) -> Result<RecalculationSummary, StoreError> {
    let now = Utc::now();
    let locations = store.read_all_locations().await?;
    info!(locations = locations.len(), "starting full recalculation");

    let overview = build_region_overview(&locations, config, now);
    store.replace_region_overview(&overview).await?;
    info!(
        total_locations = overview.total_locations,
        categories = overview.category_totals.len(),
        "region overview written"
    );

    let city_stats = build_city_stats(&locations, config, now);
    for stats in &city_stats {
        debug!(
            city = %stats.city_name,
            locations = stats.location_count,
            coverage = stats.coverage_score,
            family = stats.family_score,
            "city stats"
        );
        store.replace_city_stats(&stats.city_name, stats).await?;
    }
    info!(cities = city_stats.len(), "city stats written");

    let gaps = detect_gaps(&locations, config, now);
    store.replace_all_gaps(&gaps).await?;
    info!(gaps = gaps.len(), "gaps replaced");

    let insights = match store.read_region_overview().await? {
        Some(stored) => generate_insights(&stored, config, now),
        None => {
            warn!("no region overview found; skipping insight generation");
            Vec::new()
        }
    };
    if !insights.is_empty() {
        store.replace_all_insights(&insights).await?;
    }
    info!(insights = insights.len(), "insights written");

    Ok(RecalculationSummary {
        locations: locations.len(),
        cities: city_stats.len(),
        gaps: gaps.len(),
        insights: insights.len(),
        completed_at: Utc::now(),
    })
}
