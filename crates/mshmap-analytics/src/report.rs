//! Weekly snapshot of the stored analytics artifacts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use mshmap_core::{CategoryDistribution, CityStats, Gap, RegionOverview};

use crate::store::{AnalyticsStore, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub generated_at: DateTime<Utc>,
    pub overview: RegionOverview,
    pub cities: Vec<CityStats>,
    pub gaps: Vec<Gap>,
}

impl WeeklyReport {
    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            locations: self.overview.total_locations,
            cities: self.cities.len(),
            gaps: self.gaps.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub locations: u64,
    pub cities: usize,
    pub gaps: usize,
}

fn empty_overview(now: DateTime<Utc>) -> RegionOverview {
    RegionOverview {
        total_locations: 0,
        total_cities: 0,
        category_totals: CategoryDistribution::new(),
        computed_at: now,
    }
}

/// Assemble a report from what the store currently holds and save it.
///
/// A missing overview is reported as zeros.
///
/// # Errors
///
/// Returns `StoreError` if any read or the final save fails.
pub async fn build_weekly_report(store: &dyn AnalyticsStore) -> Result<ReportSummary, StoreError> {
    let now = Utc::now();

    let overview = match store.read_region_overview().await? {
        Some(overview) => overview,
        None => {
            warn!("no region overview stored; weekly report uses zero totals");
            empty_overview(now)
        }
    };
    let cities = store.list_city_stats().await?;
    let gaps = store.list_gaps().await?;

    let report = WeeklyReport {
        generated_at: now,
        overview,
        cities,
        gaps,
    };
    store.save_report(&report).await?;

    let summary = report.summary();
    info!(
        locations = summary.locations,
        cities = summary.cities,
        gaps = summary.gaps,
        "weekly report saved"
    );
    Ok(summary)
}
