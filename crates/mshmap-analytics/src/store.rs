//! Persistence boundary for the recalculation pipeline.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use thiserror::Error;

use mshmap_core::{slugify, CityStats, Gap, Insight, LocationRecord, RegionOverview};

use crate::report::WeeklyReport;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("invalid {kind} record '{key}': {reason}")]
    InvalidRecord {
        kind: &'static str,
        key: String,
        reason: String,
    },

    #[error("in-memory store lock poisoned")]
    Poisoned,

    #[error("injected failure on {0}")]
    Injected(&'static str),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

/// Document store holding the location snapshot and every derived artifact.
///
/// Each `replace_*` call is atomic for its artifact type: readers see either
/// the previous or the new set, never a mix.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Liveness probe of the backing store.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn read_all_locations(&self) -> Result<Vec<LocationRecord>, StoreError>;

    async fn read_region_overview(&self) -> Result<Option<RegionOverview>, StoreError>;

    /// Upsert; fields the overview does not own are preserved.
    async fn replace_region_overview(&self, overview: &RegionOverview) -> Result<(), StoreError>;

    /// Upsert one city's stats, keyed by the slug of `city_name`.
    async fn replace_city_stats(&self, city_name: &str, stats: &CityStats)
        -> Result<(), StoreError>;

    /// Delete every stored gap and insert `gaps` in one unit.
    async fn replace_all_gaps(&self, gaps: &[Gap]) -> Result<(), StoreError>;

    /// Upsert by id. Insights missing from `insights` are left in place.
    async fn replace_all_insights(&self, insights: &[Insight]) -> Result<(), StoreError>;

    async fn list_city_stats(&self) -> Result<Vec<CityStats>, StoreError>;

    async fn list_gaps(&self) -> Result<Vec<Gap>, StoreError>;

    async fn list_insights(&self) -> Result<Vec<Insight>, StoreError>;

    async fn save_report(&self, report: &WeeklyReport) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    locations: Vec<LocationRecord>,
    overview: Option<RegionOverview>,
    city_stats: BTreeMap<String, CityStats>,
    gaps: Vec<Gap>,
    insights: BTreeMap<String, Insight>,
    reports: Vec<WeeklyReport>,
    fail_on: Option<&'static str>,
}

/// `AnalyticsStore` held entirely in process memory.
///
/// Used for dry runs and tests. `fail_on` makes the named operation return
/// `StoreError::Injected`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    #[must_use]
    pub fn with_locations(locations: Vec<LocationRecord>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                locations,
                ..MemoryState::default()
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Poisoned)
    }

    fn guarded(&self, op: &'static str) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        let state = self.lock()?;
        if state.fail_on == Some(op) {
            return Err(StoreError::Injected(op));
        }
        Ok(state)
    }

    /// Make every later call of `op` fail.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the state lock is poisoned.
    pub fn fail_on(&self, op: &'static str) -> Result<(), StoreError> {
        self.lock()?.fail_on = Some(op);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the state lock is poisoned.
    pub fn set_locations(&self, locations: Vec<LocationRecord>) -> Result<(), StoreError> {
        self.lock()?.locations = locations;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the state lock is poisoned.
    pub fn reports(&self) -> Result<Vec<WeeklyReport>, StoreError> {
        Ok(self.lock()?.reports.clone())
    }
}

#[async_trait]
impl AnalyticsStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.guarded("ping").map(drop)
    }

    async fn read_all_locations(&self) -> Result<Vec<LocationRecord>, StoreError> {
        Ok(self.guarded("read_all_locations")?.locations.clone())
    }

    async fn read_region_overview(&self) -> Result<Option<RegionOverview>, StoreError> {
        Ok(self.guarded("read_region_overview")?.overview.clone())
    }

    async fn replace_region_overview(&self, overview: &RegionOverview) -> Result<(), StoreError> {
        self.guarded("replace_region_overview")?.overview = Some(overview.clone());
        Ok(())
    }

    async fn replace_city_stats(
        &self,
        city_name: &str,
        stats: &CityStats,
    ) -> Result<(), StoreError> {
        self.guarded("replace_city_stats")?
            .city_stats
            .insert(slugify(city_name), stats.clone());
        Ok(())
    }

    async fn replace_all_gaps(&self, gaps: &[Gap]) -> Result<(), StoreError> {
        self.guarded("replace_all_gaps")?.gaps = gaps.to_vec();
        Ok(())
    }

    async fn replace_all_insights(&self, insights: &[Insight]) -> Result<(), StoreError> {
        let mut state = self.guarded("replace_all_insights")?;
        for insight in insights {
            state.insights.insert(insight.id.clone(), insight.clone());
        }
        Ok(())
    }

    async fn list_city_stats(&self) -> Result<Vec<CityStats>, StoreError> {
        Ok(self
            .guarded("list_city_stats")?
            .city_stats
            .values()
            .cloned()
            .collect())
    }

    async fn list_gaps(&self) -> Result<Vec<Gap>, StoreError> {
        Ok(self.guarded("list_gaps")?.gaps.clone())
    }

    async fn list_insights(&self) -> Result<Vec<Insight>, StoreError> {
        Ok(self
            .guarded("list_insights")?
            .insights
            .values()
            .cloned()
            .collect())
    }

    async fn save_report(&self, report: &WeeklyReport) -> Result<(), StoreError> {
        self.guarded("save_report")?.reports.push(report.clone());
        Ok(())
    }
}
