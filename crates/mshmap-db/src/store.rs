//! Postgres-backed [`AnalyticsStore`].

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use mshmap_analytics::{AnalyticsStore, StoreError, WeeklyReport};
use mshmap_core::{slugify, CityStats, Gap, Insight, LocationRecord, RegionOverview};

use crate::{analytics, locations, reports, DbError};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::InvalidRow { table, key, reason } => StoreError::InvalidRecord {
                kind: table,
                key,
                reason,
            },
            other => StoreError::backend(other),
        }
    }
}

fn db_err(err: sqlx::Error) -> StoreError {
    StoreError::backend(DbError::from(err))
}

#[async_trait]
impl AnalyticsStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }

    async fn read_all_locations(&self) -> Result<Vec<LocationRecord>, StoreError> {
        let rows = locations::list_locations(&self.pool).await.map_err(db_err)?;
        debug!(rows = rows.len(), "loaded location snapshot");
        Ok(rows.into_iter().map(LocationRecord::from).collect())
    }

    async fn read_region_overview(&self) -> Result<Option<RegionOverview>, StoreError> {
        let row = analytics::get_region_overview(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(RegionOverview::try_from).transpose()?)
    }

    async fn replace_region_overview(&self, overview: &RegionOverview) -> Result<(), StoreError> {
        analytics::upsert_region_overview(&self.pool, overview)
            .await
            .map_err(db_err)
    }

    async fn replace_city_stats(
        &self,
        city_name: &str,
        stats: &CityStats,
    ) -> Result<(), StoreError> {
        analytics::upsert_city_stats(&self.pool, &slugify(city_name), stats)
            .await
            .map_err(db_err)
    }

    async fn replace_all_gaps(&self, gaps: &[Gap]) -> Result<(), StoreError> {
        analytics::replace_all_gaps(&self.pool, gaps)
            .await
            .map_err(db_err)
    }

    async fn replace_all_insights(&self, insights: &[Insight]) -> Result<(), StoreError> {
        analytics::upsert_insights(&self.pool, insights)
            .await
            .map_err(db_err)
    }

    async fn list_city_stats(&self) -> Result<Vec<CityStats>, StoreError> {
        let rows = analytics::list_city_stats(&self.pool).await.map_err(db_err)?;
        Ok(rows
            .into_iter()
            .map(CityStats::try_from)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn list_gaps(&self) -> Result<Vec<Gap>, StoreError> {
        let rows = analytics::list_gaps(&self.pool).await.map_err(db_err)?;
        Ok(rows
            .into_iter()
            .map(Gap::try_from)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn list_insights(&self) -> Result<Vec<Insight>, StoreError> {
        let rows = analytics::list_insights(&self.pool).await.map_err(db_err)?;
        Ok(rows
            .into_iter()
            .map(Insight::try_from)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn save_report(&self, report: &WeeklyReport) -> Result<(), StoreError> {
        let row = reports::insert_report(&self.pool, report).await?;
        debug!(report_id = %row.public_id, "weekly report stored");
        Ok(())
    }
}
