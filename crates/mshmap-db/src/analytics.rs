//! Read/write operations for the derived analytics tables: `region_overview`,
//! `city_stats`, `gaps` and `insights`.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use mshmap_core::{
    CategoryDistribution, CityStats, Coordinates, Gap, Insight, RegionOverview,
};

use crate::{from_db_count, to_db_count, DbError};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RegionOverviewRow {
    pub total_locations: i64,
    pub total_cities: i64,
    pub category_totals: Json<CategoryDistribution>,
    pub computed_at: DateTime<Utc>,
    pub extra: serde_json::Value,
}

impl TryFrom<RegionOverviewRow> for RegionOverview {
    type Error = DbError;

    fn try_from(row: RegionOverviewRow) -> Result<Self, Self::Error> {
        Ok(RegionOverview {
            total_locations: from_db_count("region_overview", "1", row.total_locations)?,
            total_cities: from_db_count("region_overview", "1", row.total_cities)?,
            category_totals: row.category_totals.0,
            computed_at: row.computed_at,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CityStatsRow {
    pub slug: String,
    pub city_name: String,
    pub location_count: i64,
    pub category_distribution: Json<CategoryDistribution>,
    pub coverage_score: f64,
    pub family_score: f64,
    pub avg_rating: Option<f64>,
    pub population: i64,
    pub computed_at: DateTime<Utc>,
}

impl TryFrom<CityStatsRow> for CityStats {
    type Error = DbError;

    fn try_from(row: CityStatsRow) -> Result<Self, Self::Error> {
        Ok(CityStats {
            location_count: from_db_count("city_stats", &row.slug, row.location_count)?,
            population: from_db_count("city_stats", &row.slug, row.population)?,
            city_name: row.city_name,
            category_distribution: row.category_distribution.0,
            coverage_score: row.coverage_score,
            family_score: row.family_score,
            avg_rating: row.avg_rating,
            computed_at: row.computed_at,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GapRow {
    pub id: String,
    pub gap_type: String,
    pub latitude: f64,
    pub longitude: f64,
    pub severity: String,
    pub description: String,
    pub affected_area: String,
    pub affected_population: i64,
    pub recommendation: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<GapRow> for Gap {
    type Error = DbError;

    fn try_from(row: GapRow) -> Result<Self, Self::Error> {
        let invalid = |reason: String| DbError::InvalidRow {
            table: "gaps",
            key: row.id.clone(),
            reason,
        };
        let gap_type = row.gap_type.parse().map_err(invalid)?;
        let severity = row.severity.parse().map_err(invalid)?;
        let affected_population =
            from_db_count("gaps", &row.id, row.affected_population)?;

        Ok(Gap {
            id: row.id,
            gap_type,
            coordinates: Coordinates::new(row.latitude, row.longitude),
            severity,
            description: row.description,
            affected_area: row.affected_area,
            affected_population,
            recommendation: row.recommendation,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InsightRow {
    pub id: String,
    pub insight_type: String,
    pub title: String,
    pub description: String,
    pub metric: Option<String>,
    pub value: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<InsightRow> for Insight {
    type Error = DbError;

    fn try_from(row: InsightRow) -> Result<Self, Self::Error> {
        let kind = row
            .insight_type
            .parse()
            .map_err(|reason| DbError::InvalidRow {
                table: "insights",
                key: row.id.clone(),
                reason,
            })?;

        Ok(Insight {
            id: row.id,
            kind,
            title: row.title,
            description: row.description,
            metric: row.metric,
            value: row.value,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Region overview
// ---------------------------------------------------------------------------

/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_region_overview(pool: &PgPool) -> Result<Option<RegionOverviewRow>, sqlx::Error> {
    sqlx::query_as::<_, RegionOverviewRow>(
        "SELECT total_locations, total_cities, category_totals, computed_at, extra \
         FROM region_overview \
         WHERE id = 1",
    )
    .fetch_optional(pool)
    .await
}

/// Upsert the singleton overview row. `extra` is never touched.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn upsert_region_overview(
    pool: &PgPool,
    overview: &RegionOverview,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO region_overview (id, total_locations, total_cities, category_totals, computed_at) \
         VALUES (1, $1, $2, $3, $4) \
         ON CONFLICT (id) DO UPDATE SET \
             total_locations = EXCLUDED.total_locations, \
             total_cities    = EXCLUDED.total_cities, \
             category_totals = EXCLUDED.category_totals, \
             computed_at     = EXCLUDED.computed_at, \
             updated_at      = NOW()",
    )
    .bind(to_db_count(overview.total_locations))
    .bind(to_db_count(overview.total_cities))
    .bind(Json(&overview.category_totals))
    .bind(overview.computed_at)
    .execute(pool)
    .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// City stats
// ---------------------------------------------------------------------------

/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn upsert_city_stats(
    pool: &PgPool,
    slug: &str,
    stats: &CityStats,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO city_stats \
             (slug, city_name, location_count, category_distribution, coverage_score, \
              family_score, avg_rating, population, computed_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (slug) DO UPDATE SET \
             city_name             = EXCLUDED.city_name, \
             location_count        = EXCLUDED.location_count, \
             category_distribution = EXCLUDED.category_distribution, \
             coverage_score        = EXCLUDED.coverage_score, \
             family_score          = EXCLUDED.family_score, \
             avg_rating            = EXCLUDED.avg_rating, \
             population            = EXCLUDED.population, \
             computed_at           = EXCLUDED.computed_at, \
             updated_at            = NOW()",
    )
    .bind(slug)
    .bind(&stats.city_name)
    .bind(to_db_count(stats.location_count))
    .bind(Json(&stats.category_distribution))
    .bind(stats.coverage_score)
    .bind(stats.family_score)
    .bind(stats.avg_rating)
    .bind(to_db_count(stats.population))
    .bind(stats.computed_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// All city stats ordered by city name.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_city_stats(pool: &PgPool) -> Result<Vec<CityStatsRow>, sqlx::Error> {
    sqlx::query_as::<_, CityStatsRow>(
        "SELECT slug, city_name, location_count, category_distribution, coverage_score, \
                family_score, avg_rating, population, computed_at \
         FROM city_stats \
         ORDER BY city_name",
    )
    .fetch_all(pool)
    .await
}

// ---------------------------------------------------------------------------
// Gaps
// ---------------------------------------------------------------------------

/// Delete every stored gap and insert `gaps`, in one transaction.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if any statement fails; the transaction is rolled
/// back and the previous gap set stays visible.
pub async fn replace_all_gaps(pool: &PgPool, gaps: &[Gap]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM gaps").execute(&mut *tx).await?;

    for gap in gaps {
        sqlx::query(
            "INSERT INTO gaps \
                 (id, gap_type, latitude, longitude, severity, description, affected_area, \
                  affected_population, recommendation, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&gap.id)
        .bind(gap.gap_type.to_string())
        .bind(gap.coordinates.latitude)
        .bind(gap.coordinates.longitude)
        .bind(gap.severity.as_str())
        .bind(&gap.description)
        .bind(&gap.affected_area)
        .bind(to_db_count(gap.affected_population))
        .bind(&gap.recommendation)
        .bind(gap.created_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Gaps ordered by severity (critical first), then id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_gaps(pool: &PgPool) -> Result<Vec<GapRow>, sqlx::Error> {
    sqlx::query_as::<_, GapRow>(
        "SELECT id, gap_type, latitude, longitude, severity, description, affected_area, \
                affected_population, recommendation, created_at \
         FROM gaps \
         ORDER BY CASE severity WHEN 'critical' THEN 0 WHEN 'moderate' THEN 1 ELSE 2 END, id",
    )
    .fetch_all(pool)
    .await
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

/// Upsert every insight by id in one transaction. Nothing is deleted.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if any statement fails.
pub async fn upsert_insights(pool: &PgPool, insights: &[Insight]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    for insight in insights {
        sqlx::query(
            "INSERT INTO insights (id, insight_type, title, description, metric, value, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO UPDATE SET \
                 insight_type = EXCLUDED.insight_type, \
                 title        = EXCLUDED.title, \
                 description  = EXCLUDED.description, \
                 metric       = EXCLUDED.metric, \
                 value        = EXCLUDED.value, \
                 created_at   = EXCLUDED.created_at, \
                 updated_at   = NOW()",
        )
        .bind(&insight.id)
        .bind(insight.kind.as_str())
        .bind(&insight.title)
        .bind(&insight.description)
        .bind(&insight.metric)
        .bind(insight.value)
        .bind(insight.created_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_insights(pool: &PgPool) -> Result<Vec<InsightRow>, sqlx::Error> {
    sqlx::query_as::<_, InsightRow>(
        "SELECT id, insight_type, title, description, metric, value, created_at \
         FROM insights \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gap_row(gap_type: &str, severity: &str) -> GapRow {
        GapRow {
            id: "no-pool-hettstedt".to_string(),
            gap_type: gap_type.to_string(),
            latitude: 51.65,
            longitude: 11.5,
            severity: severity.to_string(),
            description: "Hettstedt: Kein Schwimmbad im Umkreis von 15km".to_string(),
            affected_area: "Hettstedt".to_string(),
            affected_population: 15_000,
            recommendation: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn gap_row_converts_to_domain() {
        let gap = Gap::try_from(gap_row("no_pool", "moderate")).expect("valid row");
        assert_eq!(gap.gap_type.to_string(), "no_pool");
        assert_eq!(gap.affected_population, 15_000);
        assert_eq!(gap.coordinates, Coordinates::new(51.65, 11.5));
    }

    #[test]
    fn gap_row_with_unknown_severity_is_rejected() {
        let err = Gap::try_from(gap_row("no_pool", "severe")).unwrap_err();
        assert!(matches!(err, DbError::InvalidRow { table: "gaps", .. }));
    }

    #[test]
    fn insight_row_with_unknown_type_is_rejected() {
        let row = InsightRow {
            id: "x".to_string(),
            insight_type: "rumour".to_string(),
            title: String::new(),
            description: String::new(),
            metric: None,
            value: None,
            created_at: Utc::now(),
        };
        assert!(Insight::try_from(row).is_err());
    }

    #[test]
    fn negative_city_count_is_rejected() {
        let row = CityStatsRow {
            slug: "mansfeld".to_string(),
            city_name: "Mansfeld".to_string(),
            location_count: -3,
            category_distribution: Json(CategoryDistribution::new()),
            coverage_score: 0.0,
            family_score: 0.0,
            avg_rating: None,
            population: 9_000,
            computed_at: Utc::now(),
        };
        assert!(CityStats::try_from(row).is_err());
    }
}
