//! Database operations for the append-only `reports` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use mshmap_analytics::WeeklyReport;

use crate::{to_db_count, DbError};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReportRow {
    pub id: i64,
    pub public_id: Uuid,
    pub report_type: String,
    pub generated_at: DateTime<Utc>,
    pub locations: i64,
    pub cities: i32,
    pub gaps: i32,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Store a weekly report; the summary counts are copied into columns so
/// listings do not need to parse the payload.
///
/// # Errors
///
/// Returns [`DbError`] if serialization or the insert fails.
pub async fn insert_report(pool: &PgPool, report: &WeeklyReport) -> Result<ReportRow, DbError> {
    let summary = report.summary();
    let payload = serde_json::to_value(report)?;

    let row = sqlx::query_as::<_, ReportRow>(
        "INSERT INTO reports (report_type, generated_at, locations, cities, gaps, payload) \
         VALUES ('weekly', $1, $2, $3, $4, $5) \
         RETURNING id, public_id, report_type, generated_at, locations, cities, gaps, payload, \
                   created_at",
    )
    .bind(report.generated_at)
    .bind(to_db_count(summary.locations))
    .bind(i32::try_from(summary.cities).unwrap_or(i32::MAX))
    .bind(i32::try_from(summary.gaps).unwrap_or(i32::MAX))
    .bind(payload)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Most recent reports first.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_recent_reports(pool: &PgPool, limit: i64) -> Result<Vec<ReportRow>, sqlx::Error> {
    sqlx::query_as::<_, ReportRow>(
        "SELECT id, public_id, report_type, generated_at, locations, cities, gaps, payload, \
                created_at \
         FROM reports \
         ORDER BY generated_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
