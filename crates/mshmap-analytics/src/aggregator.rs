//! Region-wide totals and per-city statistics.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use mshmap_core::{
    AnalyticsConfig, CategoryDistribution, CityStats, Gap, Insight, LocationRecord,
    RegionOverview,
};

use crate::gaps::detect_gaps;
use crate::insights::generate_insights;
use crate::resolver::resolve_city;
use crate::scorer::{coverage_score, family_score};

/// Everything one recalculation pass produces.
#[derive(Debug, Clone, Serialize)]
pub struct Artifacts {
    pub overview: RegionOverview,
    pub city_stats: Vec<CityStats>,
    pub gaps: Vec<Gap>,
    pub insights: Vec<Insight>,
}

/// Totals over every record, located or not. Missing categories count under
/// the fallback category.
///
/// `total_cities` counts distinct city hints as recorded, unresolved.
#[must_use]
pub fn build_region_overview(
    locations: &[LocationRecord],
    config: &AnalyticsConfig,
    now: DateTime<Utc>,
) -> RegionOverview {
    let mut category_totals = CategoryDistribution::new();
    let mut cities = BTreeSet::new();

    for location in locations {
        *category_totals
            .entry(location.category_or(&config.fallback_category).to_string())
            .or_insert(0) += 1;
        if let Some(hint) = location.city_hint() {
            cities.insert(hint);
        }
    }

    RegionOverview {
        total_locations: locations.len() as u64,
        total_cities: cities.len() as u64,
        category_totals,
        computed_at: now,
    }
}

#[derive(Default)]
struct CityBucket {
    count: u64,
    distribution: CategoryDistribution,
    rating_sum: f64,
    rated: u32,
}

/// One `CityStats` per resolved city, ordered by city name.
#[must_use]
pub fn build_city_stats(
    locations: &[LocationRecord],
    config: &AnalyticsConfig,
    now: DateTime<Utc>,
) -> Vec<CityStats> {
    let mut buckets: BTreeMap<&str, CityBucket> = BTreeMap::new();

    for location in locations {
        let bucket = buckets.entry(resolve_city(location, config)).or_default();
        bucket.count += 1;
        *bucket
            .distribution
            .entry(location.category_or(&config.fallback_category).to_string())
            .or_insert(0) += 1;
        if let Some(rating) = location.usable_rating() {
            bucket.rating_sum += rating;
            bucket.rated += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(city, bucket)| {
            let population = config.population_for(city);
            CityStats {
                city_name: city.to_string(),
                location_count: bucket.count,
                coverage_score: coverage_score(&bucket.distribution, population, &config.coverage),
                family_score: family_score(&bucket.distribution, population, &config.family),
                avg_rating: (bucket.rated > 0)
                    .then(|| bucket.rating_sum / f64::from(bucket.rated)),
                category_distribution: bucket.distribution,
                population,
                computed_at: now,
            }
        })
        .collect()
}

/// Compute all four artifacts without touching a store.
///
/// Insights are derived from the overview computed here rather than a stored
/// one.
#[must_use]
pub fn compute_artifacts(
    locations: &[LocationRecord],
    config: &AnalyticsConfig,
    now: DateTime<Utc>,
) -> Artifacts {
    let overview = build_region_overview(locations, config, now);
    let city_stats = build_city_stats(locations, config, now);
    let gaps = detect_gaps(locations, config, now);
    let insights = generate_insights(&overview, config, now);

    Artifacts {
        overview,
        city_stats,
        gaps,
        insights,
    }
}
