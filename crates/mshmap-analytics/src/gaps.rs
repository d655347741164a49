//! City-centric infrastructure gap detection.
//!
//! Every in-region city is checked against the nearest location of each
//! monitored category. A category with no located entries anywhere counts as
//! infinitely far away and always produces a gap.

use chrono::{DateTime, Utc};
use tracing::debug;

use mshmap_core::{
    slugify, AnalyticsConfig, CategoryGapRule, CityProfile, Gap, GapType, LocationRecord,
    Severity,
};

use crate::geo::distance_between;

/// Distance from `city` to the nearest located record tagged `category`.
///
/// `f64::INFINITY` when no such record has coordinates.
#[must_use]
pub fn nearest_distance_km(city: &CityProfile, locations: &[LocationRecord], category: &str) -> f64 {
    let origin = city.coordinates();
    locations
        .iter()
        .filter(|l| l.category.as_deref() == Some(category))
        .filter_map(|l| l.coordinates)
        .map(|coords| distance_between(origin, coords))
        .fold(f64::INFINITY, f64::min)
}

fn gap_id(gap_type: &GapType, city_name: &str) -> String {
    format!("{}-{}", gap_type.id_prefix(), slugify(city_name))
}

/// Playground deserts followed by every configured category gap, in
/// registry order within each detector.
#[must_use]
pub fn detect_gaps(
    locations: &[LocationRecord],
    config: &AnalyticsConfig,
    now: DateTime<Utc>,
) -> Vec<Gap> {
    let mut gaps = detect_playground_deserts(locations, config, now);
    for rule in &config.category_gaps {
        gaps.extend(detect_category_gaps(locations, config, rule, now));
    }
    gaps
}

#[must_use]
pub fn detect_playground_deserts(
    locations: &[LocationRecord],
    config: &AnalyticsConfig,
    now: DateTime<Utc>,
) -> Vec<Gap> {
    let rule = &config.playground_desert;
    let mut gaps = Vec::new();

    for city in config.gap_cities() {
        let min_dist = nearest_distance_km(city, locations, &rule.category);
        debug!(city = %city.name, distance_km = min_dist, "nearest playground");

        if min_dist <= rule.max_distance_km {
            continue;
        }

        let severity = if min_dist > rule.critical_distance_km {
            Severity::Critical
        } else {
            Severity::Moderate
        };

        let description = if min_dist.is_finite() {
            format!("{}: Nächster Spielplatz {min_dist:.1} km entfernt", city.name)
        } else {
            format!("{}: Kein Spielplatz erfasst", city.name)
        };

        let gap_type = GapType::PlaygroundDesert;
        gaps.push(Gap {
            id: gap_id(&gap_type, &city.name),
            gap_type,
            coordinates: city.coordinates(),
            severity,
            description,
            affected_area: city.name.clone(),
            affected_population: city.population,
            recommendation: Some(format!("Spielplatz im Zentrum von {} einrichten", city.name)),
            created_at: now,
        });
    }

    gaps
}

#[must_use]
pub fn detect_category_gaps(
    locations: &[LocationRecord],
    config: &AnalyticsConfig,
    rule: &CategoryGapRule,
    now: DateTime<Utc>,
) -> Vec<Gap> {
    config
        .gap_cities()
        .filter(|city| nearest_distance_km(city, locations, &rule.category) > rule.max_distance_km)
        .map(|city| {
            let gap_type = GapType::MissingCategory(rule.category.clone());
            Gap {
                id: gap_id(&gap_type, &city.name),
                gap_type,
                coordinates: city.coordinates(),
                severity: Severity::Moderate,
                description: format!(
                    "{}: Kein {} im Umkreis von {}km",
                    city.name, rule.label, rule.max_distance_km
                ),
                affected_area: city.name.clone(),
                affected_population: city.population,
                recommendation: None,
                created_at: now,
            }
        })
        .collect()
}
