//! Population-normalized coverage scores.
//!
//! Both scores are clamped to `[0, 1]`. A population of zero never divides:
//! it yields no positive expectation and therefore the neutral score (coverage)
//! or zero (family).

use mshmap_core::{CategoryDistribution, CoverageConfig, FamilyConfig};

const PER_POPULATION: f64 = 10_000.0;

#[allow(clippy::cast_precision_loss)]
fn expected_count(per_10k: f64, population: u64) -> f64 {
    per_10k * population as f64 / PER_POPULATION
}

#[allow(clippy::cast_precision_loss)]
fn count_of(distribution: &CategoryDistribution, category: &str) -> f64 {
    distribution.get(category).copied().unwrap_or(0) as f64
}

/// Mean of `min(1, actual / expected)` over every target with a positive
/// expectation, or `config.neutral_score` when there is none.
#[must_use]
pub fn coverage_score(
    distribution: &CategoryDistribution,
    population: u64,
    config: &CoverageConfig,
) -> f64 {
    let ratios: Vec<f64> = config
        .targets
        .iter()
        .filter_map(|target| {
            let expected = expected_count(target.per_10k, population);
            (expected > 0.0).then(|| (count_of(distribution, &target.category) / expected).min(1.0))
        })
        .collect();

    if ratios.is_empty() {
        return config.neutral_score.clamp(0.0, 1.0);
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
    mean.clamp(0.0, 1.0)
}

/// `min(1, family_total / expected)`; zero when nothing is expected.
#[must_use]
pub fn family_score(
    distribution: &CategoryDistribution,
    population: u64,
    config: &FamilyConfig,
) -> f64 {
    let total: f64 = config
        .categories
        .iter()
        .map(|category| count_of(distribution, category))
        .sum();
    let expected = expected_count(config.target_per_10k, population);

    if expected > 0.0 {
        (total / expected).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use mshmap_core::CategoryTarget;

    use super::*;

    fn dist(entries: &[(&str, u64)]) -> CategoryDistribution {
        entries
            .iter()
            .map(|(category, count)| ((*category).to_string(), *count))
            .collect()
    }

    #[test]
    fn empty_city_scores_zero() {
        let config = CoverageConfig::default();
        assert_eq!(coverage_score(&dist(&[]), 26_000, &config), 0.0);
        assert_eq!(
            family_score(&dist(&[]), 26_000, &FamilyConfig::default()),
            0.0
        );
    }

    #[test]
    fn coverage_is_mean_of_capped_ratios() {
        // population 10 000: expected playground 3, pool 0.5, museum 0.5, restaurant 5
        let d = dist(&[("playground", 3), ("pool", 5), ("restaurant", 1)]);
        let score = coverage_score(&d, 10_000, &CoverageConfig::default());
        let expected = (1.0 + 1.0 + 0.0 + 0.2) / 4.0;
        assert!((score - expected).abs() < 1e-12, "got {score}");
    }

    #[test]
    fn targets_met_exactly_score_one() {
        let config = CoverageConfig {
            targets: vec![
                CategoryTarget::new("playground", 3.0),
                CategoryTarget::new("pool", 1.0),
                CategoryTarget::new("restaurant", 5.0),
            ],
            neutral_score: 0.5,
        };
        let d = dist(&[("playground", 3), ("pool", 1), ("restaurant", 5)]);
        assert_eq!(coverage_score(&d, 10_000, &config), 1.0);
    }

    #[test]
    fn surplus_is_capped_at_one() {
        let d = dist(&[
            ("playground", 500),
            ("pool", 500),
            ("museum", 500),
            ("restaurant", 500),
        ]);
        assert_eq!(coverage_score(&d, 10_000, &CoverageConfig::default()), 1.0);
        assert_eq!(family_score(&d, 10_000, &FamilyConfig::default()), 1.0);
    }

    #[test]
    fn no_positive_expectation_is_neutral() {
        let config = CoverageConfig {
            targets: vec![CategoryTarget::new("playground", 0.0)],
            neutral_score: 0.5,
        };
        assert_eq!(coverage_score(&dist(&[("playground", 4)]), 10_000, &config), 0.5);
        assert_eq!(
            coverage_score(&dist(&[]), 0, &CoverageConfig::default()),
            0.5
        );
    }

    #[test]
    fn zero_target_is_skipped_not_averaged() {
        let config = CoverageConfig {
            targets: vec![
                CategoryTarget::new("playground", 1.0),
                CategoryTarget::new("zoo", 0.0),
            ],
            neutral_score: 0.5,
        };
        assert_eq!(coverage_score(&dist(&[("playground", 1)]), 10_000, &config), 1.0);
    }

    #[test]
    fn family_score_sums_family_categories() {
        // expected = 10 * 20 000 / 10 000 = 20; family total = 4 + 1 + 5 = 10
        let d = dist(&[("playground", 4), ("zoo", 1), ("nature", 5), ("restaurant", 50)]);
        let score = family_score(&d, 20_000, &FamilyConfig::default());
        assert!((score - 0.5).abs() < 1e-12, "got {score}");
    }

    #[test]
    fn family_score_with_zero_population_is_zero() {
        assert_eq!(
            family_score(&dist(&[("playground", 3)]), 0, &FamilyConfig::default()),
            0.0
        );
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let coverage = CoverageConfig::default();
        let family = FamilyConfig::default();
        for population in [1, 999, 10_000, 26_000, 1_000_000] {
            for count in [0, 1, 2, 7, 100, 10_000] {
                let d = dist(&[
                    ("playground", count),
                    ("pool", count / 2),
                    ("museum", count / 3),
                    ("nature", count),
                ]);
                let c = coverage_score(&d, population, &coverage);
                let f = family_score(&d, population, &family);
                assert!((0.0..=1.0).contains(&c), "coverage {c}");
                assert!((0.0..=1.0).contains(&f), "family {f}");
            }
        }
    }
}
