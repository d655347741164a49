//! Static reference data for one analytics pass: the city registry, the
//! per-population target tables and the gap/insight thresholds.
//!
//! Every component receives this struct by reference; nothing here is
//! process-global. `AnalyticsConfig::default()` describes Mansfeld-Südharz.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::slug::slugify;
use crate::types::Coordinates;
use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityProfile {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub population: u64,
    /// Cities outside the region attract location records during resolution
    /// but are not scanned for infrastructure gaps.
    #[serde(default = "default_in_region")]
    pub in_region: bool,
}

fn default_in_region() -> bool {
    true
}

impl CityProfile {
    #[must_use]
    pub fn new(name: &str, latitude: f64, longitude: f64, population: u64) -> Self {
        Self {
            name: name.to_string(),
            latitude,
            longitude,
            population,
            in_region: true,
        }
    }

    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    #[must_use]
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

/// Minimum number of locations of `category` expected per 10 000 residents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTarget {
    pub category: String,
    pub per_10k: f64,
}

impl CategoryTarget {
    #[must_use]
    pub fn new(category: &str, per_10k: f64) -> Self {
        Self {
            category: category.to_string(),
            per_10k,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    pub targets: Vec<CategoryTarget>,
    /// Score used when no target yields a positive expectation.
    pub neutral_score: f64,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            targets: vec![
                CategoryTarget::new("playground", 3.0),
                CategoryTarget::new("pool", 0.5),
                CategoryTarget::new("museum", 0.5),
                CategoryTarget::new("restaurant", 5.0),
            ],
            neutral_score: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FamilyConfig {
    pub categories: Vec<String>,
    pub target_per_10k: f64,
}

impl Default for FamilyConfig {
    fn default() -> Self {
        Self {
            categories: ["playground", "pool", "zoo", "museum", "nature"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            target_per_10k: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundDesertConfig {
    pub category: String,
    /// A city further than this from its nearest playground is a desert.
    pub max_distance_km: f64,
    /// Beyond this distance the desert is `critical` rather than `moderate`.
    pub critical_distance_km: f64,
}

impl Default for PlaygroundDesertConfig {
    fn default() -> Self {
        Self {
            category: "playground".to_string(),
            max_distance_km: 3.0,
            critical_distance_km: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGapRule {
    pub category: String,
    pub max_distance_km: f64,
    /// Human-readable label used in gap descriptions.
    pub label: String,
}

impl CategoryGapRule {
    #[must_use]
    pub fn new(category: &str, max_distance_km: f64, label: &str) -> Self {
        Self {
            category: category.to_string(),
            max_distance_km,
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Population assumed for the whole region when computing per-capita rates.
    pub assumed_population: u64,
    pub playground_shortage_per_10k: f64,
    pub recommended_playgrounds_per_10k: f64,
    /// Categories with fewer entries than this get a "collect more data" hint.
    pub low_count_threshold: u64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            assumed_population: 120_000,
            playground_shortage_per_10k: 2.0,
            recommended_playgrounds_per_10k: 3.0,
            low_count_threshold: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub region_name: String,
    /// Ordered: resolution picks the first matching entry.
    pub cities: Vec<CityProfile>,
    pub unknown_city: String,
    pub default_population: u64,
    pub fallback_category: String,
    pub coverage: CoverageConfig,
    pub family: FamilyConfig,
    pub playground_desert: PlaygroundDesertConfig,
    pub category_gaps: Vec<CategoryGapRule>,
    pub insights: InsightConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            region_name: "Mansfeld-Südharz".to_string(),
            cities: vec![
                CityProfile::new("Sangerhausen", 51.4667, 11.3, 26_000),
                CityProfile::new("Lutherstadt Eisleben", 51.5275, 11.5481, 24_000),
                CityProfile::new("Hettstedt", 51.65, 11.5, 15_000),
                CityProfile::new("Mansfeld", 51.5972, 11.4528, 9_000),
                CityProfile::new("Allstedt", 51.4, 11.3833, 8_000),
                CityProfile {
                    in_region: false,
                    ..CityProfile::new("Nordhausen", 51.5, 10.7833, 42_000)
                },
            ],
            unknown_city: "Unbekannt".to_string(),
            default_population: 10_000,
            fallback_category: "other".to_string(),
            coverage: CoverageConfig::default(),
            family: FamilyConfig::default(),
            playground_desert: PlaygroundDesertConfig::default(),
            category_gaps: vec![
                CategoryGapRule::new("pool", 15.0, "Schwimmbad"),
                CategoryGapRule::new("museum", 20.0, "Museum"),
                CategoryGapRule::new("restaurant", 5.0, "Restaurant"),
            ],
            insights: InsightConfig::default(),
        }
    }
}

impl AnalyticsConfig {
    #[must_use]
    pub fn find_city(&self, name: &str) -> Option<&CityProfile> {
        self.cities.iter().find(|c| c.name == name)
    }

    /// Registered population of `city_name`, or the default for unknown cities.
    #[must_use]
    pub fn population_for(&self, city_name: &str) -> u64 {
        self.find_city(city_name)
            .map_or(self.default_population, |c| c.population)
    }

    /// Cities scanned by gap detection, in registry order.
    pub fn gap_cities(&self) -> impl Iterator<Item = &CityProfile> {
        self.cities.iter().filter(|c| c.in_region)
    }
}

/// Load and validate an analytics configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_analytics_config(path: &Path) -> Result<AnalyticsConfig, ConfigError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::AnalyticsFileIo {
            path: path.display().to_string(),
            source: e,
        })?;

    parse_analytics_config(&content)
}

/// Load the YAML file at `path` when given, otherwise the built-in defaults.
///
/// # Errors
///
/// Returns `ConfigError` if a given file cannot be loaded or is invalid.
pub fn load_analytics_config_or_default(
    path: Option<&Path>,
) -> Result<AnalyticsConfig, ConfigError> {
    match path {
        Some(path) => load_analytics_config(path),
        None => Ok(AnalyticsConfig::default()),
    }
}

/// Parse and validate an analytics configuration from YAML text.
///
/// Omitted sections keep their default values.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_analytics_config(content: &str) -> Result<AnalyticsConfig, ConfigError> {
    let config: AnalyticsConfig =
        serde_yaml::from_str(content).map_err(ConfigError::AnalyticsFileParse)?;
    validate_analytics_config(&config)?;
    Ok(config)
}

fn validate_analytics_config(config: &AnalyticsConfig) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();
    let mut seen_slugs = HashSet::new();

    for city in &config.cities {
        if city.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "city name must be non-empty".to_string(),
            ));
        }

        if city.population == 0 {
            return Err(ConfigError::Validation(format!(
                "city '{}' has population 0; populations must be positive",
                city.name
            )));
        }

        if !city.latitude.is_finite() || !city.longitude.is_finite() {
            return Err(ConfigError::Validation(format!(
                "city '{}' has non-finite coordinates",
                city.name
            )));
        }

        if !seen_names.insert(city.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate city name: '{}'",
                city.name
            )));
        }

        let slug = city.slug();
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate city slug: '{}' (from city '{}')",
                slug, city.name
            )));
        }
    }

    if config.default_population == 0 {
        return Err(ConfigError::Validation(
            "default_population must be positive".to_string(),
        ));
    }

    if config.unknown_city.trim().is_empty() || config.fallback_category.trim().is_empty() {
        return Err(ConfigError::Validation(
            "unknown_city and fallback_category must be non-empty".to_string(),
        ));
    }

    for target in &config.coverage.targets {
        require_non_negative(&format!("coverage target '{}'", target.category), target.per_10k)?;
    }
    require_unit_interval("coverage.neutral_score", config.coverage.neutral_score)?;
    require_non_negative("family.target_per_10k", config.family.target_per_10k)?;

    let desert = &config.playground_desert;
    require_non_negative("playground_desert.max_distance_km", desert.max_distance_km)?;
    require_non_negative(
        "playground_desert.critical_distance_km",
        desert.critical_distance_km,
    )?;
    if desert.critical_distance_km < desert.max_distance_km {
        return Err(ConfigError::Validation(format!(
            "playground_desert.critical_distance_km ({}) must be >= max_distance_km ({})",
            desert.critical_distance_km, desert.max_distance_km
        )));
    }

    let mut seen_rules = HashSet::new();
    for rule in &config.category_gaps {
        if rule.category.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category gap rule needs a category".to_string(),
            ));
        }
        if !seen_rules.insert(rule.category.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category gap rule: '{}'",
                rule.category
            )));
        }
        require_non_negative(
            &format!("category gap '{}' max_distance_km", rule.category),
            rule.max_distance_km,
        )?;
    }

    if config.insights.assumed_population == 0 {
        return Err(ConfigError::Validation(
            "insights.assumed_population must be positive".to_string(),
        ));
    }

    Ok(())
}

fn require_non_negative(what: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{what} must be a finite, non-negative number (got {value})"
        )))
    }
}

fn require_unit_interval(what: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{what} must be within [0, 1] (got {value})"
        )))
    }
}

#[cfg(test)]
#[path = "analytics_config_test.rs"]
mod tests;
