//! Domain records shared by the analytics engine, the store and the HTTP API.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::slug::slugify;

/// Category name → number of locations.
///
/// A `BTreeMap` keeps iteration (and therefore every derived artifact)
/// deterministic regardless of input order.
pub type CategoryDistribution = BTreeMap<String, u64>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A point-of-interest record as read from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub rating: Option<f64>,
    /// Free-text city name as entered at import time.
    #[serde(default)]
    pub city: Option<String>,
}

impl LocationRecord {
    /// The record's category, or `fallback` when it is missing or blank.
    #[must_use]
    pub fn category_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.category.as_deref() {
            Some(c) if !c.trim().is_empty() => c,
            _ => fallback,
        }
    }

    /// The city hint with surrounding whitespace removed, if any text remains.
    #[must_use]
    pub fn city_hint(&self) -> Option<&str> {
        self.city.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Ratings of zero are treated as "not rated".
    #[must_use]
    pub fn usable_rating(&self) -> Option<f64> {
        self.rating.filter(|r| r.is_finite() && *r != 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityStats {
    pub city_name: String,
    pub location_count: u64,
    pub category_distribution: CategoryDistribution,
    /// Always within `[0, 1]`.
    pub coverage_score: f64,
    /// Always within `[0, 1]`.
    pub family_score: f64,
    pub avg_rating: Option<f64>,
    pub population: u64,
    pub computed_at: DateTime<Utc>,
}

impl CityStats {
    /// Document key for this city.
    #[must_use]
    pub fn slug(&self) -> String {
        slugify(&self.city_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionOverview {
    pub total_locations: u64,
    pub total_cities: u64,
    pub category_totals: CategoryDistribution,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Moderate,
    Low,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Moderate => "moderate",
            Severity::Low => "low",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Severity::Critical),
            "moderate" => Ok(Severity::Moderate),
            "low" => Ok(Severity::Low),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// Kind of infrastructure gap.
///
/// Serialized as `playground_desert` or `no_<category>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum GapType {
    PlaygroundDesert,
    MissingCategory(String),
}

impl GapType {
    /// Prefix used in gap identifiers. Only the type separator becomes a
    /// hyphen; the category is kept verbatim.
    #[must_use]
    pub fn id_prefix(&self) -> String {
        match self {
            GapType::PlaygroundDesert => "playground-desert".to_string(),
            GapType::MissingCategory(category) => format!("no-{category}"),
        }
    }
}

impl std::fmt::Display for GapType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GapType::PlaygroundDesert => f.write_str("playground_desert"),
            GapType::MissingCategory(category) => write!(f, "no_{category}"),
        }
    }
}

impl FromStr for GapType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "playground_desert" {
            return Ok(GapType::PlaygroundDesert);
        }
        match s.strip_prefix("no_") {
            Some(category) if !category.is_empty() => {
                Ok(GapType::MissingCategory(category.to_string()))
            }
            _ => Err(format!("unknown gap type '{s}'")),
        }
    }
}

impl From<GapType> for String {
    fn from(value: GapType) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for GapType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    /// `<gap-type>-<city-slug>`; identical inputs always yield identical ids.
    pub id: String,
    pub gap_type: GapType,
    pub coordinates: Coordinates,
    pub severity: Severity,
    pub description: String,
    pub affected_area: String,
    pub affected_population: u64,
    pub recommendation: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Trend,
    Gap,
    Achievement,
    Recommendation,
}

impl InsightKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InsightKind::Trend => "trend",
            InsightKind::Gap => "gap",
            InsightKind::Achievement => "achievement",
            InsightKind::Recommendation => "recommendation",
        }
    }
}

impl std::fmt::Display for InsightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trend" => Ok(InsightKind::Trend),
            "gap" => Ok(InsightKind::Gap),
            "achievement" => Ok(InsightKind::Achievement),
            "recommendation" => Ok(InsightKind::Recommendation),
            other => Err(format!("unknown insight type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub metric: Option<String>,
    pub value: Option<f64>,
    pub created_at: DateTime<Utc>,
}
