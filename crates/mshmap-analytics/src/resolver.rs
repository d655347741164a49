//! Attribution of location records to known cities.

use mshmap_core::{AnalyticsConfig, LocationRecord};

use crate::geo::distance_between;

/// Resolve the city a location belongs to.
///
/// 1. A city hint matches the **first** registry city whose name contains the
///    hint or is contained in it (case-insensitive). Distance is ignored.
/// 2. Otherwise the nearest registry city by great-circle distance; on equal
///    distance the earlier registry entry is kept.
/// 3. Otherwise `config.unknown_city`.
///
/// A hint that matches nothing falls through to the coordinate step.
#[must_use]
pub fn resolve_city<'a>(location: &LocationRecord, config: &'a AnalyticsConfig) -> &'a str {
    if let Some(hint) = location.city_hint() {
        if let Some(name) = match_city_hint(hint, config) {
            return name;
        }
    }

    if let Some(coords) = location.coordinates {
        let mut nearest: Option<(&str, f64)> = None;
        for city in &config.cities {
            let dist = distance_between(coords, city.coordinates());
            match nearest {
                Some((_, best)) if dist >= best => {}
                _ if dist.is_nan() => {}
                _ => nearest = Some((city.name.as_str(), dist)),
            }
        }
        if let Some((name, _)) = nearest {
            return name;
        }
    }

    config.unknown_city.as_str()
}

fn match_city_hint<'a>(hint: &str, config: &'a AnalyticsConfig) -> Option<&'a str> {
    let hint = hint.to_lowercase();
    config
        .cities
        .iter()
        .find(|city| {
            let name = city.name.to_lowercase();
            name.contains(&hint) || hint.contains(&name)
        })
        .map(|city| city.name.as_str())
}

#[cfg(test)]
mod tests {
    use mshmap_core::{CityProfile, Coordinates};

    use super::*;

    fn location(city: Option<&str>, coords: Option<(f64, f64)>) -> LocationRecord {
        LocationRecord {
            id: "loc".to_string(),
            name: "Ort".to_string(),
            category: None,
            coordinates: coords.map(|(lat, lng)| Coordinates::new(lat, lng)),
            rating: None,
            city: city.map(str::to_string),
        }
    }

    #[test]
    fn hint_substring_matches_registry_city() {
        let config = AnalyticsConfig::default();
        assert_eq!(
            resolve_city(&location(Some("Eisleben"), None), &config),
            "Lutherstadt Eisleben"
        );
    }

    #[test]
    fn hint_containing_city_name_matches() {
        let config = AnalyticsConfig::default();
        assert_eq!(
            resolve_city(&location(Some("06526 Sangerhausen OT Wippra"), None), &config),
            "Sangerhausen"
        );
    }

    #[test]
    fn hint_match_is_case_insensitive() {
        let config = AnalyticsConfig::default();
        assert_eq!(
            resolve_city(&location(Some("HETTSTEDT"), None), &config),
            "Hettstedt"
        );
    }

    #[test]
    fn hint_wins_over_coordinates() {
        let config = AnalyticsConfig::default();
        // Coordinates sit on Allstedt, hint says Hettstedt.
        let loc = location(Some("Hettstedt"), Some((51.4, 11.3833)));
        assert_eq!(resolve_city(&loc, &config), "Hettstedt");
    }

    #[test]
    fn first_registry_match_wins_for_ambiguous_hint() {
        // "stadt" is contained in Lutherstadt Eisleben only, and the
        // district name contains "Mansfeld" but no earlier registry city.
        let config = AnalyticsConfig::default();
        assert_eq!(
            resolve_city(&location(Some("stadt"), None), &config),
            "Lutherstadt Eisleben"
        );
        assert_eq!(
            resolve_city(&location(Some("Landkreis Mansfeld-Südharz"), None), &config),
            "Mansfeld"
        );
    }

    #[test]
    fn unmatched_hint_falls_back_to_nearest_city() {
        let config = AnalyticsConfig::default();
        let loc = location(Some("Berlin"), Some((51.46, 11.31)));
        assert_eq!(resolve_city(&loc, &config), "Sangerhausen");
    }

    #[test]
    fn coordinates_resolve_to_nearest_city() {
        let config = AnalyticsConfig::default();
        assert_eq!(
            resolve_city(&location(None, Some((51.51, 10.8))), &config),
            "Nordhausen"
        );
        assert_eq!(
            resolve_city(&location(None, Some((51.64, 11.49))), &config),
            "Hettstedt"
        );
    }

    #[test]
    fn equal_distance_keeps_first_registry_city() {
        let config = AnalyticsConfig {
            cities: vec![
                CityProfile::new("West", 51.0, 10.0, 1000),
                CityProfile::new("East", 51.0, 12.0, 1000),
            ],
            ..AnalyticsConfig::default()
        };
        let loc = location(None, Some((51.0, 11.0)));
        assert_eq!(resolve_city(&loc, &config), "West");
    }

    #[test]
    fn nothing_usable_resolves_to_unknown() {
        let config = AnalyticsConfig::default();
        assert_eq!(resolve_city(&location(None, None), &config), "Unbekannt");
        assert_eq!(
            resolve_city(&location(Some("   "), None), &config),
            "Unbekannt"
        );
    }

    #[test]
    fn whitespace_hint_is_ignored() {
        let config = AnalyticsConfig::default();
        assert_eq!(resolve_city(&location(Some("  "), None), &config), "Unbekannt");
        assert_eq!(
            resolve_city(&location(Some(" "), Some((51.65, 11.5))), &config),
            "Hettstedt"
        );
    }

    #[test]
    fn empty_registry_resolves_to_unknown() {
        let config = AnalyticsConfig {
            cities: Vec::new(),
            ..AnalyticsConfig::default()
        };
        let loc = location(Some("Sangerhausen"), Some((51.4667, 11.3)));
        assert_eq!(resolve_city(&loc, &config), "Unbekannt");
    }

    #[test]
    fn resolution_is_deterministic() {
        let config = AnalyticsConfig::default();
        let loc = location(None, Some((51.55, 11.45)));
        let first = resolve_city(&loc, &config);
        for _ in 0..10 {
            assert_eq!(resolve_city(&loc, &config), first);
        }
    }
}
