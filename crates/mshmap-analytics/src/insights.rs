//! Rule-based findings derived from the region overview.
//!
//! Rules run in a fixed order and every identifier is a function of the rule
//! (and category, for the low-count rule), so re-running overwrites.

use chrono::{DateTime, Utc};

use mshmap_core::{AnalyticsConfig, Insight, InsightKind, RegionOverview};

/// Category with the highest count, ignoring the `fallback` bucket. Ties go
/// to the lexicographically first category name.
#[must_use]
pub fn top_category<'a>(overview: &'a RegionOverview, fallback: &str) -> Option<(&'a str, u64)> {
    let mut best: Option<(&str, u64)> = None;
    for (category, &count) in &overview.category_totals {
        if category == fallback {
            continue;
        }
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((category.as_str(), count));
        }
    }
    best
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn playgrounds_per_10k(overview: &RegionOverview, config: &AnalyticsConfig) -> f64 {
    let count = overview
        .category_totals
        .get(&config.playground_desert.category)
        .copied()
        .unwrap_or(0);
    count as f64 / (config.insights.assumed_population as f64 / 10_000.0)
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn generate_insights(
    overview: &RegionOverview,
    config: &AnalyticsConfig,
    now: DateTime<Utc>,
) -> Vec<Insight> {
    let rules = &config.insights;
    let mut insights = Vec::new();

    insights.push(Insight {
        id: "total-locations".to_string(),
        kind: InsightKind::Achievement,
        title: format!("{} Orte erfasst", overview.total_locations),
        description:
            "Die MSH Map wächst weiter und bietet immer mehr Informationen für die Region."
                .to_string(),
        metric: Some("locations".to_string()),
        value: Some(overview.total_locations as f64),
        created_at: now,
    });

    if let Some((category, count)) = top_category(overview, &config.fallback_category) {
        insights.push(Insight {
            id: "top-category".to_string(),
            kind: InsightKind::Trend,
            title: format!("{category} ist die stärkste Kategorie"),
            description: format!("Mit {count} Einträgen ist \"{category}\" am besten abgedeckt."),
            metric: Some(category.to_string()),
            value: Some(count as f64),
            created_at: now,
        });
    }

    let per_10k = playgrounds_per_10k(overview, config);
    if per_10k < rules.playground_shortage_per_10k {
        insights.push(Insight {
            id: "playground-shortage".to_string(),
            kind: InsightKind::Gap,
            title: "Spielplatz-Abdeckung verbesserungswürdig".to_string(),
            description: format!(
                "Nur {per_10k:.1} Spielplätze pro 10.000 Einwohner (Empfehlung: ≥{})",
                rules.recommended_playgrounds_per_10k
            ),
            metric: Some("playgrounds_per_10k".to_string()),
            value: Some(per_10k),
            created_at: now,
        });
    } else {
        insights.push(Insight {
            id: "playground-good".to_string(),
            kind: InsightKind::Achievement,
            title: "Gute Spielplatz-Versorgung".to_string(),
            description: format!("{per_10k:.1} Spielplätze pro 10.000 Einwohner"),
            metric: Some("playgrounds_per_10k".to_string()),
            value: Some(per_10k),
            created_at: now,
        });
    }

    for (category, &count) in &overview.category_totals {
        if count >= rules.low_count_threshold || *category == config.fallback_category {
            continue;
        }
        insights.push(Insight {
            id: format!("low-{category}"),
            kind: InsightKind::Recommendation,
            title: format!("Mehr {category}-Daten sammeln"),
            description: format!(
                "Die Kategorie \"{category}\" hat nur {count} Einträge. Hier fehlen noch Informationen."
            ),
            metric: Some(category.clone()),
            value: Some(count as f64),
            created_at: now,
        });
    }

    insights
}

#[cfg(test)]
mod tests {
    use mshmap_core::CategoryDistribution;

    use super::*;

    fn overview(entries: &[(&str, u64)]) -> RegionOverview {
        let category_totals: CategoryDistribution = entries
            .iter()
            .map(|(c, n)| ((*c).to_string(), *n))
            .collect();
        RegionOverview {
            total_locations: category_totals.values().sum(),
            total_cities: 1,
            category_totals,
            computed_at: Utc::now(),
        }
    }

    fn find<'a>(insights: &'a [Insight], id: &str) -> Option<&'a Insight> {
        insights.iter().find(|i| i.id == id)
    }

    #[test]
    fn empty_overview_yields_total_and_playground_only() {
        let insights = generate_insights(&overview(&[]), &AnalyticsConfig::default(), Utc::now());
        let ids: Vec<&str> = insights.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["total-locations", "playground-shortage"]);
        assert_eq!(insights[0].title, "0 Orte erfasst");
    }

    #[test]
    fn restaurant_leads_top_category() {
        let o = overview(&[("restaurant", 40), ("other", 60)]);
        let insights = generate_insights(&o, &AnalyticsConfig::default(), Utc::now());
        assert_eq!(insights[0].value, Some(100.0));
        let top = find(&insights, "top-category").expect("top category");
        assert_eq!(top.kind, InsightKind::Trend);
        assert_eq!(top.metric.as_deref(), Some("restaurant"));
        assert_eq!(top.value, Some(40.0));
        assert_eq!(top.title, "restaurant ist die stärkste Kategorie");
        assert_eq!(
            top.description,
            "Mit 40 Einträgen ist \"restaurant\" am besten abgedeckt."
        );
    }

    #[test]
    fn top_category_tie_goes_to_first_name() {
        let o = overview(&[("zoo", 7), ("museum", 7), ("pool", 3)]);
        assert_eq!(top_category(&o, "other"), Some(("museum", 7)));
    }

    #[test]
    fn only_fallback_category_has_no_top() {
        let o = overview(&[("other", 12)]);
        assert_eq!(top_category(&o, "other"), None);
        let insights = generate_insights(&o, &AnalyticsConfig::default(), Utc::now());
        assert!(find(&insights, "top-category").is_none());
    }

    #[test]
    fn twenty_playgrounds_is_a_shortage() {
        let o = overview(&[("playground", 20)]);
        let insights = generate_insights(&o, &AnalyticsConfig::default(), Utc::now());
        let shortage = find(&insights, "playground-shortage").expect("shortage");
        assert_eq!(shortage.kind, InsightKind::Gap);
        assert!((shortage.value.unwrap_or_default() - 20.0 / 12.0).abs() < 1e-12);
        assert_eq!(
            shortage.description,
            "Nur 1.7 Spielplätze pro 10.000 Einwohner (Empfehlung: ≥3)"
        );
        assert!(find(&insights, "playground-good").is_none());
    }

    #[test]
    fn enough_playgrounds_is_an_achievement() {
        let o = overview(&[("playground", 24)]);
        let insights = generate_insights(&o, &AnalyticsConfig::default(), Utc::now());
        let good = find(&insights, "playground-good").expect("good");
        assert_eq!(good.kind, InsightKind::Achievement);
        assert_eq!(good.description, "2.0 Spielplätze pro 10.000 Einwohner");
        assert!(find(&insights, "playground-shortage").is_none());
    }

    #[test]
    fn low_museum_count_recommends_collecting_data() {
        let o = overview(&[("museum", 3), ("other", 1), ("restaurant", 12)]);
        let insights = generate_insights(&o, &AnalyticsConfig::default(), Utc::now());
        let low = find(&insights, "low-museum").expect("low museum");
        assert_eq!(low.kind, InsightKind::Recommendation);
        assert_eq!(low.title, "Mehr museum-Daten sammeln");
        assert_eq!(low.value, Some(3.0));
        assert!(find(&insights, "low-other").is_none());
        assert!(find(&insights, "low-restaurant").is_none());
    }

    #[test]
    fn insight_ids_are_unique() {
        let o = overview(&[("museum", 1), ("pool", 2), ("zoo", 4), ("playground", 1)]);
        let insights = generate_insights(&o, &AnalyticsConfig::default(), Utc::now());
        let mut ids: Vec<&str> = insights.iter().map(|i| i.id.as_str()).collect();
        let len = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), len);
        assert_eq!(len, 3 + 4);
    }
}
