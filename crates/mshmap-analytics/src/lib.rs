//! Analytics engine for the MSH Map location set.
//!
//! Everything except [`pipeline`], [`report`] and [`store`] is a pure
//! computation over in-memory inputs and an [`mshmap_core::AnalyticsConfig`].

pub mod aggregator;
pub mod gaps;
pub mod geo;
pub mod insights;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod scorer;
pub mod store;

pub use aggregator::{build_city_stats, build_region_overview, compute_artifacts, Artifacts};
pub use gaps::{detect_category_gaps, detect_gaps, detect_playground_deserts, nearest_distance_km};
pub use geo::{distance_between, distance_km, EARTH_RADIUS_KM};
pub use insights::{generate_insights, playgrounds_per_10k, top_category};
pub use pipeline::{run_full_recalculation, RecalculationSummary};
pub use report::{build_weekly_report, ReportSummary, WeeklyReport};
pub use resolver::resolve_city;
pub use scorer::{coverage_score, family_score};
pub use store::{AnalyticsStore, MemoryStore, StoreError};
