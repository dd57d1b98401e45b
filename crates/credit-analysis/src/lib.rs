//! Pure calculation and interpretation engines behind the credit dashboard.
//!
//! Nothing here performs I/O or holds state between calls; every function is
//! a transformation over a loaded [`credit_core::TabularStore`] snapshot.

pub mod catalog;
pub mod contribution;
pub mod delta;
pub mod explorer;
pub mod interpretation;
pub mod statements;
pub mod statistics;
pub mod summary;


pub use catalog::{define, display_name, MetricCatalog, MetricCategory, MetricDefinition, RatioGroup};
pub use contribution::{compute_contributions, total_contribution, AspectContribution, AspectWeights, ContributionCalculator};
pub use delta::{delta, latest_change, year_over_year, ChangeDirection, Delta, YearOverYear};
pub use explorer::{aggregated_insights, InsightRow, RatioExplorer, RatioPanel, RatioSection};
pub use interpretation::{
    classify_level, classify_stability, classify_trend, interpret, narrate, Interpretation, LevelLabel,
    StabilityLabel, TrendLabel, TrendSign,
};
pub use statements::{
    asset_structure, company_profile, key_variables, observation_years, statement_view, AssetStructure, KeyVariable,
    LineItem, StatementSection, StatementView,
};
pub use statistics::{statistics, MetricStatistics, StatTier, TrendStatisticsEngine};
pub use summary::{build_scorecard, key_summary_variables, latest_key_metrics, AspectDetail, KeyMetric, Scorecard};
