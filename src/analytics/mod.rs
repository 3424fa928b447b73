//! Aggregates over scored tool records.
//!
//! Every function takes a plain slice so the same code serves the full dataset
//! and any filtered view of it.

pub mod filter;
pub mod metrics;
pub mod tables;
pub mod timeline;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::ToolUsageRecord;

pub use filter::{FilterOptions, RecordFilter, filter_options};
pub use metrics::{
    CategoryCount, HeatmapRow, Kpis, LevelCounts, category_breakdown, department_heatmap, kpis,
    recent_discoveries, risk_distribution,
};
pub use tables::{
    HighRiskRow, ToolDetail, by_risk_desc, high_risk_table, recommended_action, tool_detail,
};
pub use timeline::{TimelineBucket, TimelineGranularity, discovery_timeline};

pub const RECENT_WINDOW_DAYS: u64 = 30;

/// Everything the dashboard charts need for one filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub kpis: Kpis,
    pub recent_discoveries: usize,
    pub risk_distribution: LevelCounts,
    pub department_heatmap: Vec<HeatmapRow>,
    pub categories: Vec<CategoryCount>,
    pub granularity: TimelineGranularity,
    pub discovery_timeline: Vec<TimelineBucket>,
}

#[tracing::instrument(
    name = "pipeline_stage aggregate",
    skip(records),
    fields(pipeline.stage = "aggregate", records.count = records.len())
)]
pub fn summarize(
    records: &[ToolUsageRecord],
    granularity: TimelineGranularity,
    today: NaiveDate,
) -> DashboardView {
    DashboardView {
        kpis: kpis(records),
        recent_discoveries: recent_discoveries(records, today, RECENT_WINDOW_DAYS),
        risk_distribution: risk_distribution(records),
        department_heatmap: department_heatmap(records),
        categories: category_breakdown(records),
        granularity,
        discovery_timeline: discovery_timeline(records, granularity),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use crate::models::{RiskLevel, ToolUsageRecord};

    /// A scored record with 10 users, first detected 2024-03-04.
    pub fn scored(name: &str, dept: &str, category: &str, score: u8) -> ToolUsageRecord {
        ToolUsageRecord {
            tool_name: name.to_string(),
            domain: format!("{}.ai", name.to_lowercase()),
            category: category.to_string(),
            dept: dept.to_string(),
            user_count: 10,
            usage_count: 100,
            first_detected: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            last_seen: NaiveDate::from_ymd_opt(2024, 4, 4).unwrap(),
            data_type: "personal".to_string(),
            vendor_tier: "Tier 2".to_string(),
            risk_score: Some(score),
            risk_level: Some(RiskLevel::from_score(score)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::scored;
    use super::*;

    #[test]
    fn test_summarize_empty_view_degrades_gracefully() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let view = summarize(&[], TimelineGranularity::Month, today);

        assert_eq!(view.kpis.total_tools, 0);
        assert_eq!(view.kpis.average_risk_score, 0.0);
        assert_eq!(view.recent_discoveries, 0);
        assert_eq!(view.risk_distribution, LevelCounts::default());
        assert!(view.department_heatmap.is_empty());
        assert!(view.categories.is_empty());
        assert!(view.discovery_timeline.is_empty());
    }

    #[test]
    fn test_summarize_recomputes_for_filtered_view() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let records = vec![
            scored("A", "IT", "Content", 90),
            scored("B", "HR", "Content", 20),
        ];
        let filter = RecordFilter {
            departments: Some(["HR".to_string()].into()),
            ..Default::default()
        };

        let full = summarize(&records, TimelineGranularity::Week, today);
        let view = summarize(&filter.apply(&records), TimelineGranularity::Week, today);

        assert_eq!(full.kpis.total_tools, 2);
        assert_eq!(view.kpis.total_tools, 1);
        assert_eq!(view.kpis.high_risk_count, 0);
        assert_eq!(view.risk_distribution.low, 1);
        assert_eq!(view.department_heatmap.len(), 1);
    }
}
