use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::models::{RiskLevel, ToolUsageRecord};

const TOP_CATEGORIES: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LevelCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl LevelCounts {
    pub fn get(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::Critical => self.critical,
            RiskLevel::High => self.high,
            RiskLevel::Medium => self.medium,
            RiskLevel::Low => self.low,
        }
    }

    fn increment(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Critical => self.critical += 1,
            RiskLevel::High => self.high += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::Low => self.low += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }

    pub fn max(&self) -> usize {
        self.critical.max(self.high).max(self.medium).max(self.low)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Kpis {
    pub total_tools: usize,
    pub high_risk_count: usize,
    pub users_affected: u64,
    pub average_risk_score: f64,
}

pub fn kpis(records: &[ToolUsageRecord]) -> Kpis {
    let scores: u64 = records.iter().map(|r| u64::from(r.score_or_zero())).sum();
    let average_risk_score = if records.is_empty() {
        0.0
    } else {
        scores as f64 / records.len() as f64
    };

    Kpis {
        total_tools: records.len(),
        high_risk_count: records.iter().filter(|r| r.is_high_risk()).count(),
        users_affected: records
            .iter()
            .map(|r| r.user_count)
            .fold(0, u64::saturating_add),
        average_risk_score,
    }
}

pub fn risk_distribution(records: &[ToolUsageRecord]) -> LevelCounts {
    let mut counts = LevelCounts::default();
    for level in records.iter().filter_map(|r| r.risk_level) {
        counts.increment(level);
    }
    counts
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatmapRow {
    pub dept: String,
    pub counts: LevelCounts,
}

/// Department × risk level counts, one row per observed department, sorted by name.
pub fn department_heatmap(records: &[ToolUsageRecord]) -> Vec<HeatmapRow> {
    let mut by_dept: BTreeMap<&str, LevelCounts> = BTreeMap::new();
    for record in records {
        let counts = by_dept.entry(record.dept.as_str()).or_default();
        if let Some(level) = record.risk_level {
            counts.increment(level);
        }
    }

    by_dept
        .into_iter()
        .map(|(dept, counts)| HeatmapRow {
            dept: dept.to_string(),
            counts,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Most common categories, largest first, ties broken by name.
pub fn category_breakdown(records: &[ToolUsageRecord]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.category.as_str()).or_default() += 1;
    }

    let mut breakdown: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();
    // stable sort keeps the name order for ties
    breakdown.sort_by(|a, b| b.count.cmp(&a.count));
    breakdown.truncate(TOP_CATEGORIES);
    breakdown
}

/// Tools first detected within the last `days` days up to and including `today`.
pub fn recent_discoveries(records: &[ToolUsageRecord], today: NaiveDate, days: u64) -> usize {
    let since = today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
    records
        .iter()
        .filter(|r| r.first_detected > since && r.first_detected <= today)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::filter::RecordFilter;
    use crate::analytics::test_support::scored;
    use std::collections::BTreeSet;

    fn sample() -> Vec<ToolUsageRecord> {
        vec![
            scored("A", "IT", "Content", 85),
            scored("B", "IT", "Assistant", 70),
            scored("C", "HR", "Content", 69),
            scored("D", "Sales", "Analytics", 49),
            scored("E", "HR", "Content", 30),
            scored("F", "Sales", "Assistant", 0),
        ]
    }

    #[test]
    fn test_kpis_empty() {
        let kpis = kpis(&[]);
        assert_eq!(kpis.total_tools, 0);
        assert_eq!(kpis.high_risk_count, 0);
        assert_eq!(kpis.users_affected, 0);
        assert_eq!(kpis.average_risk_score, 0.0);
    }

    #[test]
    fn test_kpis_single_record_average_is_its_score() {
        let records = vec![scored("A", "IT", "Content", 63)];
        assert_eq!(kpis(&records).average_risk_score, 63.0);
    }

    #[test]
    fn test_kpis_sample() {
        let records = sample();
        let kpis = kpis(&records);

        assert_eq!(kpis.total_tools, 6);
        assert_eq!(kpis.high_risk_count, 3);
        assert_eq!(kpis.users_affected, 60);
        assert!((kpis.average_risk_score - 303.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_kpis_users_affected_saturates() {
        let mut a = scored("A", "IT", "Content", 40);
        let mut b = scored("B", "HR", "Content", 60);
        a.user_count = u64::MAX / 2 + 1;
        b.user_count = u64::MAX / 2 + 1;

        let kpis = kpis(&[a, b]);
        assert_eq!(kpis.users_affected, u64::MAX);
        assert_eq!(kpis.total_tools, 2);
        assert_eq!(kpis.average_risk_score, 50.0);
    }

    #[test]
    fn test_distribution_includes_all_levels_and_sums_to_total() {
        let records = sample();
        let distribution = risk_distribution(&records);

        assert_eq!(
            distribution,
            LevelCounts {
                critical: 2,
                high: 1,
                medium: 2,
                low: 1,
            }
        );
        assert_eq!(distribution.total(), kpis(&records).total_tools);
        assert_eq!(
            kpis(&records).high_risk_count,
            distribution.critical + distribution.high
        );

        assert_eq!(risk_distribution(&[]), LevelCounts::default());
    }

    #[test]
    fn test_distribution_after_level_filter_isolates_level() {
        let records = sample();
        for level in RiskLevel::ALL {
            let filter = RecordFilter {
                levels: Some(BTreeSet::from([level])),
                ..Default::default()
            };
            let filtered = filter.apply(&records);
            let distribution = risk_distribution(&filtered);

            for other in RiskLevel::ALL {
                if other == level {
                    assert_eq!(distribution.get(other), filtered.len());
                } else {
                    assert_eq!(distribution.get(other), 0);
                }
            }
            assert_eq!(kpis(&filtered).total_tools, distribution.total());
        }
    }

    #[test]
    fn test_department_heatmap() {
        let heatmap = department_heatmap(&sample());

        let depts: Vec<_> = heatmap.iter().map(|r| r.dept.as_str()).collect();
        assert_eq!(depts, vec!["HR", "IT", "Sales"]);
        assert_eq!(heatmap[1].counts.critical, 2);
        assert_eq!(heatmap[0].counts.high, 1);
        assert_eq!(heatmap[0].counts.medium, 1);
        assert_eq!(heatmap[2].counts.low, 1);
        assert_eq!(
            heatmap.iter().map(|r| r.counts.total()).sum::<usize>(),
            sample().len()
        );
    }

    #[test]
    fn test_category_breakdown_orders_by_count_then_name() {
        let breakdown = category_breakdown(&sample());
        let ordered: Vec<_> = breakdown
            .iter()
            .map(|c| (c.category.as_str(), c.count))
            .collect();
        assert_eq!(
            ordered,
            vec![("Content", 3), ("Assistant", 2), ("Analytics", 1)]
        );
    }

    #[test]
    fn test_recent_discoveries_window() {
        let mut records = sample();
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        records[0].first_detected = today;
        records[1].first_detected = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        records[2].first_detected = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();

        assert_eq!(recent_discoveries(&records, today, 30), 2);
    }
}
