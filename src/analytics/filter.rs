use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::AppError;
use crate::models::{RiskLevel, ToolUsageRecord};

/// Narrows a record set; `None` leaves a dimension unrestricted and the
/// dimensions combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub levels: Option<BTreeSet<RiskLevel>>,
    pub departments: Option<BTreeSet<String>>,
    pub categories: Option<BTreeSet<String>>,
}

impl RecordFilter {
    /// Builds a filter from query pairs.
    ///
    /// `level`, `dept` and `category` may repeat and may hold comma-separated
    /// values; other keys are ignored.
    pub fn from_query_pairs(pairs: &[(String, String)]) -> Result<Self, AppError> {
        let mut filter = RecordFilter::default();

        for (key, value) in pairs {
            let items = value.split(',').map(str::trim).filter(|s| !s.is_empty());
            match key.as_str() {
                "level" => {
                    let levels = filter.levels.get_or_insert_with(BTreeSet::new);
                    for item in items {
                        let level = item
                            .parse::<RiskLevel>()
                            .map_err(|e| AppError::Validation(e.to_string()))?;
                        levels.insert(level);
                    }
                }
                "dept" => filter
                    .departments
                    .get_or_insert_with(BTreeSet::new)
                    .extend(items.map(str::to_string)),
                "category" => filter
                    .categories
                    .get_or_insert_with(BTreeSet::new)
                    .extend(items.map(str::to_string)),
                _ => {}
            }
        }

        Ok(filter)
    }

    pub fn matches(&self, record: &ToolUsageRecord) -> bool {
        let level_ok = match (&self.levels, record.risk_level) {
            (None, _) => true,
            (Some(levels), Some(level)) => levels.contains(&level),
            (Some(_), None) => false,
        };

        level_ok
            && self
                .departments
                .as_ref()
                .is_none_or(|d| d.contains(&record.dept))
            && self
                .categories
                .as_ref()
                .is_none_or(|c| c.contains(&record.category))
    }

    pub fn apply(&self, records: &[ToolUsageRecord]) -> Vec<ToolUsageRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    pub fn is_unrestricted(&self) -> bool {
        self.levels.is_none() && self.departments.is_none() && self.categories.is_none()
    }
}

/// Distinct values offered by the dashboard's filter controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub levels: Vec<RiskLevel>,
    pub departments: Vec<String>,
    pub categories: Vec<String>,
}

pub fn filter_options(records: &[ToolUsageRecord]) -> FilterOptions {
    let present: BTreeSet<RiskLevel> = records.iter().filter_map(|r| r.risk_level).collect();
    let departments: BTreeSet<&str> = records.iter().map(|r| r.dept.as_str()).collect();
    let categories: BTreeSet<&str> = records.iter().map(|r| r.category.as_str()).collect();

    FilterOptions {
        levels: RiskLevel::ALL
            .into_iter()
            .filter(|l| present.contains(l))
            .collect(),
        departments: departments.into_iter().map(str::to_string).collect(),
        categories: categories.into_iter().map(str::to_string).collect(),
    }
}
