use std::cmp::Ordering;

use serde::Serialize;

use crate::error::AppError;
use crate::models::{RiskLevel, ToolUsageRecord};
use crate::scoring::controls_present;

pub fn recommended_action(record: &ToolUsageRecord) -> &'static str {
    let score = record.score_or_zero();
    match record.risk_level {
        _ if score >= 80 => "Block immediately",
        Some(RiskLevel::Critical) => "Require approval",
        Some(RiskLevel::High) => "Security review",
        Some(RiskLevel::Medium) => "Monitor, add controls, update policy mapping",
        Some(RiskLevel::Low) | None => "Document and allow with governance",
    }
}

/// Highest score first, then tool name.
pub fn by_risk_desc(a: &ToolUsageRecord, b: &ToolUsageRecord) -> Ordering {
    b.score_or_zero()
        .cmp(&a.score_or_zero())
        .then_with(|| a.tool_name.cmp(&b.tool_name))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighRiskRow {
    pub tool_name: String,
    pub domain: String,
    pub category: String,
    pub dept: String,
    pub user_count: u64,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub data_type: String,
    pub action: &'static str,
}

pub fn high_risk_table(records: &[ToolUsageRecord]) -> Vec<HighRiskRow> {
    let mut high: Vec<&ToolUsageRecord> = records.iter().filter(|r| r.is_high_risk()).collect();
    high.sort_by(|a, b| by_risk_desc(a, b));

    high.into_iter()
        .filter_map(|r| {
            Some(HighRiskRow {
                tool_name: r.tool_name.clone(),
                domain: r.domain.clone(),
                category: r.category.clone(),
                dept: r.dept.clone(),
                user_count: r.user_count,
                risk_score: r.risk_score?,
                risk_level: r.risk_level?,
                data_type: r.data_type.clone(),
                action: recommended_action(r),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDetail {
    #[serde(flatten)]
    pub record: ToolUsageRecord,
    pub controls_present: bool,
    pub recommended_action: &'static str,
}

pub fn tool_detail(records: &[ToolUsageRecord], tool_name: &str) -> Result<ToolDetail, AppError> {
    let record = records
        .iter()
        .find(|r| r.tool_name == tool_name)
        .ok_or_else(|| AppError::NotFound(format!("Tool {tool_name} not found")))?;

    Ok(ToolDetail {
        record: record.clone(),
        controls_present: controls_present(&record.vendor_tier, &record.data_type),
        recommended_action: recommended_action(record),
    })
}
