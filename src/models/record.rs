use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Column order shared by CSV input and every CSV export.
pub const CSV_COLUMNS: [&str; 12] = [
    "tool_name",
    "domain",
    "category",
    "dept",
    "user_count",
    "usage_count",
    "first_detected",
    "last_seen",
    "data_type",
    "vendor_tier",
    "risk_score",
    "risk_level",
];

/// Columns a data file must carry; `risk_score` and `risk_level` are optional.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "tool_name",
    "domain",
    "category",
    "dept",
    "user_count",
    "usage_count",
    "first_detected",
    "last_seen",
    "data_type",
    "vendor_tier",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Display order used by charts, tables and summaries.
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Critical,
        RiskLevel::High,
        RiskLevel::Medium,
        RiskLevel::Low,
    ];

    /// Buckets a score; values above 100 count as 100.
    pub fn from_score(score: u8) -> Self {
        match score.min(100) {
            70..=100 => RiskLevel::Critical,
            50..=69 => RiskLevel::High,
            30..=49 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    pub fn is_high_risk(self) -> bool {
        matches!(self, RiskLevel::Critical | RiskLevel::High)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown risk level '{0}', expected one of Critical, High, Medium, Low")]
pub struct UnknownRiskLevel(pub String);

impl FromStr for RiskLevel {
    type Err = UnknownRiskLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            _ => Err(UnknownRiskLevel(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolUsageRecord {
    pub tool_name: String,
    pub domain: String,
    pub category: String,
    pub dept: String,
    pub user_count: u64,
    pub usage_count: u64,
    pub first_detected: NaiveDate,
    pub last_seen: NaiveDate,
    pub data_type: String,
    pub vendor_tier: String,
    pub risk_score: Option<u8>,
    pub risk_level: Option<RiskLevel>,
}

impl ToolUsageRecord {
    /// Score used for ranking; unscored records rank last.
    pub fn score_or_zero(&self) -> u8 {
        self.risk_score.unwrap_or(0)
    }

    pub fn is_high_risk(&self) -> bool {
        self.risk_level.is_some_and(RiskLevel::is_high_risk)
    }
}
