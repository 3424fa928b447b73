mod record;

pub use record::{
    CSV_COLUMNS, REQUIRED_COLUMNS, RiskLevel, ToolUsageRecord, UnknownRiskLevel,
};
