pub mod rubric;

use crate::models::{RiskLevel, ToolUsageRecord};

/// Whether governance controls are likely to mitigate the tool's risk.
///
/// Derived on demand from the vendor tier and data type; never stored on the record.
pub fn controls_present(vendor_tier: &str, data_type: &str) -> bool {
    rubric::is_enterprise_vendor(vendor_tier) && !rubric::is_regulated(data_type)
}

/// Rubric score for a record, ignoring any score it already carries.
pub fn rubric_score(record: &ToolUsageRecord) -> u8 {
    let controls = if controls_present(&record.vendor_tier, &record.data_type) {
        -rubric::CONTROLS_ADJUSTMENT
    } else {
        rubric::CONTROLS_ADJUSTMENT
    };

    let raw = rubric::data_type_points(&record.data_type)
        + rubric::vendor_tier_points(&record.vendor_tier)
        + rubric::usage_points(record.usage_count)
        + controls;

    raw.round().clamp(0.0, 100.0) as u8
}

/// Fills in `risk_score` when absent and always re-derives `risk_level` from it.
pub fn score(record: ToolUsageRecord) -> ToolUsageRecord {
    let risk_score = match record.risk_score {
        Some(existing) => existing.min(100),
        None => rubric_score(&record),
    };

    ToolUsageRecord {
        risk_score: Some(risk_score),
        risk_level: Some(RiskLevel::from_score(risk_score)),
        ..record
    }
}

#[tracing::instrument(
    name = "pipeline_stage score",
    skip(records),
    fields(pipeline.stage = "score", records.count = records.len(), records.computed)
)]
pub fn score_all(records: Vec<ToolUsageRecord>) -> Vec<ToolUsageRecord> {
    let computed = records.iter().filter(|r| r.risk_score.is_none()).count();
    tracing::Span::current().record("records.computed", computed);

    records.into_iter().map(score).collect()
}
