use std::fmt::{self, Write};

use chrono::NaiveDate;

use crate::analytics::{by_risk_desc, kpis, risk_distribution};
use crate::error::AppError;
use crate::models::{CSV_COLUMNS, RiskLevel, ToolUsageRecord};
use crate::telemetry::EXPORTS_GENERATED;

pub const SUMMARY_TOP_N: usize = 5;

const SUMMARY_TITLE: &str = "Shadow AI Discovery & Risk Intake: Executive Summary";
const DISCLAIMER: &str = "Disclaimer: metadata-first assessment; no prompt or content inspection; privacy-aware.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    FullReport,
    HighRisk,
    Summary,
}

impl ExportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportKind::FullReport => "full_report",
            ExportKind::HighRisk => "high_risk",
            ExportKind::Summary => "summary",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportKind::FullReport | ExportKind::HighRisk => "text/csv; charset=utf-8",
            ExportKind::Summary => "text/plain; charset=utf-8",
        }
    }

    /// Download name; the date only appears here, never in the body.
    pub fn file_name(self, generated_on: NaiveDate) -> String {
        let stamp = generated_on.format("%Y%m%d");
        match self {
            ExportKind::FullReport => format!("shadow_ai_full_report_{stamp}.csv"),
            ExportKind::HighRisk => format!("shadow_ai_high_risk_{stamp}.csv"),
            ExportKind::Summary => format!("shadow_ai_exec_summary_{stamp}.txt"),
        }
    }
}

/// Every record as CSV in schema column order, header row always present.
pub fn full_report(records: &[ToolUsageRecord]) -> Result<String, AppError> {
    let report = write_csv(records.iter())?;
    EXPORTS_GENERATED.add(1, &[opentelemetry::KeyValue::new("export.kind", "full_report")]);
    Ok(report)
}

/// Same format as the full report, Critical and High records only.
pub fn high_risk_report(records: &[ToolUsageRecord]) -> Result<String, AppError> {
    let report = write_csv(records.iter().filter(|r| r.is_high_risk()))?;
    EXPORTS_GENERATED.add(1, &[opentelemetry::KeyValue::new("export.kind", "high_risk")]);
    Ok(report)
}

fn write_csv<'a>(records: impl Iterator<Item = &'a ToolUsageRecord>) -> Result<String, AppError> {
    let export_error = |e: csv::Error| AppError::Export(e.to_string());

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_COLUMNS).map_err(export_error)?;

    for record in records {
        writer
            .write_record([
                record.tool_name.clone(),
                record.domain.clone(),
                record.category.clone(),
                record.dept.clone(),
                record.user_count.to_string(),
                record.usage_count.to_string(),
                record.first_detected.format("%Y-%m-%d").to_string(),
                record.last_seen.format("%Y-%m-%d").to_string(),
                record.data_type.clone(),
                record.vendor_tier.clone(),
                record.risk_score.map(|s| s.to_string()).unwrap_or_default(),
                record
                    .risk_level
                    .map(|l| l.to_string())
                    .unwrap_or_default(),
            ])
            .map_err(export_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AppError::Export(e.to_string()))
}

/// Plain-text KPI block plus the highest-risk tools; deterministic for a given input.
pub fn executive_summary(records: &[ToolUsageRecord]) -> String {
    let mut out = String::new();
    if let Err(e) = write_summary(&mut out, records) {
        tracing::error!(error = %e, "Failed to write executive summary");
    }

    EXPORTS_GENERATED.add(1, &[opentelemetry::KeyValue::new("export.kind", "summary")]);
    out
}

fn write_summary(out: &mut String, records: &[ToolUsageRecord]) -> fmt::Result {
    let kpis = kpis(records);
    let distribution = risk_distribution(records);

    writeln!(out, "{SUMMARY_TITLE}\n")?;
    writeln!(out, "{DISCLAIMER}\n")?;
    writeln!(out, "Total tools detected: {}", kpis.total_tools)?;
    writeln!(out, "High-risk tools (High + Critical): {}", kpis.high_risk_count)?;
    writeln!(out, "Users affected (sum): {}", kpis.users_affected)?;
    writeln!(out, "Average risk score: {:.1}/100\n", kpis.average_risk_score)?;

    for level in RiskLevel::ALL {
        writeln!(out, "{level}: {}", distribution.get(level))?;
    }
    writeln!(out)?;

    writeln!(out, "Top {SUMMARY_TOP_N} highest-risk tools:")?;
    if records.is_empty() {
        writeln!(out, "No tools in the current view.")?;
    }

    let mut ranked: Vec<&ToolUsageRecord> = records.iter().collect();
    ranked.sort_by(|a, b| by_risk_desc(a, b));
    for (i, record) in ranked.into_iter().take(SUMMARY_TOP_N).enumerate() {
        let level = record
            .risk_level
            .map(RiskLevel::as_str)
            .unwrap_or("Unscored");
        writeln!(
            out,
            "{}. {} ({}): {} {}",
            i + 1,
            record.tool_name,
            record.domain,
            level,
            record.score_or_zero()
        )?;
    }

    Ok(())
}
