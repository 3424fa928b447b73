pub mod loader;
pub mod synthetic;

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::DataLoadError;
use crate::models::ToolUsageRecord;
use crate::scoring;
use crate::telemetry::{RECORDS_LOADED, ROWS_REJECTED};

pub use synthetic::SyntheticOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSource {
    Csv { files: Vec<PathBuf> },
    Synthetic { seed: u64, rows: usize },
}

impl DataSource {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, DataSource::Synthetic { .. })
    }
}

/// Scored records for one dashboard session.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<ToolUsageRecord>,
    pub source: DataSource,
}

impl Dataset {
    /// Scores raw records; every record of a `Dataset` carries a score and level.
    pub fn new(records: Vec<ToolUsageRecord>, source: DataSource) -> Self {
        Self {
            records: scoring::score_all(records),
            source,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DataProvider {
    pub data_dir: PathBuf,
    pub seed: u64,
    pub rows: usize,
    pub anchor_dates: bool,
}

impl DataProvider {
    /// Reads every CSV in the data directory, or synthesizes demo rows when there are none.
    ///
    /// A directory with CSV files that cannot be used is an error, never a fallback.
    #[tracing::instrument(
        name = "pipeline_stage load",
        skip(self),
        fields(
            pipeline.stage = "load",
            data.dir = %self.data_dir.display(),
            data.synthetic,
            data.records,
            data.rejected,
        )
    )]
    pub fn load(&self, today: NaiveDate) -> Result<Dataset, DataLoadError> {
        let files = loader::csv_files(&self.data_dir)?;

        let (mut records, rejected, source) = if files.is_empty() {
            tracing::info!(
                seed = self.seed,
                rows = self.rows,
                "No data files found, generating demo dataset"
            );
            let records = synthetic::generate(&SyntheticOptions {
                seed: self.seed,
                rows: self.rows,
                end_date: today,
            });
            let source = DataSource::Synthetic {
                seed: self.seed,
                rows: self.rows,
            };
            (records, 0, source)
        } else {
            let mut records = Vec::new();
            let mut rejected = 0;
            for path in &files {
                let batch = loader::load_csv_file(path)?;
                tracing::info!(
                    file = %path.display(),
                    records = batch.records.len(),
                    rejected = batch.rejected,
                    "Loaded data file"
                );
                records.extend(batch.records);
                rejected += batch.rejected;
            }
            (records, rejected, DataSource::Csv { files })
        };

        if self.anchor_dates {
            anchor_to(&mut records, today);
        }

        let span = tracing::Span::current();
        span.record("data.synthetic", source.is_synthetic());
        span.record("data.records", records.len());
        span.record("data.rejected", rejected);

        RECORDS_LOADED.add(records.len() as u64, &[]);
        ROWS_REJECTED.add(rejected as u64, &[]);

        Ok(Dataset::new(records, source))
    }
}

/// Shifts every date by one offset so the latest `last_seen` lands on `today`.
pub fn anchor_to(records: &mut [ToolUsageRecord], today: NaiveDate) {
    let Some(latest) = records.iter().map(|r| r.last_seen).max() else {
        return;
    };

    let offset = today.signed_duration_since(latest);
    for record in records.iter_mut() {
        record.first_detected += offset;
        record.last_seen += offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export;
    use crate::models::RiskLevel;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    fn provider(dir: PathBuf) -> DataProvider {
        DataProvider {
            data_dir: dir,
            seed: 42,
            rows: 40,
            anchor_dates: false,
        }
    }

    #[test]
    fn test_empty_directory_falls_back_to_synthetic() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = provider(dir.path().to_path_buf()).load(today()).unwrap();

        assert_eq!(dataset.source, DataSource::Synthetic { seed: 42, rows: 40 });
        assert_eq!(dataset.records.len(), 40);
        for record in &dataset.records {
            assert!(!record.tool_name.is_empty());
            assert!(record.first_detected <= record.last_seen);
            let score = record.risk_score.unwrap();
            assert!(score <= 100);
            assert_eq!(record.risk_level, Some(RiskLevel::from_score(score)));
        }
    }

    #[test]
    fn test_missing_directory_falls_back_to_synthetic() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = provider(dir.path().join("nope")).load(today()).unwrap();
        assert!(dataset.source.is_synthetic());
    }

    #[test]
    fn test_invalid_file_is_an_error_not_a_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tools.csv"), "name,owner\nX,Y\n").unwrap();

        let err = provider(dir.path().to_path_buf()).load(today()).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumns { .. }));
    }

    #[test]
    fn test_scores_missing_values_from_csv() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tools.csv"),
            "tool_name,domain,category,dept,user_count,usage_count,first_detected,last_seen,data_type,vendor_tier\n\
             ChatGPT,chat.openai.com,Assistant,Sales,12,500,2024-03-01,2024-04-01,confidential,unverified\n",
        )
        .unwrap();

        let dataset = provider(dir.path().to_path_buf()).load(today()).unwrap();
        let record = &dataset.records[0];
        let score = record.risk_score.unwrap();
        assert!(score >= 50);
        assert_eq!(record.risk_level, Some(RiskLevel::from_score(score)));
    }

    #[test]
    fn test_files_are_concatenated_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        let header = "tool_name,domain,category,dept,user_count,usage_count,first_detected,last_seen,data_type,vendor_tier\n";
        std::fs::write(
            dir.path().join("b.csv"),
            format!("{header}B,b.ai,Content,IT,1,1,2024-01-01,2024-01-02,other,Unknown\n"),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("a.csv"),
            format!("{header}A,a.ai,Content,IT,1,1,2024-01-01,2024-01-02,other,Unknown\n"),
        )
        .unwrap();

        let dataset = provider(dir.path().to_path_buf()).load(today()).unwrap();
        let names: Vec<_> = dataset.records.iter().map(|r| r.tool_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        match dataset.source {
            DataSource::Csv { files } => assert_eq!(files.len(), 2),
            other => panic!("unexpected source: {other:?}"),
        }
    }

    #[test]
    fn test_full_report_round_trip() {
        let original = Dataset::new(
            synthetic::generate(&SyntheticOptions {
                seed: 9,
                rows: 25,
                end_date: today(),
            }),
            DataSource::Synthetic { seed: 9, rows: 25 },
        );

        let dir = tempfile::tempdir().unwrap();
        let report = export::full_report(&original.records).unwrap();
        std::fs::write(dir.path().join("report.csv"), report).unwrap();

        let reloaded = provider(dir.path().to_path_buf()).load(today()).unwrap();
        assert_eq!(reloaded.records, original.records);
    }

    #[test]
    fn test_anchor_to_moves_latest_last_seen_to_today() {
        let mut records = synthetic::generate(&SyntheticOptions {
            seed: 42,
            rows: 10,
            end_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        });
        let spans: Vec<_> = records
            .iter()
            .map(|r| r.last_seen - r.first_detected)
            .collect();

        anchor_to(&mut records, today());

        assert_eq!(records.iter().map(|r| r.last_seen).max(), Some(today()));
        for (record, span) in records.iter().zip(spans) {
            assert_eq!(record.last_seen - record.first_detected, span);
        }
    }

    #[test]
    fn test_anchor_to_empty_is_noop() {
        let mut records: Vec<ToolUsageRecord> = Vec::new();
        anchor_to(&mut records, today());
        assert!(records.is_empty());
    }
}
