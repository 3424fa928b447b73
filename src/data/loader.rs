use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::DataLoadError;
use crate::models::{REQUIRED_COLUMNS, ToolUsageRecord};

#[derive(Debug, Default)]
pub struct CsvBatch {
    pub records: Vec<ToolUsageRecord>,
    pub rejected: usize,
}

/// Lists the `*.csv` files of a directory in file-name order.
///
/// A missing directory yields an empty list; any other I/O failure is an error.
pub fn csv_files(dir: &Path) -> Result<Vec<PathBuf>, DataLoadError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(DataLoadError::Io {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| DataLoadError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

pub fn load_csv_file(path: &Path) -> Result<CsvBatch, DataLoadError> {
    let file = File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(file, path)
}

/// Parses tool records from CSV, resolving columns by header name.
///
/// `path` only labels errors; the data comes from `reader`.
pub fn read_csv<R: Read>(reader: R, path: &Path) -> Result<CsvBatch, DataLoadError> {
    let csv_error = |source| DataLoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().map_err(csv_error)?.clone();
    let columns = ColumnIndex::new(&headers, path)?;

    let mut batch = CsvBatch::default();
    for result in reader.records() {
        let row = result.map_err(csv_error)?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        match columns.parse_row(&row) {
            Ok(Some(record)) => batch.records.push(record),
            Ok(None) => {
                tracing::warn!(file = %path.display(), line, "Skipping row without tool_name");
                batch.rejected += 1;
            }
            Err(reason) => {
                return Err(DataLoadError::InvalidRow {
                    path: path.to_path_buf(),
                    line,
                    reason,
                });
            }
        }
    }

    Ok(batch)
}

struct ColumnIndex {
    positions: HashMap<&'static str, usize>,
    risk_score: Option<usize>,
}

impl ColumnIndex {
    fn new(headers: &csv::StringRecord, path: &Path) -> Result<Self, DataLoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
        };

        let mut positions = HashMap::new();
        let mut missing = Vec::new();
        for name in REQUIRED_COLUMNS {
            match find(name) {
                Some(idx) => {
                    positions.insert(name, idx);
                }
                None => missing.push(name.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(DataLoadError::MissingColumns {
                path: path.to_path_buf(),
                columns: missing,
            });
        }

        Ok(Self {
            positions,
            risk_score: find("risk_score"),
        })
    }

    fn get<'r>(&self, row: &'r csv::StringRecord, name: &str) -> &'r str {
        self.positions
            .get(name)
            .and_then(|&idx| row.get(idx))
            .unwrap_or("")
    }

    /// `Ok(None)` marks a row rejected for a blank tool name.
    fn parse_row(&self, row: &csv::StringRecord) -> Result<Option<ToolUsageRecord>, String> {
        let tool_name = self.get(row, "tool_name");
        if tool_name.is_empty() {
            return Ok(None);
        }

        let first_detected = parse_date("first_detected", self.get(row, "first_detected"))?;
        let last_seen = parse_date("last_seen", self.get(row, "last_seen"))?;
        if first_detected > last_seen {
            return Err(format!(
                "first_detected {first_detected} is after last_seen {last_seen}"
            ));
        }

        let risk_score = match self.risk_score.and_then(|idx| row.get(idx)) {
            Some(raw) => parse_score(raw)?,
            None => None,
        };

        Ok(Some(ToolUsageRecord {
            tool_name: tool_name.to_string(),
            domain: self.get(row, "domain").to_string(),
            category: self.get(row, "category").to_string(),
            dept: self.get(row, "dept").to_string(),
            user_count: parse_count("user_count", self.get(row, "user_count"))?,
            usage_count: parse_count("usage_count", self.get(row, "usage_count"))?,
            first_detected,
            last_seen,
            data_type: self.get(row, "data_type").to_string(),
            vendor_tier: self.get(row, "vendor_tier").to_string(),
            risk_score,
            risk_level: None,
        }))
    }
}

/// Largest whole number an `f64` represents exactly (2^53).
const MAX_EXACT_WHOLE_F64: f64 = 9_007_199_254_740_992.0;

fn parse_count(column: &str, raw: &str) -> Result<u64, String> {
    if let Ok(value) = raw.parse::<u64>() {
        return Ok(value);
    }

    // spreadsheet exports sometimes write whole numbers as "12.0"
    match raw.parse::<f64>() {
        Ok(value)
            if value.is_finite()
                && value.fract() == 0.0
                && (0.0..=MAX_EXACT_WHOLE_F64).contains(&value) =>
        {
            Ok(value as u64)
        }
        _ => Err(format!("{column} '{raw}' is not a whole number")),
    }
}

fn parse_date(column: &str, raw: &str) -> Result<NaiveDate, String> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }

    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .ok_or_else(|| format!("{column} '{raw}' is not a date (expected YYYY-MM-DD)"))
}

fn parse_score(raw: &str) -> Result<Option<u8>, String> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value.round().clamp(0.0, 100.0) as u8)),
        _ => Err(format!("risk_score '{raw}' is not a number")),
    }
}
