use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ToolUsageRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineGranularity {
    #[default]
    Week,
    Month,
}

impl TimelineGranularity {
    /// First day of the bucket containing `date`; weeks start on Monday.
    pub fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            TimelineGranularity::Week => date.week(Weekday::Mon).first_day(),
            TimelineGranularity::Month => date.with_day(1).unwrap_or(date),
        }
    }

    fn next(self, bucket: NaiveDate) -> Option<NaiveDate> {
        match self {
            TimelineGranularity::Week => bucket.checked_add_days(Days::new(7)),
            TimelineGranularity::Month => bucket.checked_add_months(Months::new(1)),
        }
    }
}

impl fmt::Display for TimelineGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelineGranularity::Week => f.write_str("week"),
            TimelineGranularity::Month => f.write_str("month"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown timeline granularity '{0}', expected week or month")]
pub struct UnknownGranularity(pub String);

impl FromStr for TimelineGranularity {
    type Err = UnknownGranularity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" | "weekly" | "w" => Ok(TimelineGranularity::Week),
            "month" | "monthly" | "m" => Ok(TimelineGranularity::Month),
            _ => Err(UnknownGranularity(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineBucket {
    pub start: NaiveDate,
    pub count: usize,
}

/// Discovery counts by `first_detected`, oldest first, with empty buckets
/// filled in between the first and last observed bucket.
pub fn discovery_timeline(
    records: &[ToolUsageRecord],
    granularity: TimelineGranularity,
) -> Vec<TimelineBucket> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for record in records {
        *counts
            .entry(granularity.bucket_start(record.first_detected))
            .or_default() += 1;
    }

    let (Some(&first), Some(&last)) = (counts.keys().next(), counts.keys().next_back()) else {
        return Vec::new();
    };

    let mut timeline = Vec::new();
    let mut bucket = Some(first);
    while let Some(start) = bucket.filter(|b| *b <= last) {
        timeline.push(TimelineBucket {
            start,
            count: counts.get(&start).copied().unwrap_or(0),
        });
        bucket = granularity.next(start);
    }

    timeline
}
