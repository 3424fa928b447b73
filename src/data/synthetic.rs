use chrono::{Days, NaiveDate};

use crate::models::ToolUsageRecord;

const CATEGORIES: [&str; 4] = ["Collaboration", "Content", "Analytics", "Assistant"];
const DEPARTMENTS: [&str; 6] = ["HR", "Sales", "IT", "Marketing", "Finance", "Legal"];

// weights in percent
const DATA_TYPES: [(&str, u32); 4] = [
    ("sensitive", 15),
    ("personal", 35),
    ("metadata", 35),
    ("other", 15),
];
const VENDOR_TIERS: [(&str, u32); 4] = [
    ("Tier 1", 25),
    ("Tier 2", 35),
    ("Tier 3", 25),
    ("Unknown", 15),
];

const HISTORY_DAYS: u64 = 365;

#[derive(Debug, Clone, Copy)]
pub struct SyntheticOptions {
    pub seed: u64,
    pub rows: usize,
    /// Latest day a tool can be first detected on is `end_date - 1`.
    pub end_date: NaiveDate,
}

/// Builds a demo dataset; identical options always produce identical rows.
pub fn generate(options: &SyntheticOptions) -> Vec<ToolUsageRecord> {
    let mut rng = fastrand::Rng::with_seed(options.seed);
    let start = options
        .end_date
        .checked_sub_days(Days::new(HISTORY_DAYS))
        .unwrap_or(options.end_date);

    (1..=options.rows)
        .map(|i| {
            let tool_name = format!("Tool {i}");
            let domain = format!("{}.ai", tool_name.to_lowercase().replace(' ', ""));
            let first_detected = start + Days::new(rng.u64(0..HISTORY_DAYS));
            let last_seen = first_detected + Days::new(rng.u64(1..90));

            ToolUsageRecord {
                tool_name,
                domain,
                category: CATEGORIES[rng.usize(..CATEGORIES.len())].to_string(),
                dept: DEPARTMENTS[rng.usize(..DEPARTMENTS.len())].to_string(),
                user_count: rng.u64(5..500),
                usage_count: rng.u64(1..5000),
                first_detected,
                last_seen,
                data_type: weighted(&mut rng, &DATA_TYPES).to_string(),
                vendor_tier: weighted(&mut rng, &VENDOR_TIERS).to_string(),
                risk_score: None,
                risk_level: None,
            }
        })
        .collect()
}

fn weighted<'a>(rng: &mut fastrand::Rng, choices: &[(&'a str, u32)]) -> &'a str {
    let total: u32 = choices.iter().map(|(_, w)| w).sum();
    let mut pick = rng.u32(..total);
    for (value, weight) in choices {
        if pick < *weight {
            return value;
        }
        pick -= weight;
    }
    choices[choices.len() - 1].0
}
