use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;

use crate::analytics::TimelineGranularity;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub data_dir: PathBuf,
    pub demo_seed: u64,
    pub demo_rows: usize,
    pub anchor_dates: bool,
    pub timeline_granularity: TimelineGranularity,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; unset variables take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let text = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let demo_rows: usize = parse_var(&lookup, "DEMO_ROWS", "40")?;
        anyhow::ensure!(demo_rows > 0, "DEMO_ROWS must be at least 1");

        Ok(Self {
            port: parse_var(&lookup, "PORT", "8080")?,
            environment: text("ENVIRONMENT", "development"),
            data_dir: PathBuf::from(text("DATA_DIR", "data")),
            demo_seed: parse_var(&lookup, "DEMO_SEED", "42")?,
            demo_rows,
            anchor_dates: parse_var(&lookup, "ANCHOR_DATES", "false")?,
            timeline_granularity: parse_var(&lookup, "TIMELINE_GRANULARITY", "week")?,
            otel_service_name: text("OTEL_SERVICE_NAME", "shadow-ai-intake"),
            otel_exporter_endpoint: text("OTEL_EXPORTER_OTLP_ENDPOINT", "http://localhost:4317"),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: &str,
) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = lookup(name).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse()
        .with_context(|| format!("{name} has invalid value '{raw}'"))
}
