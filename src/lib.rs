pub mod analytics;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod export;
pub mod models;
pub mod scoring;
pub mod telemetry;

use std::sync::Arc;

pub use config::Config;

use analytics::TimelineGranularity;
use data::Dataset;

/// Shared by every handler; the dataset is loaded once at startup and never mutated.
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub granularity: TimelineGranularity,
}
