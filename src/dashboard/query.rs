use crate::analytics::{RecordFilter, TimelineGranularity};
use crate::error::AppError;

/// Query parameters shared by the dashboard page and the JSON endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewQuery {
    pub filter: RecordFilter,
    pub granularity: TimelineGranularity,
    pub tool: Option<String>,
}

impl ViewQuery {
    pub fn from_pairs(
        pairs: &[(String, String)],
        default_granularity: TimelineGranularity,
    ) -> Result<Self, AppError> {
        let filter = RecordFilter::from_query_pairs(pairs)?;

        let mut granularity = default_granularity;
        let mut tool = None;
        for (key, value) in pairs {
            match key.as_str() {
                "granularity" if !value.trim().is_empty() => {
                    granularity = value
                        .parse::<TimelineGranularity>()
                        .map_err(|e| AppError::Validation(e.to_string()))?;
                }
                "tool" if !value.trim().is_empty() => tool = Some(value.trim().to_string()),
                _ => {}
            }
        }

        Ok(Self {
            filter,
            granularity,
            tool,
        })
    }
}
