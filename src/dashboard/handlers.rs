use axum::{
    Json,
    extract::{Path, Query, RawQuery, State},
    http::header,
    response::{Html, IntoResponse},
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::{Value, json};

use crate::AppState;
use crate::analytics::{
    self, DashboardView, FilterOptions, HighRiskRow, ToolDetail, filter_options,
};
use crate::error::AppResult;
use crate::export::{self, ExportKind};
use crate::models::ToolUsageRecord;

use super::page::{self, PageData};
use super::query::ViewQuery;

type QueryPairs = Query<Vec<(String, String)>>;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn filtered(state: &AppState, query: &ViewQuery) -> Vec<ToolUsageRecord> {
    query.filter.apply(&state.dataset.records)
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "shadow-ai-intake",
        "version": env!("CARGO_PKG_VERSION"),
        "records": state.dataset.records.len(),
        "source": state.dataset.source,
    }))
}

pub async fn filters(State(state): State<AppState>) -> Json<FilterOptions> {
    Json(filter_options(&state.dataset.records))
}

pub async fn summary(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> AppResult<Json<DashboardView>> {
    let query = ViewQuery::from_pairs(&pairs, state.granularity)?;
    let records = filtered(&state, &query);

    Ok(Json(analytics::summarize(
        &records,
        query.granularity,
        today(),
    )))
}

#[derive(Debug, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolUsageRecord>,
    pub total: usize,
}

pub async fn list_tools(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> AppResult<Json<ToolsResponse>> {
    let query = ViewQuery::from_pairs(&pairs, state.granularity)?;
    let tools = filtered(&state, &query);
    let total = tools.len();

    Ok(Json(ToolsResponse { tools, total }))
}

pub async fn high_risk_tools(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> AppResult<Json<Vec<HighRiskRow>>> {
    let query = ViewQuery::from_pairs(&pairs, state.granularity)?;

    Ok(Json(analytics::high_risk_table(&filtered(&state, &query))))
}

pub async fn get_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<ToolDetail>> {
    Ok(Json(analytics::tool_detail(&state.dataset.records, &name)?))
}

pub async fn export_full(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> AppResult<impl IntoResponse> {
    let query = ViewQuery::from_pairs(&pairs, state.granularity)?;
    let body = export::full_report(&filtered(&state, &query))?;

    Ok(download(ExportKind::FullReport, body))
}

pub async fn export_high_risk(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> AppResult<impl IntoResponse> {
    let query = ViewQuery::from_pairs(&pairs, state.granularity)?;
    let body = export::high_risk_report(&filtered(&state, &query))?;

    Ok(download(ExportKind::HighRisk, body))
}

pub async fn export_summary(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> AppResult<impl IntoResponse> {
    let query = ViewQuery::from_pairs(&pairs, state.granularity)?;
    let body = export::executive_summary(&filtered(&state, &query));

    Ok(download(ExportKind::Summary, body))
}

fn download(kind: ExportKind, body: String) -> impl IntoResponse {
    tracing::info!(export.kind = kind.as_str(), bytes = body.len(), "Export generated");

    (
        [
            (header::CONTENT_TYPE, kind.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", kind.file_name(today())),
            ),
        ],
        body,
    )
}

pub async fn dashboard_page(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
    RawQuery(raw_query): RawQuery,
) -> AppResult<Html<String>> {
    let query = ViewQuery::from_pairs(&pairs, state.granularity)?;
    let records = filtered(&state, &query);

    // unknown tool names just hide the detail panel
    let detail = query
        .tool
        .as_deref()
        .and_then(|name| analytics::tool_detail(&records, name).ok());

    let mut tool_names: Vec<&str> = records.iter().map(|r| r.tool_name.as_str()).collect();
    tool_names.sort_unstable();
    tool_names.dedup();

    let data = PageData {
        source: &state.dataset.source,
        options: filter_options(&state.dataset.records),
        query: &query,
        view: analytics::summarize(&records, query.granularity, today()),
        high_risk: analytics::high_risk_table(&records),
        tool_names,
        detail,
        raw_query: raw_query.unwrap_or_default(),
    };

    Ok(Html(page::render(&data)))
}
