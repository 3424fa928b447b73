pub mod handlers;
mod page;
pub mod query;

use axum::{Router, routing::get};

use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard_page))
        .route("/api/health", get(handlers::health))
        .route("/api/filters", get(handlers::filters))
        .route("/api/summary", get(handlers::summary))
        .route("/api/tools", get(handlers::list_tools))
        .route("/api/tools/high-risk", get(handlers::high_risk_tools))
        .route("/api/tools/{name}", get(handlers::get_tool))
        .route("/api/exports/full.csv", get(handlers::export_full))
        .route("/api/exports/high-risk.csv", get(handlers::export_high_risk))
        .route("/api/exports/summary.txt", get(handlers::export_summary))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::analytics::TimelineGranularity;
    use crate::analytics::test_support::scored;
    use crate::data::{DataSource, Dataset};

    fn app() -> Router {
        let records = vec![
            scored("ChatGPT", "Marketing", "Chatbot", 88),
            scored("Copilot", "Engineering", "Code Assistant", 55),
            scored("Grammarly", "Marketing", "Writing", 20),
        ];
        let dataset = Dataset::new(
            records,
            DataSource::Csv {
                files: vec!["data/tools.csv".into()],
            },
        );

        create_router(AppState {
            dataset: Arc::new(dataset),
            granularity: TimelineGranularity::Week,
        })
    }

    async fn get(uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, _, body) = get("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["records"], 3);
        assert_eq!(json["source"]["kind"], "csv");
    }

    #[tokio::test]
    async fn test_summary_with_level_filter() {
        let (status, _, body) = get("/api/summary?level=Critical,High").await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["kpis"]["total_tools"], 2);
        assert_eq!(json["kpis"]["high_risk_count"], 2);
        assert_eq!(json["risk_distribution"]["Low"], 0);
        assert_eq!(json["granularity"], "week");
    }

    #[tokio::test]
    async fn test_unknown_level_is_bad_request() {
        let (status, _, body) = get("/api/summary?level=Severe").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], 400);
    }

    #[tokio::test]
    async fn test_tools_filtered_by_dept() {
        let (status, _, body) = get("/api/tools?dept=Marketing").await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["total"], 2);
    }

    #[tokio::test]
    async fn test_empty_dept_selection_shows_no_tools() {
        let (status, _, body) = get("/?dept=").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Total AI tools<b>0</b>"));
        assert!(body.contains("No Critical or High tools in the current view."));
        assert!(body.contains("value=\"Marketing\">"));
        assert!(!body.contains("value=\"Marketing\" checked"));

        let (_, _, body) = get("/api/tools?dept=").await;
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["total"], 0);
    }

    #[tokio::test]
    async fn test_high_risk_table_order() {
        let (_, _, body) = get("/api/tools/high-risk").await;
        let json: Value = serde_json::from_str(&body).unwrap();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["tool_name"], "ChatGPT");
        assert_eq!(rows[0]["action"], "Block immediately");
    }

    #[tokio::test]
    async fn test_tool_detail_and_not_found() {
        let (status, _, body) = get("/api/tools/Copilot").await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["tool_name"], "Copilot");
        assert_eq!(json["risk_level"], "High");

        let (status, _, _) = get("/api/tools/Nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_full_csv_export() {
        let (status, headers, body) = get("/api/exports/full.csv?category=Writing").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/csv; charset=utf-8");
        let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"shadow_ai_full_report_"));

        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("tool_name,"));
        assert!(lines[1].starts_with("Grammarly,"));
    }

    #[tokio::test]
    async fn test_summary_export() {
        let (status, headers, body) = get("/api/exports/summary.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert!(
            headers[header::CONTENT_DISPOSITION]
                .to_str()
                .unwrap()
                .contains("shadow_ai_exec_summary_")
        );
        assert!(body.contains("1. ChatGPT"));
    }

    #[tokio::test]
    async fn test_dashboard_page() {
        let (status, _, body) = get("/?dept=Marketing&tool=ChatGPT").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Shadow AI Discovery &amp; Risk Intake"));
        assert!(body.contains("Tool detail: ChatGPT"));
        assert!(body.contains("/api/exports/full.csv?dept=Marketing&amp;tool=ChatGPT"));
        assert!(!body.contains("synthetic demo data"));
    }
}
