//! Cloudburst REST API
//!
//! HTTP API layer for the dashboard, built with Axum.
//!
//! # Endpoints
//!
//! ## Reports
//! - `GET /api/v1/reports/:id` - Fetch and aggregate a stored report
//! - `GET /api/v1/demo` - Sample dashboard data
//!
//! ## Aggregation
//! - `POST /api/v1/aggregate` - Aggregate a history document from the body
//! - `GET /api/v1/categories` - Active category table
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use cloudburst::api::{serve, AppState};
//! use cloudburst::config::Config;
//! use cloudburst::report::ReportClient;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let client = ReportClient::new(config.report.client_config())?;
//!
//!     let state = AppState::new(
//!         Arc::new(client),
//!         config.aggregation.category_table(),
//!         config.aggregation.options(),
//!         config.api.clone(),
//!     );
//!     serve(state, &config.api).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/reports/:id", get(routes::reports::get_report))
        .route("/demo", get(routes::reports::demo))
        .route("/aggregate", post(routes::aggregate::aggregate_document))
        .route("/categories", get(routes::categories::list_categories));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config);
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Cloudburst API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Cloudburst API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{AggregateOptions, CategoryTable, WeekdayZone};
    use crate::report::{ReportDocument, ReportError, ReportResult, ReportSource};
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    struct FixtureSource;

    #[async_trait]
    impl ReportSource for FixtureSource {
        fn name(&self) -> &str {
            "fixtures"
        }

        async fn fetch(&self, report_id: &str) -> ReportResult<ReportDocument> {
            let document = match report_id {
                "full" => json!({
                    "entries": [
                        {"domain": "youtube.com", "visitCount": 10, "lastVisitTime": 1704110400000_i64},
                        {"url": "https://docs.google.com/x"}
                    ]
                }),
                "empty" => json!({"entries": []}),
                "weird" => json!({"report": 1}),
                "boom" => return Err(ReportError::Status { status: 500 }),
                "down" => return Err(ReportError::Unavailable),
                _ => return Err(ReportError::NotFound(report_id.to_string())),
            };
            Ok(ReportDocument::from_value(&document)?)
        }
    }

    fn create_test_app() -> Router {
        let state = AppState::new(
            Arc::new(FixtureSource),
            CategoryTable::builtin(),
            AggregateOptions::default().zone(WeekdayZone::utc()),
            ApiConfig::default(),
        );
        build_router(state)
    }

    async fn get(uri: &str) -> Response {
        create_test_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_json(uri: &str, body: &str) -> Response {
        create_test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(get("/health/live").await.status(), StatusCode::OK);

        let response = get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["report_source"], "fixtures");
    }

    #[tokio::test]
    async fn test_demo() {
        let response = get("/api/v1/demo").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["mode"], "demo");
        assert_eq!(body["activity"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_loaded_report() {
        let response = get("/api/v1/reports/full").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "loaded");
        assert_eq!(body["reportId"], "full");
        assert_eq!(body["result"]["totalVisits"], 11);
        assert_eq!(body["result"]["weeklyActivityHours"][0], 0.5);
        assert_eq!(body["view"]["stats"]["mostVisited"], "youtube.com");
        assert_eq!(body["view"]["mode"], "live");
    }

    #[tokio::test]
    async fn test_empty_report_is_not_an_error() {
        let response = get("/api/v1/reports/empty").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "no_data");
        assert_eq!(body["message"], "Report found but contains no history data.");
    }

    #[tokio::test]
    async fn test_report_not_found() {
        let response = get("/api/v1/reports/missing").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "REPORT_NOT_FOUND");
        assert_eq!(body["error"]["message"], "Report not found");
    }

    #[tokio::test]
    async fn test_upstream_failures_distinct_from_not_found() {
        let response = get("/api/v1/reports/boom").await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(json_body(response).await["error"]["message"], "Failed to load report");

        let response = get("/api/v1/reports/down").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = get("/api/v1/reports/weird").await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(json_body(response).await["error"]["code"], "MALFORMED_REPORT");
    }

    #[tokio::test]
    async fn test_aggregate_posted_document() {
        let response = post_json(
            "/api/v1/aggregate?top_n=1",
            r#"[{"domain": "reddit.com", "visitCount": 4}, {"domain": "github.com", "visitCount": 2}]"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["totalVisits"], 6);
        assert_eq!(body["topDomains"].as_array().unwrap().len(), 1);
        assert_eq!(body["topDomains"][0]["domain"], "reddit.com");
        assert_eq!(body["categoryBreakdown"][0]["name"], "Social Media");
    }

    #[tokio::test]
    async fn test_aggregate_empty_document() {
        let response = post_json("/api/v1/aggregate", r#"{"history": []}"#).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["totalVisits"], 0);
        assert_eq!(body["weeklyActivityHours"], json!([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
    }

    #[tokio::test]
    async fn test_aggregate_rejects_unknown_shape() {
        let response = post_json("/api/v1/aggregate", r#"{"foo": []}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "INVALID_DOCUMENT");
    }

    #[tokio::test]
    async fn test_aggregate_invalid_json() {
        let response = post_json("/api/v1/aggregate", "not json").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].as_str().unwrap().contains("JSON"));
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_aggregate_bad_query_uses_error_envelope() {
        let response = post_json("/api/v1/aggregate?top_n=lots", "[]").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_aggregate_rejects_bad_options() {
        let response = post_json("/api/v1/aggregate?top_n=0", "[]").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_categories() {
        let response = get("/api/v1/categories").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["categories"].as_array().unwrap().len(), 5);
        assert_eq!(body["fallback"]["name"], "Other");
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method("OPTIONS")
            .uri("/api/v1/demo")
            .header("Origin", origin)
            .header("Access-Control-Request-Method", "GET")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_cors_allows_listed_origins_only() {
        let config = ApiConfig {
            // the unparsable entry is skipped, the rest still apply
            cors_origins: vec!["http://localhost:3000".to_string(), "bad\norigin".to_string()],
            ..Default::default()
        };
        let app = build_router(AppState::new(
            Arc::new(FixtureSource),
            CategoryTable::builtin(),
            AggregateOptions::default(),
            config,
        ));

        let response = app
            .clone()
            .oneshot(preflight("http://localhost:3000"))
            .await
            .unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:3000"
        );

        let response = app.oneshot(preflight("http://elsewhere.example")).await.unwrap();
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }

    #[tokio::test]
    async fn test_cors_permissive_without_origins() {
        let response = create_test_app()
            .oneshot(preflight("http://elsewhere.example"))
            .await
            .unwrap();
        assert_eq!(response.headers().get("access-control-allow-origin").unwrap(), "*");
    }
}
