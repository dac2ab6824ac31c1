//! HTTP surface: routing, handlers, shared state

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::metrics::{MetricsSnapshot, ServiceMetrics};
use crate::models::adapter::ModelAdapter;
use crate::service::PredictionService;
use crate::types::prediction::{BatchRequest, BatchResponse, HealthResponse, PredictionResponse};
use crate::types::transaction::Transaction;

/// Shared handler state. Everything is behind an `Arc`, so cloning per
/// request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
    pub adapter: Arc<ModelAdapter>,
    pub metrics: Arc<ServiceMetrics>,
}

/// Build the application router.
///
/// Unmatched paths fall through to the static dashboard directory, so `/`
/// serves `index.html` and anything else under it serves as-is.
pub fn router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api", get(api_root))
        .route("/predict", post(predict))
        .route("/predict/batch", post(predict_batch))
        .route("/metrics", get(metrics))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &AppConfig, state: AppState) -> Result<()> {
    let app = router(state, &config.server.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind {}", addr))?;

    info!(addr = %addr, "Fraud Detection API listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Liveness/readiness probe. 200 even without a model, so orchestrators can
/// tell "process up" from "ready".
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::new(state.adapter.is_loaded()))
}

async fn api_root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Fraud Detection API",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/health",
        "metrics": "/metrics",
        "web_interface": "/",
    }))
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Transaction>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(transaction) = payload.map_err(reject)?;
    let response = state.service.predict(&transaction)?;
    Ok(Json(response))
}

async fn predict_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>, ApiError> {
    let Json(batch) = payload.map_err(reject)?;
    let response = state.service.predict_batch(&batch.transactions)?;
    Ok(Json(response))
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot(state.adapter.is_loaded()))
}

/// Body rejections (malformed JSON, missing fields) surface as validation
/// errors with the rejection text echoed in `detail`.
fn reject(rejection: JsonRejection) -> ApiError {
    ApiError::Validation(rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::adapter::Classifier;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct FixedClassifier(f64);

    impl Classifier for FixedClassifier {
        fn predict(&self, _features: &[f32]) -> anyhow::Result<f64> {
            Ok(self.0)
        }
    }

    fn test_state(adapter: ModelAdapter) -> AppState {
        let adapter = Arc::new(adapter);
        let metrics = Arc::new(ServiceMetrics::new());
        let service = Arc::new(PredictionService::new(adapter.clone(), metrics.clone(), 0.5));
        AppState {
            service,
            adapter,
            metrics,
        }
    }

    fn test_router(adapter: ModelAdapter) -> Router {
        router(test_state(adapter), "static")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_without_model() {
        let app = test_router(ModelAdapter::unloaded());

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["model_loaded"], false);
        assert_eq!(body["status"], "unhealthy");
    }

    #[tokio::test]
    async fn test_api_root_signature() {
        let app = test_router(ModelAdapter::unloaded());

        let response = app
            .oneshot(Request::get("/api").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("Fraud Detection"));
    }

    #[tokio::test]
    async fn test_predict_without_model_is_503() {
        let app = test_router(ModelAdapter::unloaded());

        let response = app
            .oneshot(
                Request::post("/predict")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"transaction_amount": 100.0}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["detail"], "Model not loaded");
    }

    #[tokio::test]
    async fn test_predict_with_stub_model() {
        let app = test_router(ModelAdapter::from_classifier(Box::new(FixedClassifier(
            0.85,
        ))));

        let response = app
            .oneshot(
                Request::post("/predict")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"transaction_amount": 100.5, "avg_transaction_amount_7d": 50.25,
                            "failed_transaction_count_7d": 0, "daily_transaction_count": 5,
                            "risk_score": 0.3, "card_age": 365}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["is_fraud"], true);
        assert!((body["fraud_probability"].as_f64().unwrap() - 0.85).abs() < 1e-9);
        assert!(body["response_time_ms"].as_f64().unwrap() >= 0.0);
    }

    #[tokio::test]
    async fn test_predict_malformed_json_is_422() {
        let app = test_router(ModelAdapter::from_classifier(Box::new(FixedClassifier(0.5))));

        let response = app
            .oneshot(
                Request::post("/predict")
                    .header("content-type", "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert!(body["detail"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_metrics_counts_requests() {
        let state = test_state(ModelAdapter::from_classifier(Box::new(FixedClassifier(0.2))));
        let app = router(state, "static");

        let payload = r#"{"transaction_amount": 42.0}"#;
        app.clone()
            .oneshot(
                Request::post("/predict")
                    .header("content-type", "application/json")
                    .body(Body::from(payload))
                    .unwrap(),
            )
            .await
            .unwrap();

        let response = app
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total_requests"], 1);
        assert_eq!(body["predictions"], 1);
        assert_eq!(body["fraud_detected"], 0);
        assert_eq!(body["non_fraud_detected"], 1);
    }
}
