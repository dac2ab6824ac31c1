//! End-to-end tests for the HTTP surface, driven through the router with a
//! stub classifier in place of a real artifact.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use fraud_detection_api::{
    AppState, Classifier, ModelAdapter, PredictionService, ServiceMetrics,
};

struct FixedClassifier(f64);

impl Classifier for FixedClassifier {
    fn predict(&self, _features: &[f32]) -> anyhow::Result<f64> {
        Ok(self.0)
    }
}

fn app_with_probability(probability: f64) -> Router {
    app(ModelAdapter::from_classifier(Box::new(FixedClassifier(
        probability,
    ))))
}

fn app(adapter: ModelAdapter) -> Router {
    let adapter = Arc::new(adapter);
    let metrics = Arc::new(ServiceMetrics::new());
    let service = Arc::new(PredictionService::new(adapter.clone(), metrics.clone(), 0.5));
    fraud_detection_api::server::router(
        AppState {
            service,
            adapter,
            metrics,
        },
        "static",
    )
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

const SAMPLE_TRANSACTION: &str = r#"{
    "transaction_amount": 100.50,
    "avg_transaction_amount_7d": 50.25,
    "failed_transaction_count_7d": 0,
    "daily_transaction_count": 5,
    "risk_score": 0.3,
    "card_age": 365
}"#;

#[tokio::test]
async fn predict_end_to_end() {
    let app = app_with_probability(0.85);

    let response = app
        .oneshot(post_json("/predict", SAMPLE_TRANSACTION))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    let probability = body["fraud_probability"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&probability));
    assert!(body["is_fraud"].is_boolean());
    assert!(body["response_time_ms"].as_f64().unwrap() >= 0.0);
    assert!((0.0..=1.0).contains(&body["confidence"].as_f64().unwrap()));
}

#[tokio::test]
async fn predict_with_zero_daily_count_does_not_error() {
    let app = app_with_probability(0.4);

    // daily_transaction_count omitted entirely, failures present
    let response = app
        .clone()
        .oneshot(post_json(
            "/predict",
            r#"{"transaction_amount": 100.0, "failed_transaction_count_7d": 2}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // and explicitly zero
    let response = app
        .oneshot(post_json(
            "/predict",
            r#"{"transaction_amount": 100.0, "failed_transaction_count_7d": 2,
                "daily_transaction_count": 0}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn predict_validation_failures_echo_detail() {
    let app = app_with_probability(0.5);

    let response = app
        .clone()
        .oneshot(post_json("/predict", r#"{"transaction_amount": -100}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("transaction_amount"));

    let response = app
        .clone()
        .oneshot(post_json(
            "/predict",
            r#"{"transaction_amount": 100, "risk_score": 1.5}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .oneshot(post_json(
            "/predict",
            r#"{"transaction_amount": 100, "transaction_type": "Wire"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn predict_missing_required_field_is_422() {
    let app = app_with_probability(0.5);

    let response = app
        .oneshot(post_json("/predict", r#"{"risk_score": 0.3}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn health_is_200_without_model() {
    let app = app(ModelAdapter::unloaded());

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn predict_is_503_without_model_while_health_stays_200() {
    let app = app(ModelAdapter::unloaded());

    let response = app
        .clone()
        .oneshot(post_json("/predict", SAMPLE_TRANSACTION))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Model not loaded");

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn api_root_identifies_the_service() {
    let app = app(ModelAdapter::unloaded());

    let response = app
        .oneshot(Request::get("/api").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("Fraud Detection"));
    assert!(body["version"].as_str().is_some());
}

#[tokio::test]
async fn metrics_total_requests_increments_per_predict() {
    let app = app_with_probability(0.9);

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(post_json("/predict", SAMPLE_TRANSACTION))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total_requests"], 3);
    assert_eq!(body["predictions"], 3);
    assert_eq!(body["fraud_detected"], 3);
    assert_eq!(body["model_loaded"], true);
}

#[tokio::test]
async fn metrics_survive_concurrent_predictions() {
    let app = app_with_probability(0.9);

    let mut handles = Vec::new();
    for _ in 0..50 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            app.oneshot(post_json("/predict", SAMPLE_TRANSACTION))
                .await
                .unwrap()
                .status()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    let response = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["total_requests"], 50);
}

#[tokio::test]
async fn batch_scores_and_tallies() {
    let app = app_with_probability(0.9);

    let batch = format!(
        r#"{{"transactions": [{}, {}, {}]}}"#,
        SAMPLE_TRANSACTION, SAMPLE_TRANSACTION, SAMPLE_TRANSACTION
    );

    let response = app
        .oneshot(post_json("/predict/batch", &batch))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_transactions"], 3);
    assert_eq!(body["total_fraud_detected"], 3);
    assert_eq!(body["predictions"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn batch_over_limit_is_rejected() {
    let app = app_with_probability(0.5);

    let one_hundred_one = std::iter::repeat(SAMPLE_TRANSACTION)
        .take(101)
        .collect::<Vec<_>>()
        .join(",");
    let batch = format!(r#"{{"transactions": [{}]}}"#, one_hundred_one);

    let response = app
        .oneshot(post_json("/predict/batch", &batch))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("100"));
}

#[tokio::test]
async fn unknown_path_is_404() {
    let app = app(ModelAdapter::unloaded());

    let response = app
        .oneshot(Request::get("/nonexistent").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
