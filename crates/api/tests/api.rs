//! Router integration tests

use api::{create_router, AppContext, Settings};
use assistant::{ChatRequest, LlmClient, LlmError, Narrator};
use async_trait::async_trait;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::{middleware, Router};
use feature_engine::FEATURE_NAMES;
use http_body_util::BodyExt;
use inference_engine::LinearModel;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const STORE: i64 = 2633;

fn csv_fixture() -> String {
    let mut header = vec!["Store Number", "Year", "Month", "Total_Sales"];
    header.extend(FEATURE_NAMES);

    let row = |store: i64, year: i32, month: u32, sales: f64| {
        let mut cells = vec![
            store.to_string(),
            year.to_string(),
            month.to_string(),
            sales.to_string(),
        ];
        cells.extend((0..FEATURE_NAMES.len()).map(|i| format!("{}.5", i)));
        cells.join(",")
    };

    [
        header.join(","),
        row(STORE, 2022, 10, 100.0),
        row(STORE, 2022, 11, 200.0),
        row(STORE, 2022, 12, 300.0),
        row(12, 2022, 12, 500.0),
    ]
    .join("\n")
}

fn context(model: LinearModel, narrator: Narrator) -> Arc<AppContext> {
    let table = storage::read_csv(csv_fixture().as_bytes()).unwrap();
    let settings = Settings::default();
    Arc::new(AppContext::new(table, Arc::new(model), narrator, settings.forecast).unwrap())
}

/// Stand-in for `into_make_service_with_connect_info`, which the
/// per-IP limiter reads the peer address from
async fn with_peer(mut request: Request<Body>) -> Request<Body> {
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
    request
}

fn router_with(ctx: Arc<AppContext>, settings: &Settings) -> Router {
    create_router(ctx, settings).layer(middleware::map_request(with_peer))
}

fn router(ctx: Arc<AppContext>) -> Router {
    router_with(ctx, &Settings::default())
}

fn constant_app() -> Router {
    let importances: Vec<f64> = (1..=FEATURE_NAMES.len()).map(|i| i as f64 / 136.0).collect();
    router(context(
        LinearModel::constant(100.0).with_importances(importances),
        Narrator::disabled(),
    ))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_index_is_plain_text() {
    let response = constant_app().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ML Forecast API is live and working!");
}

#[tokio::test]
async fn test_health_reports_table() {
    let (status, body) = send(constant_app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["stores"], 2);
    assert_eq!(body["rows"], 4);
    assert_eq!(body["narration_enabled"], false);
}

#[tokio::test]
async fn test_predict_constant_model() {
    let (status, body) = send(
        constant_app(),
        post_json("/predict", json!({ "store": STORE, "weeks": 3 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let steps = body["prediction"].as_array().unwrap();
    assert_eq!(steps.len(), 3);
    for step in steps {
        assert_eq!(step["predicted"], 100.0);
        assert_eq!(step["upper"], 5100.0);
        assert_eq!(step["lower"], 0.0);
    }
    assert_eq!(body["total"], 300.0);
}

#[tokio::test]
async fn test_predict_defaults_and_string_store() {
    let (status, body) = send(
        constant_app(),
        post_json("/predict", json!({ "store": "2633", "weeks": "lots" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"].as_array().unwrap().len(), 4);
    assert_eq!(body["total"], 400.0);
}

#[tokio::test]
async fn test_predict_at_max_horizon() {
    let (status, body) = send(
        constant_app(),
        post_json("/predict", json!({ "store": STORE, "weeks": 60 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"].as_array().unwrap().len(), 60);
    assert_eq!(body["total"], 6000.0);
}

#[tokio::test]
async fn test_predict_rejects_horizon_over_max() {
    let (status, body) = send(
        constant_app(),
        post_json("/predict", json!({ "store": STORE, "weeks": 61 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("60"));
}

#[tokio::test]
async fn test_predict_negative_weeks_is_empty() {
    let (status, body) = send(
        constant_app(),
        post_json("/predict", json!({ "store": STORE, "weeks": -3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["prediction"].as_array().unwrap().is_empty());
    assert_eq!(body["total"], 0.0);
}

#[tokio::test]
async fn test_predict_zero_weeks() {
    let (status, body) = send(
        constant_app(),
        post_json("/predict", json!({ "store": STORE, "weeks": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["prediction"].as_array().unwrap().is_empty());
    assert_eq!(body["total"], 0.0);
}

#[tokio::test]
async fn test_predict_unknown_store() {
    let (status, body) = send(constant_app(), post_json("/predict", json!({ "store": 99999 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Store 99999 not found.");
}

#[tokio::test]
async fn test_predict_rejects_bad_store() {
    let (status, body) = send(constant_app(), post_json("/predict", json!({ "weeks": 2 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(constant_app(), post_json("/predict", json!({ "store": "abc" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_rejects_malformed_json() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(constant_app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_metrics() {
    let (status, body) = send(constant_app(), get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["MAE"], 175.0);
    assert_eq!(body["RMSE"], 229.13);
}

#[tokio::test]
async fn test_feature_importance_split() {
    let (status, body) = send(constant_app(), get("/feature_importance")).await;
    assert_eq!(status, StatusCode::OK);

    let actionable = body["actionable"].as_array().unwrap();
    let conceptual = body["conceptual"].as_array().unwrap();
    assert_eq!(actionable.len(), 3);
    assert_eq!(conceptual.len(), 13);
    assert_eq!(actionable[0]["feature"], "Average_Price");
}

#[tokio::test]
async fn test_feature_importance_unavailable() {
    let app = router(context(LinearModel::constant(1.0), Narrator::disabled()));
    let (status, body) = send(app, get("/feature_importance")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_seasonality_all_stores_and_alias() {
    for uri in ["/seasonality", "/analysis/seasonality"] {
        let (status, body) = send(constant_app(), get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        let months = body["seasonality"].as_array().unwrap();
        assert_eq!(months.len(), 3);
        let december = months.iter().find(|m| m["month"] == 12).unwrap();
        assert_eq!(december["avg_sales"], 400.0);
    }
}

#[tokio::test]
async fn test_seasonality_single_store() {
    let (status, body) = send(constant_app(), get("/seasonality?store=2633")).await;
    assert_eq!(status, StatusCode::OK);
    let months = body["seasonality"].as_array().unwrap();
    let december = months.iter().find(|m| m["month"] == 12).unwrap();
    assert_eq!(december["avg_sales"], 300.0);
    assert_eq!(december["std_sales"], 0.0);
}

#[tokio::test]
async fn test_seasonality_errors() {
    let (status, body) = send(constant_app(), get("/seasonality?store=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid store ID");

    let (status, _) = send(constant_app(), get("/seasonality?store=77")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stores_sorted() {
    let (status, body) = send(constant_app(), get("/stores")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stores"], json!([12, STORE]));
}

#[tokio::test]
async fn test_compare_recent_points() {
    let (status, body) = send(
        constant_app(),
        post_json("/compare", json!({ "store": STORE, "num_points": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["month"], 11);
    assert_eq!(data[1]["actual"], 300.0);
    assert_eq!(data[1]["predicted"], 100.0);
}

#[tokio::test]
async fn test_compare_negative_points_is_empty() {
    let (status, body) = send(
        constant_app(),
        post_json("/compare", json!({ "store": STORE, "num_points": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_telemetry_without_recorder() {
    let response = constant_app().oneshot(get("/telemetry")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_narration_disabled() {
    let (status, body) = send(
        constant_app(),
        post_json(
            "/api/chat",
            json!({ "question": "Why the spike?", "chartData": [1, 2, 3] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("OPENAI_API_KEY"));
}

#[tokio::test]
async fn test_narration_validates_before_backend() {
    let (status, _) = send(constant_app(), post_json("/api/chat", json!({ "question": "?" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

struct CannedClient {
    calls: Mutex<Vec<u32>>,
}

#[async_trait]
impl LlmClient for CannedClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(request.max_tokens);
        Ok("Sales peak in December.".to_string())
    }

    fn provider_name(&self) -> &str {
        "canned"
    }
}

#[tokio::test]
async fn test_narration_routes_relay() {
    let client = Arc::new(CannedClient {
        calls: Mutex::new(Vec::new()),
    });
    let app = router(context(
        LinearModel::constant(1.0),
        Narrator::new(client.clone()),
    ));

    let (status, body) = send(
        app.clone(),
        post_json(
            "/api/chat",
            json!({ "question": "Why?", "chartType": "line", "chartData": [1, 2] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Sales peak in December.");

    let summary = json!({
        "store": STORE,
        "forecastSummary": {
            "totalPredicted": 816784.0,
            "weeks": 4,
            "confidence_low": 796784.0,
            "confidence_high": 836784.0
        }
    });
    let (status, body) = send(app.clone(), post_json("/ai-summary", summary)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], "Sales peak in December.");

    let importance = json!({
        "actionable": [{ "feature": "Average_Price", "importance": 0.2 }],
        "conceptual": [{ "feature": "Lag_1", "importance": 0.5 }]
    });
    let (status, _) = send(app, post_json("/ai_feature_importance", importance)).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(*client.calls.lock().unwrap(), vec![200, 150, 150]);
}

#[tokio::test]
async fn test_narration_rate_limited_after_burst() {
    let settings = Settings::default();
    let app = router_with(
        context(LinearModel::constant(1.0), Narrator::disabled()),
        &settings,
    );
    let incomplete = json!({ "question": "?" });

    for _ in 0..settings.rate_limit.burst_size {
        let (status, _) = send(app.clone(), post_json("/api/chat", incomplete.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let response = app
        .oneshot(post_json("/api/chat", incomplete))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_forecast_routes_not_rate_limited() {
    let app = constant_app();
    for _ in 0..(Settings::default().rate_limit.burst_size + 3) {
        let (status, _) = send(app.clone(), get("/stores")).await;
        assert_eq!(status, StatusCode::OK);
    }
}
