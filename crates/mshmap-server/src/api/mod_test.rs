use super::*;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use mshmap_analytics::MemoryStore;
use mshmap_core::{Coordinates, LocationRecord};
use tower::ServiceExt;

fn located(id: &str, category: &str, lat: f64, lng: f64) -> LocationRecord {
    LocationRecord {
        id: id.to_string(),
        name: id.to_string(),
        category: Some(category.to_string()),
        coordinates: Some(Coordinates::new(lat, lng)),
        rating: None,
        city: None,
    }
}

fn memory_state(store: Arc<MemoryStore>) -> AppState {
    AppState {
        store,
        analytics: Arc::new(AnalyticsConfig::default()),
    }
}

fn seeded_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_locations(vec![
        located("spielplatz", "playground", 51.4667, 11.301),
        located("museum", "museum", 51.5275, 11.5481),
        located("bad", "pool", 51.65, 11.5),
    ]))
}

fn token_auth() -> AuthState {
    AuthState::from_tokens(&["cron-secret".to_string()], false).expect("auth")
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

#[test]
fn api_error_validation_error_maps_to_bad_request() {
    let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn api_error_unknown_code_maps_to_internal_error() {
    let response = ApiError::new("req-1", "internal_error", "boom").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_reports_ok_and_echoes_request_id() {
    let app = build_app(
        memory_state(seeded_store()),
        AuthState::disabled(),
        default_rate_limit_state(),
    );
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header("x-request-id", "req-health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-health")
    );
    let json = json_body(response).await;
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["meta"]["request_id"], "req-health");
}

#[tokio::test]
async fn health_degrades_when_store_is_down() {
    let store = seeded_store();
    store.fail_on("ping").expect("configure");
    let app = build_app(
        memory_state(store),
        AuthState::disabled(),
        default_rate_limit_state(),
    );
    let response = app
        .oneshot(get_request("/api/v1/health"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = json_body(response).await;
    assert_eq!(json["data"]["database"], "unavailable");
}

#[tokio::test]
async fn overview_is_not_found_before_first_recalculation() {
    let app = build_app(
        memory_state(seeded_store()),
        AuthState::disabled(),
        default_rate_limit_state(),
    );
    let response = app
        .oneshot(get_request("/api/v1/analytics/overview"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn recalculate_requires_bearer_token() {
    let app = build_app(
        memory_state(seeded_store()),
        token_auth(),
        default_rate_limit_state(),
    );

    let response = app
        .clone()
        .oneshot(post_request("/api/v1/analytics/recalculate", None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(post_request("/api/v1/analytics/recalculate", Some("wrong")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn recalculate_then_read_artifacts() {
    let store = seeded_store();
    let app = build_app(
        memory_state(Arc::clone(&store)),
        token_auth(),
        default_rate_limit_state(),
    );

    let response = app
        .clone()
        .oneshot(post_request(
            "/api/v1/analytics/recalculate",
            Some("cron-secret"),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["success"], true);
    assert_eq!(json["data"]["summary"]["locations"], 3);
    assert_eq!(json["data"]["summary"]["cities"], 3);

    let response = app
        .clone()
        .oneshot(get_request("/api/v1/analytics/overview"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["total_locations"], 3);
    assert_eq!(json["data"]["category_totals"]["museum"], 1);

    let response = app
        .clone()
        .oneshot(get_request("/api/v1/analytics/cities"))
        .await
        .expect("response");
    let json = json_body(response).await;
    assert_eq!(json["data"].as_array().map(Vec::len), Some(3));

    let response = app
        .clone()
        .oneshot(get_request("/api/v1/analytics/gaps?severity=critical"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let gaps = json["data"].as_array().expect("gap array");
    assert!(gaps.iter().all(|g| g["severity"] == "critical"));

    let response = app
        .oneshot(get_request("/api/v1/analytics/insights"))
        .await
        .expect("response");
    let json = json_body(response).await;
    let insights = json["data"].as_array().expect("insight array");
    assert!(insights.iter().any(|i| i["id"] == "total-locations"));
}

#[tokio::test]
async fn gaps_reject_unknown_severity() {
    let app = build_app(
        memory_state(seeded_store()),
        AuthState::disabled(),
        default_rate_limit_state(),
    );
    let response = app
        .oneshot(get_request("/api/v1/analytics/gaps?severity=dire"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn weekly_report_trigger_saves_report() {
    let store = seeded_store();
    let app = build_app(
        memory_state(Arc::clone(&store)),
        token_auth(),
        default_rate_limit_state(),
    );
    let response = app
        .oneshot(post_request("/api/v1/reports/weekly", Some("cron-secret")))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["summary"]["locations"], 0);
    assert_eq!(store.reports().expect("reports").len(), 1);
}

#[tokio::test]
async fn recalculation_failure_is_a_500() {
    let store = seeded_store();
    store.fail_on("replace_all_gaps").expect("configure");
    let app = build_app(
        memory_state(store),
        AuthState::disabled(),
        default_rate_limit_state(),
    );
    let response = app
        .oneshot(post_request("/api/v1/analytics/recalculate", None))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response).await;
    assert_eq!(json["error"]["message"], "recalculation failed");
}

#[tokio::test]
async fn read_routes_are_rate_limited() {
    let app = build_app(
        memory_state(seeded_store()),
        AuthState::disabled(),
        RateLimitState::new(1, Duration::from_secs(60)),
    );

    let first = app
        .clone()
        .oneshot(get_request("/api/v1/analytics/cities"))
        .await
        .expect("response");
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(get_request("/api/v1/analytics/cities"))
        .await
        .expect("response");
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}
