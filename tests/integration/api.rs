//! JSON API replay through the router.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use wheelwatch::config::EngineConfig;
use wheelwatch::dashboard::{build_router, ApiState, AppState};
use wheelwatch::session::Session;

fn state() -> AppState {
    Arc::new(ApiState::new(Session::new(&EngineConfig::default())))
}

async fn call(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_spin_by_spin_over_http() {
    let state = state();
    let mut bets = Vec::new();
    for n in [2, 5, 8, 11, 14, 17, 20, 23] {
        let (status, json) = call(
            build_router(state.clone()),
            "POST",
            "/api/draws",
            Some(json!({ "number": n })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let absence = &json["analysis"]["column"]["absence"];
        if absence["signalType"] == "COLUMN" {
            bets.push(absence["nextBet"].as_u64().unwrap());
        }
    }
    assert_eq!(bets, vec![1, 1, 1, 2]);

    let (_, history) = call(build_router(state), "GET", "/api/history", None).await;
    assert_eq!(history["draws"][0], 23);
    assert_eq!(history["ready"], true);
}

#[tokio::test]
async fn test_stake_lines_are_strings() {
    let (status, json) = call(
        build_router(state()),
        "PUT",
        "/api/history",
        Some(json!({ "draws": [2, 5, 8, 11, 14, 17] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["analysis"]["column"]["stakes"], json!(["1", "1", "-"]));
}

#[tokio::test]
async fn test_error_body_shape() {
    let (status, json) = call(
        build_router(state()),
        "POST",
        "/api/draws",
        Some(json!({ "number": -3 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        json["error"],
        "Invalid draw -3: numbers must be between 0 and 36"
    );
}
