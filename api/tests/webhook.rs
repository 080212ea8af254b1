use std::sync::Arc;

use api::{AppState, router, sign};
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "webhook-secret";

fn state(dir: &tempfile::TempDir) -> Arc<AppState> {
    Arc::new(AppState::new(SECRET, dir.path().join("data/report_ids.txt")))
}

fn delivery(body: &str, signature: Option<&str>, header_name: &str) -> Request<Body> {
    let mut req = Request::post("/webhook").header("content-type", "application/json");
    if let Some(sig) = signature {
        req = req.header(header_name, sig);
    }
    req.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn signed_delivery_appends_report_id() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(&dir);

    let body = r#"{"data":{"report":{"id":"2571"}}}"#;
    let sig = sign(SECRET.as_bytes(), body.as_bytes()).unwrap();
    let resp = router(state.clone())
        .oneshot(delivery(body, Some(&sig), "X-H1-Signature"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "success": true }));

    let body = r#"{"data":{"report":{"id":2572}}}"#;
    let sig = sign(SECRET.as_bytes(), body.as_bytes()).unwrap();
    let resp = router(state.clone())
        .oneshot(delivery(body, Some(&sig), "x-h1-signature"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let feed = std::fs::read_to_string(&state.watch_file).unwrap();
    assert_eq!(feed, "2571\n2572\n");
}

#[tokio::test]
async fn missing_header_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let resp = router(state(&dir))
        .oneshot(delivery(r#"{"data":{"report":{"id":"1"}}}"#, None, "X-H1-Signature"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(resp).await,
        json!({ "success": false, "error": "Missing 'X-H1-Signature' header" })
    );
}

#[tokio::test]
async fn tampered_body_or_signature_is_unauthorized() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(&dir);
    let body = r#"{"data":{"report":{"id":"1"}}}"#;
    let sig = sign(SECRET.as_bytes(), body.as_bytes()).unwrap();

    let tampered_body = body.replace('1', "2");
    let resp = router(state.clone())
        .oneshot(delivery(&tampered_body, Some(&sig), "X-H1-Signature"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        json_body(resp).await,
        json!({ "success": false, "error": "Incorrect signature" })
    );

    let mut bad_sig = sig.clone().into_bytes();
    let last = bad_sig.len() - 1;
    bad_sig[last] = if bad_sig[last] == b'a' { b'b' } else { b'a' };
    let bad_sig = String::from_utf8(bad_sig).unwrap();
    let resp = router(state.clone())
        .oneshot(delivery(body, Some(&bad_sig), "X-H1-Signature"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    assert!(!state.watch_file.exists());
}

#[tokio::test]
async fn signed_non_json_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let body = "not json";
    let sig = sign(SECRET.as_bytes(), body.as_bytes()).unwrap();

    let resp = router(state(&dir))
        .oneshot(delivery(body, Some(&sig), "X-H1-Signature"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn id_with_inner_newline_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(&dir);
    let body = r#"{"data":{"report":{"id":"1\n2"}}}"#;
    let sig = sign(SECRET.as_bytes(), body.as_bytes()).unwrap();

    let resp = router(state.clone())
        .oneshot(delivery(body, Some(&sig), "X-H1-Signature"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(!state.watch_file.exists());
}

#[tokio::test]
async fn health_is_ok() {
    let dir = tempfile::tempdir().unwrap();
    let resp = router(state(&dir))
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
