#![cfg(feature = "web")]

mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use common::FakeSheet;
use serde_json::Value;
use tessera::app::{AppState, router};
use tessera::login::{SESSION_COOKIE, SESSION_SENTINEL};
use tessera::pages::Pages;
use tower::ServiceExt;

fn app_with(sheet: Arc<FakeSheet>, password: Option<&str>) -> Router {
    let state = AppState {
        sheets: sheet,
        password: password.map(str::to_string),
        pages: Pages::new().unwrap(),
    };
    router(Arc::new(state))
}

fn session_cookie() -> String {
    format!("{}={}", SESSION_COOKIE, SESSION_SENTINEL)
}

async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, session_cookie())
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_verify_member_found() {
    let sheet = Arc::new(FakeSheet::club(&[("FL001234", "Annuale", "5")]));
    let app = app_with(sheet.clone(), Some("segreta"));

    let response = get(app, "/api/verify-subscription?ID=FL001234").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["isMember"], true);
    assert_eq!(body["entriesCount"], 6);
    assert_eq!(body["membershipType"], "Annuale");
    assert_eq!(sheet.write_log(), vec![(1, 3, 6)]);
    println!("✓ GET /api/verify-subscription returns the verdict");
}

#[tokio::test]
async fn test_verify_member_not_found_is_ok() {
    let sheet = Arc::new(FakeSheet::club(&[("FL001234", "Annuale", "5")]));
    let app = app_with(sheet, None);

    let response = get(app, "/api/verify-subscription?ID=FL000000").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["isMember"], false);
    assert!(body.get("entriesCount").is_none());
    assert!(body.get("membershipType").is_none());
}

#[tokio::test]
async fn test_verify_requires_id() {
    let sheet = Arc::new(FakeSheet::club(&[]));

    let response = get(app_with(sheet.clone(), None), "/api/verify-subscription").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["isMember"], false);

    let response = get(app_with(sheet.clone(), None), "/api/verify-subscription?ID=").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(sheet.read_count(), 0);
}

#[tokio::test]
async fn test_verify_missing_column_is_server_error() {
    let sheet = Arc::new(FakeSheet::new(&[&["UUID", "Ingressi"], &["FL000001", "1"]]));

    let response = get(app_with(sheet, None), "/api/verify-subscription?ID=FL000001").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("Tipo Tes"));
}

#[tokio::test]
async fn test_verify_missing_spreadsheet_is_not_found() {
    let sheet = Arc::new(FakeSheet::club(&[]).missing_spreadsheet());

    let response = get(app_with(sheet, None), "/api/verify-subscription?ID=FL000001").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_verify_degraded_write() {
    let sheet = Arc::new(FakeSheet::club(&[("FL001234", "Annuale", "")]).failing_writes());

    let response = get(app_with(sheet, None), "/api/verify-subscription?ID=FL001234").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["isMember"], true);
    assert_eq!(body["entriesCount"], 1);
    assert!(body.get("membershipType").is_none());
}

#[tokio::test]
async fn test_verify_rejects_other_methods() {
    let sheet = Arc::new(FakeSheet::club(&[]));
    let response = app_with(sheet, None)
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/verify-subscription?ID=FL000001")
                .header(header::COOKIE, session_cookie())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Method not allowed");
}

#[tokio::test]
async fn test_result_page_renders_member() {
    let sheet = Arc::new(FakeSheet::club(&[("FL001234", "Junior", "2")]));

    let response = get(app_with(sheet.clone(), None), "/verify-result?id=FL001234").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = text_body(response).await;
    assert!(html.contains("Socio Verificato!"));
    assert!(html.contains("Junior"));
    assert!(html.contains("FL001234"));
    assert!(html.contains("ingressi precedenti"));
    assert_eq!(sheet.write_log(), vec![(1, 3, 3)]);
}

#[tokio::test]
async fn test_result_page_renders_unknown_member() {
    let sheet = Arc::new(FakeSheet::club(&[("FL001234", "Junior", "2")]));

    let response = get(app_with(sheet, None), "/verify-result?id=XX").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = text_body(response).await;
    assert!(html.contains("Socio Non Trovato"));
}

#[tokio::test]
async fn test_result_page_without_id_goes_home() {
    let sheet = Arc::new(FakeSheet::club(&[]));

    let response = get(app_with(sheet, None), "/verify-result").await;
    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn test_index_page() {
    let sheet = Arc::new(FakeSheet::club(&[]));

    let response = get(app_with(sheet, None), "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = text_body(response).await;
    assert!(html.contains("action=\"/verify-result\""));
}
