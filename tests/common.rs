#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, Response};
use axum::Router;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use onlyoffice_pipedrive::config::{extract_config, ConfigV1};
use onlyoffice_pipedrive::routes::create_router;
use onlyoffice_pipedrive::startup::build_state;
use onlyoffice_pipedrive::state::AppState;
use serde_json::Value;

/// Config pointing both the gateway and the CRM at `url`.
pub fn test_config(url: &str) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
bind_address: "127.0.0.1:0"
logging:
  level: "debug"
  format: "console"
gateway:
  base_url: "{url}"
crm:
  base_url: "{url}/"
session:
  refresh_interval_ms: 50
  expiry_margin_ms: 1000
sdk:
  signed_token: "signed-context"
editor:
  route: "/editor"
  link_format: "data"
  default_deal_id: "1"
"#,
        url = url
    );
    extract_config(Figment::new().merge(Yaml::string(&yaml))).expect("test config")
}

pub fn build_app(config: ConfigV1) -> (Router, AppState) {
    let state = build_state(Arc::new(config));
    (create_router(state.clone()), state)
}

pub fn request(path: &str, method: Method) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn json_request(path: &str, method: Method, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("body is not json")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    String::from_utf8(bytes.to_vec()).expect("body is not utf-8")
}

/// Standard gateway and CRM identity mocks for a signed-in user.
pub async fn mock_sign_in(server: &mut mockito::ServerGuard) -> (mockito::Mock, mockito::Mock) {
    let me = server
        .mock("GET", "/api/me")
        .match_header("x-pipedrive-app-context", "signed-context")
        .with_status(200)
        .with_body(r#"{"id": 1, "access_token": "crm-token", "expires_at": 4102444800000}"#)
        .create_async()
        .await;
    let crm_me = server
        .mock("GET", "/api/v1/users/me")
        .match_header("authorization", "Bearer crm-token")
        .with_status(200)
        .with_body(
            r#"{"success": true, "data": {"id": 1, "name": "Ann", "access": [{"app": "global", "admin": true}],
                "language": {"language_code": "en", "country_code": "US"}}}"#,
        )
        .create_async()
        .await;
    (me, crm_me)
}
