//! In-process harness: a wiremock backend and `oneshot` requests.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use elibros_kernel::settings::Settings;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

use crate::state::AppState;

pub(crate) fn state_for(server: &MockServer) -> AppState {
    let mut settings = Settings::default();
    settings.backend.base_url = format!("{}/api/v1/", server.uri());
    settings.integrations.cep_lookup_url = format!("{}/ws", server.uri());
    AppState::from_settings(&settings).expect("test state")
}

pub(crate) async fn call(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("request");

    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, json)
}

pub(crate) async fn get(router: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    call(router, Method::GET, uri, token, None).await
}

/// Mounts the admin check so `token` passes as staff.
pub(crate) async fn mount_admin(server: &MockServer, token: &str) {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, ResponseTemplate};

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/user_info/"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 1,
            "is_staff": true,
            "is_superuser": false
        })))
        .mount(server)
        .await;
}
