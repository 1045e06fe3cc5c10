//! Whole-application checks: every module mounted behind the shared
//! middleware stack, talking to a mock backend.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use elibros_kernel::settings::Settings;
use elibros_web::{build_registry, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.backend.base_url = format!("{}/api/v1/", server.uri());
    settings
}

fn app(settings: &Settings) -> Router {
    let state = AppState::from_settings(settings).unwrap();
    let registry = build_registry(&state);
    elibros_http::build_router(&registry, settings)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn catalog_is_served_under_its_module_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/livros/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "titulo": "Dom Casmurro", "preco": "39.90"}
        ])))
        .mount(&server)
        .await;
    let router = app(&settings_for(&server));

    let (status, body) = send(
        &router,
        Request::get("/api/catalog/livros").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["titulo"], "Dom Casmurro");
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn admin_routes_need_a_session() {
    let server = MockServer::start().await;
    let router = app(&settings_for(&server));

    let (status, body) = send(
        &router,
        Request::get("/api/admin/dashboard").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn unreachable_backend_is_retryable() {
    let server = MockServer::start().await;
    let settings = settings_for(&server);
    drop(server);
    let router = app(&settings);

    let (status, body) = send(
        &router,
        Request::get("/api/catalog/livros/1").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["retryable"], true);
}

#[tokio::test]
async fn openapi_document_lists_every_module() {
    let router = app(&Settings::default());

    let (status, body) = send(
        &router,
        Request::get("/docs/openapi.json").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    for path in [
        "/healthz",
        "/api/status",
        "/api/auth/login",
        "/api/catalog/livros/{id}",
        "/api/cart/itens",
        "/api/checkout/confirmar",
        "/api/orders/{id}/cancelar",
        "/api/profile/endereco",
        "/api/admin/cupons",
    ] {
        assert!(body["paths"][path].is_object(), "missing {path}");
    }
}

#[tokio::test]
async fn run_until_stops_cleanly() {
    let mut settings = Settings::default();
    settings.server.host = "127.0.0.1".into();
    settings.server.port = 0;

    elibros_web::run_until(settings, async {}).await.unwrap();
}
