use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use elibros_authz::{is_admin, AdminSession, Session};
use elibros_client::models::Usuario;
use elibros_client::{ApiClient, ClientConfig};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&ClientConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
        ..ClientConfig::default()
    })
    .unwrap()
}

async fn user_info(server: &MockServer, token: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/admin/user_info/"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(response)
        .mount(server)
        .await;
}

fn app(api: ApiClient) -> Router {
    Router::new()
        .route("/me", get(|session: Session| async move { session.token().to_string() }))
        .route("/admin", get(|admin: AdminSession| async move { admin.token().to_string() }))
        .with_state(api)
}

async fn status_of(router: Router, uri: &str, bearer: Option<&str>) -> StatusCode {
    let mut request = Request::get(uri);
    if let Some(token) = bearer {
        request = request.header("authorization", format!("Bearer {token}"));
    }
    router
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn explicit_non_admin_flags_skip_the_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/user_info/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let known = Usuario {
        is_staff: Some(false),
        is_superuser: Some(false),
        ..Usuario::default()
    };
    assert!(!is_admin(&api_for(&server), "tok", Some(&known)).await);
}

#[tokio::test]
async fn missing_flags_ask_the_backend() {
    let server = MockServer::start().await;
    user_info(
        &server,
        "staff",
        ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "is_staff": true,
            "is_superuser": false,
            "admin_record": null
        })),
    )
    .await;

    let partial = Usuario {
        is_staff: Some(false),
        ..Usuario::default()
    };
    assert!(is_admin(&api_for(&server), "staff", Some(&partial)).await);
    assert!(is_admin(&api_for(&server), "staff", None).await);
}

#[tokio::test]
async fn backend_refusal_means_not_admin() {
    let server = MockServer::start().await;
    user_info(
        &server,
        "cliente",
        ResponseTemplate::new(403).set_body_json(json!({"detail": "Sem permissão"})),
    )
    .await;

    assert!(!is_admin(&api_for(&server), "cliente", None).await);
}

#[tokio::test]
async fn guards_answer_401_and_403() {
    let server = MockServer::start().await;
    user_info(
        &server,
        "admin",
        ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "is_staff": false,
            "is_superuser": false,
            "admin_record": {"id": 3, "rg": "12"}
        })),
    )
    .await;
    user_info(&server, "cliente", ResponseTemplate::new(403)).await;

    let api = api_for(&server);
    assert_eq!(status_of(app(api.clone()), "/me", None).await, StatusCode::UNAUTHORIZED);
    assert_eq!(status_of(app(api.clone()), "/me", Some("cliente")).await, StatusCode::OK);
    assert_eq!(status_of(app(api.clone()), "/admin", None).await, StatusCode::UNAUTHORIZED);
    assert_eq!(status_of(app(api.clone()), "/admin", Some("cliente")).await, StatusCode::FORBIDDEN);
    assert_eq!(status_of(app(api), "/admin", Some("admin")).await, StatusCode::OK);
}
