//! Genres, authors and categories share one `{id, nome}` shape and one set
//! of handlers; the router is built once per [`Taxonomia`].

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use elibros_authz::AdminSession;
use elibros_client::models::{Taxonomia, Termo, TermoInput};
use elibros_http::AppError;
use elibros_kernel::openapi::{
    array_of, authed_operation, error_response, json_response, object, schema_ref,
};
use elibros_search::{rank_by, SortDirection};
use serde::Deserialize;
use serde_json::{json, Value};

use super::ListQuery;
use crate::state::AppState;
use crate::utils::parse_id;

#[derive(Debug, Default, Deserialize)]
pub struct TermForm {
    #[serde(default)]
    pub nome: String,
}

impl TermForm {
    fn validate(self) -> Result<TermoInput, AppError> {
        let nome = self.nome.trim();
        if nome.is_empty() {
            return Err(AppError::invalid_field("nome", "Nome é obrigatório"));
        }
        Ok(TermoInput {
            nome: nome.to_string(),
        })
    }
}

fn invalid_id(taxonomia: Taxonomia) -> String {
    format!("ID de {} inválido", taxonomia.singular())
}

pub(super) fn routes(taxonomia: Taxonomia) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(move |state: State<AppState>, admin: AdminSession, query: Query<ListQuery>| {
                list(state, admin, query, taxonomia)
            })
            .post(move |state: State<AppState>, admin: AdminSession, form: Json<TermForm>| {
                create(state, admin, form, taxonomia)
            }),
        )
        .route(
            "/{id}",
            put(
                move |state: State<AppState>,
                      admin: AdminSession,
                      id: Path<String>,
                      form: Json<TermForm>| {
                    update(state, admin, id, form, taxonomia)
                },
            )
            .delete(move |state: State<AppState>, admin: AdminSession, id: Path<String>| {
                remove(state, admin, id, taxonomia)
            }),
        )
}

pub(super) fn paths(taxonomia: Taxonomia) -> Value {
    let tag = format!("Admin {}", taxonomia.segment());
    json!({
        "/": {
            "get": authed_operation(&tag, "List ranked by name", None, vec![
                ("200", json_response("Entries", array_of("Termo")))
            ]),
            "post": authed_operation(&tag, "Create an entry", Some(schema_ref("TermForm")), vec![
                ("201", json_response("Created entry", schema_ref("Termo"))),
                ("422", error_response("Missing name"))
            ])
        },
        "/{id}": {
            "put": authed_operation(&tag, "Rename an entry", Some(schema_ref("TermForm")), vec![
                ("200", json_response("Updated entry", schema_ref("Termo"))),
                ("422", error_response("Missing name"))
            ]),
            "delete": authed_operation(&tag, "Delete an entry", None, vec![
                ("204", json!({ "description": "Deleted" }))
            ])
        }
    })
}

pub(super) fn schemas() -> Value {
    json!({
        "Termo": object(json!({
            "id": { "type": "integer" },
            "nome": { "type": "string" }
        }), &["id", "nome"]),
        "TermForm": object(json!({
            "nome": { "type": "string" }
        }), &["nome"])
    })
}

async fn list(
    State(state): State<AppState>,
    admin: AdminSession,
    Query(query): Query<ListQuery>,
    taxonomia: Taxonomia,
) -> Result<Json<Vec<Termo>>, AppError> {
    let termos = state.api.termos(taxonomia, admin.0.auth()).await?;
    let ranked = rank_by(
        &termos,
        query.term(),
        query.direction(SortDirection::Ascending),
        |termo| termo.nome.as_str(),
    );
    Ok(Json(ranked))
}

async fn create(
    State(state): State<AppState>,
    admin: AdminSession,
    Json(form): Json<TermForm>,
    taxonomia: Taxonomia,
) -> Result<(StatusCode, Json<Termo>), AppError> {
    let input = form.validate()?;
    let termo = state.api.criar_termo(taxonomia, &input, admin.token()).await?;
    tracing::info!(taxonomia = taxonomia.segment(), id = termo.id, "entry created");
    Ok((StatusCode::CREATED, Json(termo)))
}

async fn update(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<String>,
    Json(form): Json<TermForm>,
    taxonomia: Taxonomia,
) -> Result<Json<Termo>, AppError> {
    let id = parse_id(&id, &invalid_id(taxonomia))?;
    let input = form.validate()?;
    Ok(Json(state.api.atualizar_termo(taxonomia, id, &input, admin.token()).await?))
}

async fn remove(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<String>,
    taxonomia: Taxonomia,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, &invalid_id(taxonomia))?;
    state.api.remover_termo(taxonomia, id, admin.token()).await?;
    tracing::info!(taxonomia = taxonomia.segment(), id, "entry deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::admin::create_module;
    use crate::modules::testing::{call, get as get_json, mount_admin, state_for};
    use axum::http::Method;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, Router) {
        let server = MockServer::start().await;
        mount_admin(&server, "staff").await;
        let router = create_module(state_for(&server)).routes();
        (server, router)
    }

    #[tokio::test]
    async fn genres_rank_exact_then_prefix_then_substring() {
        let (server, router) = setup().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/generos/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "nome": "Drama Romance"},
                {"id": 2, "nome": "Romance Histórico"},
                {"id": 3, "nome": "Terror"},
                {"id": 4, "nome": "Romance"}
            ])))
            .mount(&server)
            .await;

        let (status, body) = get_json(
            &router,
            "/generos?search=romance&ordering=-nome",
            Some("staff"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<u64> = body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|t| t["id"].as_u64())
            .collect();
        assert_eq!(ids, [4, 2, 1]);
    }

    #[tokio::test]
    async fn authors_are_created_with_trimmed_names() {
        let (server, router) = setup().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/autores/"))
            .and(body_json(json!({"nome": "Clarice Lispector"})))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"id": 7, "nome": "Clarice Lispector"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = call(
            &router,
            Method::POST,
            "/autores",
            Some("staff"),
            Some(json!({"nome": "  Clarice Lispector "})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], 7);
    }

    #[tokio::test]
    async fn blank_names_are_refused() {
        let (_server, router) = setup().await;
        let (status, body) = call(
            &router,
            Method::PUT,
            "/categorias/3",
            Some("staff"),
            Some(json!({"nome": " "})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["message"], "Nome é obrigatório");
    }

    #[tokio::test]
    async fn deletes_answer_no_content() {
        let (server, router) = setup().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/categorias/3/"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let (status, _) = call(&router, Method::DELETE, "/categorias/3", Some("staff"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
