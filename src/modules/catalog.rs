//! Public catalog: book list, book page with reviews, and shipping quotes.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use elibros_authz::{auth_of, Session};
use elibros_client::models::{
    Avaliacao, FreteGenericoRequest, FreteLivroRequest, Livro, LivroFiltro, NovaAvaliacao,
    ResultadoFrete,
};
use elibros_client::{Auth, Listing};
use elibros_http::AppError;
use elibros_kernel::openapi::{
    array_of, authed_operation, error_response, json_response, object, operation, request_body,
    schema_ref,
};
use elibros_kernel::{InitCtx, Module};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::state::AppState;
use crate::utils::{parse_cep, parse_id};

const INVALID_BOOK_ID: &str = "ID do livro inválido";
const INVALID_REVIEW_ID: &str = "ID da avaliação inválido";

/// Review text bounds, in characters after trimming.
const REVIEW_MIN_CHARS: usize = 10;
const REVIEW_MAX_CHARS: usize = 1000;

/// Quantity cap when the backend does not report stock.
const UNKNOWN_STOCK_CAP: u32 = 99;

pub struct CatalogModule {
    state: AppState,
}

#[derive(Debug, Serialize)]
pub struct LivroDetalhe {
    pub livro: Livro,
    pub avaliacoes: Vec<Avaliacao>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub texto: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookShippingForm {
    #[serde(default)]
    pub cep: String,
    #[serde(default)]
    pub quantidade: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShippingForm {
    #[serde(default)]
    pub cep: String,
    #[serde(default)]
    pub quantidade_livros: Option<u32>,
    #[serde(default)]
    pub valor_total: Option<f64>,
}

#[async_trait]
impl Module for CatalogModule {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/livros", get(list_books))
            .route("/livros/{id}", get(book_detail))
            .route("/livros/{id}/avaliacoes", get(list_reviews).post(create_review))
            .route(
                "/livros/{id}/avaliacoes/{avaliacao_id}/curtida",
                post(like_review).delete(unlike_review),
            )
            .route("/livros/{id}/frete", post(book_shipping))
            .route("/frete", post(shipping_quote))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let mut book_shipping_op = operation("Catalog", "Shipping quote for one book", vec![
            ("200", json_response("Shipping options", schema_ref("ResultadoFrete"))),
            ("422", error_response("Invalid CEP")),
        ]);
        book_shipping_op["requestBody"] = request_body(schema_ref("BookShippingForm"));

        let mut shipping_op = operation("Catalog", "Generic shipping quote", vec![
            ("200", json_response("Shipping options", schema_ref("ResultadoFrete"))),
            ("422", error_response("Invalid CEP")),
        ]);
        shipping_op["requestBody"] = request_body(schema_ref("ShippingForm"));

        Some(json!({
            "paths": {
                "/livros": {
                    "get": operation("Catalog", "Catalog page", vec![
                        ("200", json_response("Books", json!({ "type": "object" })))
                    ])
                },
                "/livros/{id}": {
                    "get": operation("Catalog", "Book with its reviews", vec![
                        ("200", json_response("Book detail", schema_ref("LivroDetalhe"))),
                        ("400", error_response("Non-numeric id")),
                        ("404", error_response("Unknown book"))
                    ])
                },
                "/livros/{id}/avaliacoes": {
                    "get": operation("Catalog", "Reviews of a book", vec![
                        ("200", json_response("Reviews", array_of("Avaliacao")))
                    ]),
                    "post": authed_operation(
                        "Catalog",
                        "Review a book",
                        Some(schema_ref("ReviewForm")),
                        vec![
                            ("200", json_response("Reviews after posting", array_of("Avaliacao"))),
                            ("422", error_response("Text too short or too long"))
                        ],
                    )
                },
                "/livros/{id}/avaliacoes/{avaliacao_id}/curtida": {
                    "post": authed_operation("Catalog", "Like a review", None, vec![
                        ("200", json_response("Reviews", array_of("Avaliacao")))
                    ]),
                    "delete": authed_operation("Catalog", "Remove a like", None, vec![
                        ("200", json_response("Reviews", array_of("Avaliacao")))
                    ])
                },
                "/livros/{id}/frete": { "post": book_shipping_op },
                "/frete": { "post": shipping_op }
            },
            "components": {
                "schemas": {
                    "Avaliacao": object(json!({
                        "id": { "type": "integer" },
                        "usuario_nome": { "type": "string" },
                        "texto": { "type": "string" },
                        "data_publicacao": { "type": "string" },
                        "curtidas": { "type": "integer" },
                        "usuario_curtiu": { "type": "boolean" },
                        "pode_curtir": { "type": "boolean" }
                    }), &["id", "texto"]),
                    "LivroDetalhe": object(json!({
                        "livro": { "type": "object" },
                        "avaliacoes": array_of("Avaliacao")
                    }), &["livro", "avaliacoes"]),
                    "ReviewForm": object(json!({
                        "texto": {
                            "type": "string",
                            "minLength": REVIEW_MIN_CHARS,
                            "maxLength": REVIEW_MAX_CHARS
                        }
                    }), &["texto"]),
                    "BookShippingForm": object(json!({
                        "cep": { "type": "string" },
                        "quantidade": { "type": "integer", "minimum": 1 }
                    }), &["cep"]),
                    "ShippingForm": object(json!({
                        "cep": { "type": "string" },
                        "quantidade_livros": { "type": "integer", "minimum": 1 },
                        "valor_total": { "type": "number" }
                    }), &["cep"]),
                    "ResultadoFrete": object(json!({
                        "cep_destino": { "type": "string" },
                        "regiao": { "type": "string" },
                        "opcoes": { "type": "array", "items": { "type": "object" } }
                    }), &["cep_destino", "opcoes"])
                }
            }
        }))
    }
}

async fn list_books(
    State(state): State<AppState>,
    session: Option<Session>,
    Query(filtro): Query<LivroFiltro>,
) -> Result<Json<Listing<Livro>>, AppError> {
    let livros = state.api.livros(&filtro, auth_of(&session)).await?;
    Ok(Json(livros))
}

async fn book_detail(
    State(state): State<AppState>,
    session: Option<Session>,
    Path(id): Path<String>,
) -> Result<Json<LivroDetalhe>, AppError> {
    let id = parse_id(&id, INVALID_BOOK_ID)?;
    let auth = auth_of(&session);

    let (livro, avaliacoes) =
        tokio::join!(state.api.livro(id, auth), state.api.avaliacoes(id, auth));

    let livro = livro?;
    let avaliacoes = avaliacoes.unwrap_or_else(|err| {
        tracing::warn!(livro_id = id, error = %err, "reviews unavailable, showing none");
        Vec::new()
    });

    Ok(Json(LivroDetalhe { livro, avaliacoes }))
}

async fn list_reviews(
    State(state): State<AppState>,
    session: Option<Session>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Avaliacao>>, AppError> {
    let id = parse_id(&id, INVALID_BOOK_ID)?;
    Ok(Json(state.api.avaliacoes(id, auth_of(&session)).await?))
}

/// Trimmed review text within the allowed length.
fn review_text(raw: &str) -> Result<String, AppError> {
    let texto = raw.trim();
    let chars = texto.chars().count();
    if chars < REVIEW_MIN_CHARS {
        return Err(AppError::invalid_field(
            "texto",
            format!("A avaliação deve ter pelo menos {REVIEW_MIN_CHARS} caracteres"),
        ));
    }
    if chars > REVIEW_MAX_CHARS {
        return Err(AppError::invalid_field(
            "texto",
            format!("A avaliação deve ter no máximo {REVIEW_MAX_CHARS} caracteres"),
        ));
    }
    Ok(texto.to_string())
}

async fn create_review(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(form): Json<ReviewForm>,
) -> Result<Json<Vec<Avaliacao>>, AppError> {
    let id = parse_id(&id, INVALID_BOOK_ID)?;
    let texto = review_text(&form.texto)?;

    state
        .api
        .criar_avaliacao(id, &NovaAvaliacao { texto }, session.token())
        .await?;
    tracing::info!(livro_id = id, "review posted");

    Ok(Json(state.api.avaliacoes(id, session.auth()).await?))
}

async fn like_review(
    State(state): State<AppState>,
    session: Session,
    Path((id, avaliacao_id)): Path<(String, String)>,
) -> Result<Json<Vec<Avaliacao>>, AppError> {
    let id = parse_id(&id, INVALID_BOOK_ID)?;
    let avaliacao_id = parse_id(&avaliacao_id, INVALID_REVIEW_ID)?;

    state.api.curtir_avaliacao(avaliacao_id, session.token()).await?;
    Ok(Json(state.api.avaliacoes(id, session.auth()).await?))
}

async fn unlike_review(
    State(state): State<AppState>,
    session: Session,
    Path((id, avaliacao_id)): Path<(String, String)>,
) -> Result<Json<Vec<Avaliacao>>, AppError> {
    let id = parse_id(&id, INVALID_BOOK_ID)?;
    let avaliacao_id = parse_id(&avaliacao_id, INVALID_REVIEW_ID)?;

    state.api.remover_curtida(avaliacao_id, session.token()).await?;
    Ok(Json(state.api.avaliacoes(id, session.auth()).await?))
}

/// Requested quantity kept within `1..=stock`.
fn clamp_quantity(requested: Option<u32>, stock: Option<u32>) -> u32 {
    let cap = stock.unwrap_or(UNKNOWN_STOCK_CAP).max(1);
    requested.unwrap_or(1).clamp(1, cap)
}

async fn book_shipping(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<BookShippingForm>,
) -> Result<Json<ResultadoFrete>, AppError> {
    let id = parse_id(&id, INVALID_BOOK_ID)?;
    let cep = parse_cep(&form.cep)?;

    let livro = state.api.livro(id, Auth::Anonymous).await?;
    let quantidade = clamp_quantity(form.quantidade, livro.quantidade);

    let request = FreteLivroRequest {
        cep,
        quantidade: Some(quantidade),
    };
    Ok(Json(state.api.frete_livro(id, &request).await?))
}

async fn shipping_quote(
    State(state): State<AppState>,
    Json(form): Json<ShippingForm>,
) -> Result<Json<ResultadoFrete>, AppError> {
    let request = FreteGenericoRequest {
        cep: parse_cep(&form.cep)?,
        quantidade_livros: form.quantidade_livros.unwrap_or(1).max(1),
        valor_total: form.valor_total,
    };
    Ok(Json(state.api.frete_generico(&request).await?))
}

pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(CatalogModule { state })
}
