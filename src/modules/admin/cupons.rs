use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use elibros_authz::AdminSession;
use elibros_client::models::{Cupom, CupomFiltro, CupomInput, CupomStatus, TipoValor};
use elibros_http::{AppError, FieldErrors};
use elibros_kernel::openapi::{
    array_of, authed_operation, error_response, json_response, object, schema_ref,
};
use elibros_search::{rank_by, SortDirection};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use super::{amount, is_blank, ListQuery};
use crate::state::AppState;
use crate::utils::parse_id;

const INVALID_COUPON_ID: &str = "ID do cupom inválido";

#[derive(Debug, Default, Deserialize)]
pub struct CouponQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub ordering: Option<String>,
    #[serde(default)]
    pub ativo: Option<bool>,
}

/// A coupon with its badge as of now.
#[derive(Debug, Serialize)]
pub struct CupomRow {
    #[serde(flatten)]
    pub cupom: Cupom,
    pub status: CupomStatus,
}

#[derive(Debug, Deserialize)]
pub struct CouponForm {
    #[serde(default)]
    pub codigo: String,
    #[serde(default)]
    pub valor: Option<Value>,
    #[serde(default = "percentual")]
    pub tipo_valor: TipoValor,
    #[serde(default = "active")]
    pub ativo: bool,
    #[serde(default)]
    pub data_inicio: String,
    #[serde(default)]
    pub data_fim: String,
}

fn percentual() -> TipoValor {
    TipoValor::Percentual
}

fn active() -> bool {
    true
}

/// `YYYY-MM-DD`, also taking the date part of a timestamp the form echoed back.
fn form_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    let date = raw.split_once('T').map_or(raw, |(date, _)| date);
    Date::parse(date, format_description!("[year]-[month]-[day]")).ok()
}

impl CouponForm {
    fn validate(self) -> Result<CupomInput, AppError> {
        let codigo = self.codigo.trim().to_string();
        let valor = amount(self.valor.as_ref());
        let inicio = form_date(&self.data_inicio);
        let fim = form_date(&self.data_fim);

        let mut errors = FieldErrors::new();
        errors.require("codigo", &codigo, "Código é obrigatório");
        if is_blank(self.valor.as_ref()) {
            errors.check(false, "valor", "Valor é obrigatório");
        } else {
            errors.check(
                valor.is_some_and(|v| v > 0.0),
                "valor",
                "O valor deve ser maior que zero",
            );
        }
        errors
            .require("data_inicio", &self.data_inicio, "Data de início é obrigatória")
            .require("data_fim", &self.data_fim, "Data de fim é obrigatória");
        if !self.data_inicio.trim().is_empty() {
            errors.check(inicio.is_some(), "data_inicio", "Data de início inválida");
        }
        if !self.data_fim.trim().is_empty() {
            errors.check(fim.is_some(), "data_fim", "Data de fim inválida");
        }
        if let (Some(inicio), Some(fim)) = (inicio, fim) {
            errors.check(
                fim >= inicio,
                "data_fim",
                "A data de fim deve ser igual ou posterior à data de início",
            );
        }
        errors.finish()?;

        match (valor, inicio, fim) {
            (Some(valor), Some(inicio), Some(fim)) => Ok(CupomInput {
                codigo,
                valor,
                tipo_valor: self.tipo_valor,
                ativo: self.ativo,
                data_inicio: format!("{inicio}T00:00:00Z"),
                data_fim: format!("{fim}T23:59:59Z"),
            }),
            _ => Err(AppError::bad_request("Cupom incompleto")),
        }
    }
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", put(update).delete(remove))
}

pub(super) fn paths() -> Value {
    json!({
        "/": {
            "get": authed_operation("Admin coupons", "Coupons ranked by code", None, vec![
                ("200", json_response("Coupons", array_of("CupomRow")))
            ]),
            "post": authed_operation(
                "Admin coupons",
                "Create a coupon",
                Some(schema_ref("CouponForm")),
                vec![
                    ("201", json_response("Created coupon", schema_ref("CupomRow"))),
                    ("422", error_response("Invalid form"))
                ],
            )
        },
        "/{id}": {
            "put": authed_operation(
                "Admin coupons",
                "Replace a coupon",
                Some(schema_ref("CouponForm")),
                vec![
                    ("200", json_response("Updated coupon", schema_ref("CupomRow"))),
                    ("422", error_response("Invalid form"))
                ],
            ),
            "delete": authed_operation("Admin coupons", "Delete a coupon", None, vec![
                ("204", json!({ "description": "Deleted" }))
            ])
        }
    })
}

pub(super) fn schemas() -> Value {
    json!({
        "CupomRow": object(json!({
            "id": { "type": "integer" },
            "codigo": { "type": "string" },
            "valor": { "type": "string" },
            "tipo_valor": { "type": "string", "enum": ["1", "2"] },
            "ativo": { "type": "boolean" },
            "data_inicio": { "type": "string" },
            "data_fim": { "type": "string" },
            "status": { "type": "string", "enum": ["inativo", "expirado", "ativo", "agendado"] }
        }), &["id", "codigo", "valor", "tipo_valor", "status"]),
        "CouponForm": object(json!({
            "codigo": { "type": "string" },
            "valor": { "type": "string" },
            "tipo_valor": { "type": "string", "enum": ["1", "2"] },
            "ativo": { "type": "boolean" },
            "data_inicio": { "type": "string", "format": "date" },
            "data_fim": { "type": "string", "format": "date" }
        }), &["codigo", "valor", "data_inicio", "data_fim"])
    })
}

fn row(cupom: Cupom, now: OffsetDateTime) -> CupomRow {
    CupomRow {
        status: cupom.status_at(now),
        cupom,
    }
}

async fn list(
    State(state): State<AppState>,
    admin: AdminSession,
    Query(query): Query<CouponQuery>,
) -> Result<Json<Vec<CupomRow>>, AppError> {
    let filtro = CupomFiltro { ativo: query.ativo };
    let cupons = state.api.cupons(&filtro, admin.token()).await?;

    let list = ListQuery {
        search: query.search,
        ordering: query.ordering,
    };
    let ranked = rank_by(
        &cupons,
        list.term(),
        list.direction(SortDirection::Ascending),
        |cupom| cupom.codigo.as_str(),
    );
    let now = OffsetDateTime::now_utc();
    Ok(Json(ranked.into_iter().map(|cupom| row(cupom, now)).collect()))
}

async fn create(
    State(state): State<AppState>,
    admin: AdminSession,
    Json(form): Json<CouponForm>,
) -> Result<(StatusCode, Json<CupomRow>), AppError> {
    let input = form.validate()?;
    let cupom = state.api.criar_cupom(&input, admin.token()).await?;
    tracing::info!(cupom_id = cupom.id, codigo = %cupom.codigo, "coupon created");
    Ok((StatusCode::CREATED, Json(row(cupom, OffsetDateTime::now_utc()))))
}

async fn update(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<String>,
    Json(form): Json<CouponForm>,
) -> Result<Json<CupomRow>, AppError> {
    let id = parse_id(&id, INVALID_COUPON_ID)?;
    let input = form.validate()?;
    let cupom = state.api.atualizar_cupom(id, &input, admin.token()).await?;
    Ok(Json(row(cupom, OffsetDateTime::now_utc())))
}

async fn remove(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, INVALID_COUPON_ID)?;
    state.api.remover_cupom(id, admin.token()).await?;
    tracing::info!(cupom_id = id, "coupon deleted");
    Ok(StatusCode::NO_CONTENT)
}
