use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use elibros_authz::{is_admin, Session};
use elibros_client::models::{Credenciais, RecuperacaoSenha, Usuario};
use elibros_client::ApiError;
use elibros_http::{AppError, FieldErrors};
use elibros_kernel::openapi::{
    authed_operation, error_response, json_response, object, operation, request_body, schema_ref,
};
use elibros_kernel::{InitCtx, Module};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::state::AppState;
use crate::utils::is_valid_email;

const ADMIN_HOME: &str = "/admin";
const STORE_HOME: &str = "/";

/// Sign-in, sign-out, password recovery and the admin check.
pub struct AuthModule {
    state: AppState,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Option<Usuario>,
    pub is_admin: bool,
    pub redirect: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Me {
    pub is_admin: bool,
    pub redirect: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecoveryForm {
    #[serde(default)]
    pub email: String,
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "auth module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/login", post(login))
            .route("/logout", post(logout))
            .route("/recuperar-senha", post(recover_password))
            .route("/me", get(me))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let mut login_op = operation("Auth", "Sign in", vec![
            ("200", json_response("Session and landing page", schema_ref("LoginResponse"))),
            ("401", error_response("Wrong email or password")),
            ("403", error_response("Account disabled")),
            ("422", error_response("Missing email or password")),
        ]);
        login_op["requestBody"] = request_body(schema_ref("LoginForm"));

        let mut recovery_op = operation("Auth", "Send a password recovery email", vec![
            ("200", json_response("Email sent", json!({ "type": "object" }))),
            ("422", error_response("Missing or malformed email")),
        ]);
        recovery_op["requestBody"] = request_body(schema_ref("RecoveryForm"));

        Some(json!({
            "paths": {
                "/login": { "post": login_op },
                "/logout": {
                    "post": authed_operation("Auth", "Sign out", None, vec![
                        ("204", json!({ "description": "Session ended" }))
                    ])
                },
                "/recuperar-senha": { "post": recovery_op },
                "/me": {
                    "get": authed_operation("Auth", "Admin status of the caller", None, vec![
                        ("200", json_response("Admin status", schema_ref("Me")))
                    ])
                }
            },
            "components": {
                "schemas": {
                    "LoginForm": object(json!({
                        "email": { "type": "string" },
                        "password": { "type": "string" }
                    }), &["email", "password"]),
                    "LoginResponse": object(json!({
                        "token": { "type": "string" },
                        "user": { "type": "object", "nullable": true },
                        "is_admin": { "type": "boolean" },
                        "redirect": { "type": "string" }
                    }), &["token", "is_admin", "redirect"]),
                    "Me": object(json!({
                        "is_admin": { "type": "boolean" },
                        "redirect": { "type": "string" }
                    }), &["is_admin", "redirect"]),
                    "RecoveryForm": object(json!({
                        "email": { "type": "string" }
                    }), &["email"])
                }
            }
        }))
    }
}

fn landing_page(admin: bool) -> &'static str {
    if admin {
        ADMIN_HOME
    } else {
        STORE_HOME
    }
}

/// Backend login failures reworded for the sign-in form.
fn login_error(err: ApiError) -> AppError {
    let message = err.message();
    if message.contains("Credenciais inválidas") {
        AppError::unauthorized("Email ou senha incorretos")
    } else if message.contains("Perfil desabilitado") {
        AppError::forbidden("Sua conta foi desabilitada. Entre em contato com o suporte.")
    } else {
        AppError::from(err)
    }
}

async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = form.email.trim();

    FieldErrors::new()
        .require("email", email, "Email é obrigatório")
        .require("password", &form.password, "Senha é obrigatória")
        .finish()?;

    let credenciais = Credenciais {
        email: email.to_string(),
        password: form.password,
    };
    let sessao = state.api.login(&credenciais).await.map_err(login_error)?;

    let admin = is_admin(&state.api, &sessao.token, sessao.user.as_ref()).await;
    tracing::info!(is_admin = admin, "user signed in");

    Ok(Json(LoginResponse {
        token: sessao.token,
        user: sessao.user,
        is_admin: admin,
        redirect: landing_page(admin),
    }))
}

async fn logout(State(state): State<AppState>, session: Session) -> Result<StatusCode, AppError> {
    state.api.logout(session.token()).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn recover_password(
    State(state): State<AppState>,
    Json(form): Json<RecoveryForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    let email = form.email.trim();
    if email.is_empty() {
        return Err(AppError::invalid_field("email", "Email é obrigatório"));
    }
    if !is_valid_email(email) {
        return Err(AppError::invalid_field("email", "Email inválido"));
    }

    state
        .api
        .recuperar_senha(&RecuperacaoSenha {
            email: email.to_string(),
        })
        .await
        .map_err(|err| {
            tracing::warn!(error = %err, "password recovery request failed");
            AppError::upstream(
                "Erro ao enviar email de recuperação. Tente novamente.",
                err.is_retryable(),
            )
        })?;

    Ok(Json(json!({
        "message": "Enviamos as instruções de recuperação para o seu email."
    })))
}

async fn me(State(state): State<AppState>, session: Session) -> Json<Me> {
    let admin = is_admin(&state.api, session.token(), None).await;
    Json(Me {
        is_admin: admin,
        redirect: landing_page(admin),
    })
}

pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(AuthModule { state })
}
