use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use elibros_authz::Session;
use elibros_client::models::{DadosUsuario, Endereco, Gender, Perfil, PerfilUpdate};
use elibros_client::{Cep, EnderecoSugerido};
use elibros_http::AppError;
use elibros_kernel::openapi::{
    authed_operation, error_response, json_response, object, operation, schema_ref,
};
use elibros_kernel::{InitCtx, Module};
use serde::Deserialize;
use serde_json::json;

use crate::state::AppState;
use crate::utils::{is_valid_email, non_blank, UFS};

/// Customer profile and saved delivery address.
pub struct ProfileModule {
    state: AppState,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub genero: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default, alias = "CPF")]
    pub cpf: Option<String>,
    #[serde(default)]
    pub data_nascimento: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddressForm {
    #[serde(default)]
    pub cep: String,
    #[serde(default)]
    pub rua: String,
    #[serde(default)]
    pub numero: String,
    #[serde(default)]
    pub complemento: Option<String>,
    #[serde(default)]
    pub bairro: String,
    #[serde(default)]
    pub cidade: String,
    #[serde(default)]
    pub uf: String,
}

impl ProfileForm {
    fn validate(self) -> Result<DadosUsuario, AppError> {
        let nome = self.nome.trim();
        if nome.is_empty() {
            return Err(AppError::invalid_field("nome", "Nome é obrigatório"));
        }

        let genero = match non_blank(self.genero) {
            None => Gender::default(),
            Some(code) => Gender::from_code(&code)
                .ok_or_else(|| AppError::invalid_field("genero", "Selecione um gênero válido"))?,
        };

        let email = non_blank(self.email);
        if email.as_deref().is_some_and(|email| !is_valid_email(email)) {
            return Err(AppError::invalid_field("email", "Email inválido"));
        }

        Ok(DadosUsuario {
            nome: nome.to_string(),
            genero,
            email,
            telefone: non_blank(self.telefone),
            cpf: non_blank(self.cpf),
            data_nascimento: non_blank(self.data_nascimento),
        })
    }
}

impl AddressForm {
    /// Checks fields in form order and reports the first failure only.
    fn validate(self) -> Result<Endereco, AppError> {
        let required = [
            ("cep", self.cep.as_str(), "CEP é obrigatório"),
            ("rua", self.rua.as_str(), "Rua é obrigatória"),
            ("numero", self.numero.as_str(), "Número é obrigatório"),
            ("bairro", self.bairro.as_str(), "Bairro é obrigatório"),
            ("cidade", self.cidade.as_str(), "Cidade é obrigatória"),
            ("uf", self.uf.as_str(), "Estado é obrigatório"),
        ];
        if let Some((field, _, message)) =
            required.iter().find(|(_, value, _)| value.trim().is_empty())
        {
            return Err(AppError::invalid_field(field, *message));
        }

        let cep = Cep::parse(&self.cep)
            .map_err(|_| AppError::invalid_field("cep", "Digite um CEP válido com 8 dígitos"))?;
        let uf = self.uf.trim().to_uppercase();
        if !UFS.contains(&uf.as_str()) {
            return Err(AppError::invalid_field("uf", "Selecione um estado válido"));
        }

        Ok(Endereco {
            id: None,
            cep: cep.digits().to_string(),
            rua: self.rua.trim().to_string(),
            numero: self.numero.trim().to_string(),
            complemento: non_blank(self.complemento),
            bairro: self.bairro.trim().to_string(),
            cidade: self.cidade.trim().to_string(),
            uf,
        })
    }
}

#[async_trait]
impl Module for ProfileModule {
    fn name(&self) -> &'static str {
        "profile"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            cep_lookup_url = %ctx.settings.integrations.cep_lookup_url,
            "profile module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(show_profile).patch(update_profile))
            .route("/endereco", put(update_address))
            .route("/cep/{cep}", get(lookup_cep))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let perfil = || json_response("Profile", schema_ref("Perfil"));
        Some(json!({
            "paths": {
                "/": {
                    "get": authed_operation("Profile", "Show the profile", None, vec![
                        ("200", perfil())
                    ]),
                    "patch": authed_operation(
                        "Profile",
                        "Update personal data",
                        Some(schema_ref("ProfileForm")),
                        vec![
                            ("200", perfil()),
                            ("422", error_response("Missing name or invalid gender"))
                        ],
                    )
                },
                "/endereco": {
                    "put": authed_operation(
                        "Profile",
                        "Replace the delivery address",
                        Some(schema_ref("AddressForm")),
                        vec![
                            ("200", perfil()),
                            ("422", error_response("First invalid address field"))
                        ],
                    )
                },
                "/cep/{cep}": {
                    "get": operation("Profile", "Address suggested for a CEP", vec![
                        ("200", json_response("Suggested address", schema_ref("EnderecoSugerido"))),
                        ("404", error_response("Unknown CEP")),
                        ("422", error_response("Malformed CEP"))
                    ])
                }
            },
            "components": {
                "schemas": {
                    "Perfil": object(json!({
                        "nome": { "type": "string" },
                        "email": { "type": "string" },
                        "telefone": { "type": "string", "nullable": true },
                        "CPF": { "type": "string", "nullable": true },
                        "genero": { "type": "string", "enum": ["M", "F", "NB", "PND", "NI"] },
                        "data_nascimento": { "type": "string", "nullable": true },
                        "endereco": { "type": "object", "nullable": true }
                    }), &["nome", "email", "genero"]),
                    "ProfileForm": object(json!({
                        "nome": { "type": "string" },
                        "genero": { "type": "string", "enum": ["M", "F", "NB", "PND", "NI"] },
                        "email": { "type": "string" },
                        "telefone": { "type": "string" },
                        "cpf": { "type": "string" },
                        "data_nascimento": { "type": "string" }
                    }), &["nome"]),
                    "AddressForm": object(json!({
                        "cep": { "type": "string" },
                        "rua": { "type": "string" },
                        "numero": { "type": "string" },
                        "complemento": { "type": "string" },
                        "bairro": { "type": "string" },
                        "cidade": { "type": "string" },
                        "uf": { "type": "string" }
                    }), &["cep", "rua", "numero", "bairro", "cidade", "uf"]),
                    "EnderecoSugerido": object(json!({
                        "cep": { "type": "string" },
                        "rua": { "type": "string" },
                        "complemento": { "type": "string" },
                        "bairro": { "type": "string" },
                        "cidade": { "type": "string" },
                        "uf": { "type": "string" }
                    }), &["cep", "rua", "bairro", "cidade", "uf"])
                }
            }
        }))
    }
}

async fn show_profile(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Perfil>, AppError> {
    Ok(Json(state.api.perfil(session.token()).await?))
}

async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<ProfileForm>,
) -> Result<Json<Perfil>, AppError> {
    let update = PerfilUpdate {
        user: Some(form.validate()?),
        endereco: None,
    };
    Ok(Json(state.api.atualizar_perfil(&update, session.token()).await?))
}

async fn update_address(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<AddressForm>,
) -> Result<Json<Perfil>, AppError> {
    let update = PerfilUpdate {
        user: None,
        endereco: Some(form.validate()?),
    };
    let perfil = state.api.atualizar_perfil(&update, session.token()).await?;
    tracing::info!("delivery address updated");
    Ok(Json(perfil))
}

async fn lookup_cep(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<EnderecoSugerido>, AppError> {
    let cep = Cep::parse(&raw)
        .map_err(|_| AppError::invalid_field("cep", "CEP inválido. Digite 8 dígitos."))?;

    match state.cep.lookup(&cep).await {
        Ok(Some(endereco)) => Ok(Json(endereco)),
        Ok(None) => Err(AppError::not_found("CEP não encontrado")),
        Err(err) => {
            tracing::warn!(cep = cep.digits(), error = %err, "cep lookup failed");
            Err(AppError::upstream("Não foi possível consultar o CEP. Tente novamente.", true))
        }
    }
}

pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(ProfileModule { state })
}
