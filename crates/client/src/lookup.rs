//! Third-party services the storefront consumes directly: ViaCEP address
//! lookup and QR-code image URLs.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cep::Cep;
use crate::error::{ApiError, Result};

/// Address suggested by ViaCEP for a postal code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnderecoSugerido {
    pub cep: String,
    pub rua: String,
    pub complemento: String,
    pub bairro: String,
    pub cidade: String,
    pub uf: String,
}

#[derive(Deserialize)]
struct ViaCepResposta {
    #[serde(default)]
    cep: String,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    complemento: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
    #[serde(default)]
    erro: Value,
}

impl ViaCepResposta {
    // ViaCEP has answered both `true` and `"true"` for unknown codes.
    fn not_found(&self) -> bool {
        match &self.erro {
            Value::Bool(flag) => *flag,
            Value::String(text) => text.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CepLookup {
    http: reqwest::Client,
    base_url: String,
}

impl CepLookup {
    /// `base_url` is the service root, e.g. `https://viacep.com.br/ws`.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Looks `cep` up. `Ok(None)` means the code is well formed but unknown.
    pub async fn lookup(&self, cep: &Cep) -> Result<Option<EnderecoSugerido>> {
        let url = format!("{}/{}/json/", self.base_url, cep.digits());
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), &body));
        }

        let resposta: ViaCepResposta = response.json().await?;
        if resposta.not_found() {
            tracing::debug!(cep = cep.digits(), "cep not found");
            return Ok(None);
        }

        Ok(Some(EnderecoSugerido {
            cep: if resposta.cep.is_empty() {
                cep.formatted()
            } else {
                resposta.cep
            },
            rua: resposta.logradouro,
            complemento: resposta.complemento,
            bairro: resposta.bairro,
            cidade: resposta.localidade,
            uf: resposta.uf,
        }))
    }
}

/// URL of a square QR-code image encoding `data`.
pub fn qr_code_url(base: &str, size: u32, data: &str) -> Result<String> {
    let mut url = Url::parse(base).map_err(|e| ApiError::Url {
        message: format!("{base}: {e}"),
    })?;
    url.query_pairs_mut()
        .append_pair("size", &format!("{size}x{size}"))
        .append_pair("data", data);
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qr_url_encodes_payload() {
        let url = qr_code_url(
            "https://api.qrserver.com/v1/create-qr-code/",
            200,
            "Pagamento Pix R$ 114,20",
        )
        .unwrap();
        assert_eq!(
            url,
            "https://api.qrserver.com/v1/create-qr-code/?size=200x200&data=Pagamento+Pix+R%24+114%2C20"
        );
    }

    #[test]
    fn erro_flag_accepts_both_shapes() {
        let bool_flag: ViaCepResposta = serde_json::from_str(r#"{"erro": true}"#).unwrap();
        let text_flag: ViaCepResposta = serde_json::from_str(r#"{"erro": "true"}"#).unwrap();
        let found: ViaCepResposta = serde_json::from_str(r#"{"cep": "01310-100"}"#).unwrap();
        assert!(bool_flag.not_found());
        assert!(text_flag.not_found());
        assert!(!found.not_found());
    }
}
