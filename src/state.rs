//! State shared by every request: the backend client and the third-party
//! lookups. Cloning is cheap; all clones share one connection pool.

use std::time::Duration;

use anyhow::Context;
use axum::extract::FromRef;
use elibros_client::{qr_code_url, ApiClient, CepLookup, ClientConfig};
use elibros_kernel::settings::Settings;

#[derive(Debug, Clone)]
pub struct QrSettings {
    pub base_url: String,
    pub size: u32,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub cep: CepLookup,
    pub qr: QrSettings,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api = ApiClient::new(&ClientConfig {
            base_url: settings.backend.base_url.clone(),
            timeout: Duration::from_millis(settings.backend.timeout_ms),
            user_agent: settings.backend.user_agent.clone(),
        })
        .with_context(|| format!("invalid backend url '{}'", settings.backend.base_url))?;

        let cep = CepLookup::new(api.http().clone(), settings.integrations.cep_lookup_url.clone());

        Ok(Self {
            api,
            cep,
            qr: QrSettings {
                base_url: settings.integrations.qr_code_url.clone(),
                size: settings.integrations.qr_code_size,
            },
        })
    }

    /// Image URL of the QR code a customer scans to pay `payload`.
    pub fn qr_url(&self, payload: &str) -> Option<String> {
        match qr_code_url(&self.qr.base_url, self.qr.size, payload) {
            Ok(url) => Some(url),
            Err(err) => {
                tracing::warn!(error = %err, "qr code url could not be built");
                None
            }
        }
    }
}

impl FromRef<AppState> for ApiClient {
    fn from_ref(state: &AppState) -> Self {
        state.api.clone()
    }
}
