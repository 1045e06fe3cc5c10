use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use elibros_client::models::Usuario;
use elibros_client::ApiClient;
use elibros_http::AppError;

use crate::session::Session;

/// Whether the bearer of `token` may use the admin console.
///
/// When `known` carries both staff flags explicitly false the answer is no
/// without a network call. Otherwise `/admin/user_info/` decides; any
/// failure there (ordinary customers get a 403) counts as "not admin".
pub async fn is_admin(api: &ApiClient, token: &str, known: Option<&Usuario>) -> bool {
    if known.is_some_and(Usuario::known_non_admin) {
        return false;
    }

    match api.admin_user_info(token).await {
        Ok(info) => info.is_admin(),
        Err(err) => {
            tracing::warn!(
                status = ?err.status(),
                error = %err,
                "admin check failed; treating caller as non-admin"
            );
            false
        }
    }
}

/// A session that passed the admin check. Rejects with 401 without a bearer
/// and 403 when the backend does not recognise an admin.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

impl AdminSession {
    pub fn token(&self) -> &str {
        self.0.token()
    }
}

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
    ApiClient: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = <Session as FromRequestParts<S>>::from_request_parts(parts, state).await?;
        let api = ApiClient::from_ref(state);

        if is_admin(&api, session.token(), None).await {
            Ok(AdminSession(session))
        } else {
            Err(AppError::forbidden("Acesso restrito a administradores"))
        }
    }
}
