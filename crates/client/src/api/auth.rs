use reqwest::Method;

use crate::api::NO_BODY;
use crate::client::{ApiClient, Auth};
use crate::error::Result;
use crate::models::{AdminStats, AdminUserInfo, Credenciais, RecuperacaoSenha, Sessao};

impl ApiClient {
    pub async fn login(&self, credenciais: &Credenciais) -> Result<Sessao> {
        self.send(Method::POST, "auth/login/", credenciais, Auth::Anonymous).await
    }

    pub async fn logout(&self, token: &str) -> Result<()> {
        self.send_discarding(Method::POST, "auth/logout/", NO_BODY, Auth::Bearer(token))
            .await
    }

    pub async fn recuperar_senha(&self, pedido: &RecuperacaoSenha) -> Result<()> {
        self.send_discarding(Method::POST, "auth/recuperar-senha/", Some(pedido), Auth::Anonymous)
            .await
    }

    /// Staff flags of the bearer. Ordinary customers get a 403 here.
    pub async fn admin_user_info(&self, token: &str) -> Result<AdminUserInfo> {
        self.get("admin/user_info/", &[], Auth::Bearer(token)).await
    }

    pub async fn admin_stats(&self, token: &str) -> Result<AdminStats> {
        self.get("admin/dashboard_stats/", &[], Auth::Bearer(token)).await
    }
}
