use reqwest::Method;

use crate::client::{ApiClient, Auth};
use crate::error::Result;
use crate::models::{Perfil, PerfilUpdate};

impl ApiClient {
    pub async fn perfil(&self, token: &str) -> Result<Perfil> {
        self.get("clientes/perfil/", &[], Auth::Bearer(token)).await
    }

    pub async fn atualizar_perfil(&self, update: &PerfilUpdate, token: &str) -> Result<Perfil> {
        self.send(Method::PATCH, "clientes/perfil/", update, Auth::Bearer(token))
            .await
    }
}
