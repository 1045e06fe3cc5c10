use reqwest::Method;
use serde::Serialize;

use crate::api::NO_BODY;
use crate::client::{ApiClient, Auth};
use crate::error::Result;
use crate::listing::Listing;
use crate::models::{Cupom, CupomFiltro, CupomInput};

#[derive(Serialize)]
struct CodigoCupom<'a> {
    codigo: &'a str,
}

impl ApiClient {
    pub async fn cupons(&self, filtro: &CupomFiltro, token: &str) -> Result<Vec<Cupom>> {
        let listing: Listing<Cupom> =
            self.get("cupons/", &filtro.query(), Auth::Bearer(token)).await?;
        Ok(listing.into_results())
    }

    pub async fn criar_cupom(&self, input: &CupomInput, token: &str) -> Result<Cupom> {
        self.send(Method::POST, "cupons/", input, Auth::Bearer(token)).await
    }

    pub async fn atualizar_cupom(&self, id: u64, input: &CupomInput, token: &str) -> Result<Cupom> {
        self.send(Method::PUT, &format!("cupons/{id}/"), input, Auth::Bearer(token))
            .await
    }

    pub async fn remover_cupom(&self, id: u64, token: &str) -> Result<()> {
        self.send_discarding(Method::DELETE, &format!("cupons/{id}/"), NO_BODY, Auth::Bearer(token))
            .await
    }

    /// Looks a coupon up by code for the checkout estimate.
    pub async fn validar_cupom(&self, codigo: &str, token: &str) -> Result<Cupom> {
        self.send(
            Method::POST,
            "cupons/validar/",
            &CodigoCupom { codigo },
            Auth::Bearer(token),
        )
        .await
    }
}
