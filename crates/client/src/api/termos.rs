use reqwest::Method;

use crate::api::NO_BODY;
use crate::client::{ApiClient, Auth};
use crate::error::Result;
use crate::listing::Listing;
use crate::models::{Taxonomia, Termo, TermoInput};

impl ApiClient {
    pub async fn termos(&self, taxonomia: Taxonomia, auth: Auth<'_>) -> Result<Vec<Termo>> {
        let listing: Listing<Termo> = self.get(taxonomia.path(), &[], auth).await?;
        Ok(listing.into_results())
    }

    pub async fn criar_termo(
        &self,
        taxonomia: Taxonomia,
        input: &TermoInput,
        token: &str,
    ) -> Result<Termo> {
        self.send(Method::POST, taxonomia.path(), input, Auth::Bearer(token))
            .await
    }

    pub async fn atualizar_termo(
        &self,
        taxonomia: Taxonomia,
        id: u64,
        input: &TermoInput,
        token: &str,
    ) -> Result<Termo> {
        let path = format!("{}{id}/", taxonomia.path());
        self.send(Method::PUT, &path, input, Auth::Bearer(token)).await
    }

    pub async fn remover_termo(&self, taxonomia: Taxonomia, id: u64, token: &str) -> Result<()> {
        let path = format!("{}{id}/", taxonomia.path());
        self.send_discarding(Method::DELETE, &path, NO_BODY, Auth::Bearer(token))
            .await
    }
}
