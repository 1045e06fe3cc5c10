use reqwest::Method;

use crate::api::NO_BODY;
use crate::client::{ApiClient, Auth};
use crate::error::Result;
use crate::listing::Listing;
use crate::models::{Avaliacao, Livro, LivroFiltro, LivroInput, NovaAvaliacao};

impl ApiClient {
    pub async fn livros(&self, filtro: &LivroFiltro, auth: Auth<'_>) -> Result<Listing<Livro>> {
        self.get("livros/", &filtro.query(), auth).await
    }

    pub async fn livro(&self, id: u64, auth: Auth<'_>) -> Result<Livro> {
        self.get(&format!("livros/{id}/"), &[], auth).await
    }

    pub async fn criar_livro(&self, input: &LivroInput, token: &str) -> Result<Livro> {
        self.send(Method::POST, "livros/", input, Auth::Bearer(token)).await
    }

    pub async fn atualizar_livro(&self, id: u64, input: &LivroInput, token: &str) -> Result<Livro> {
        self.send(Method::PUT, &format!("livros/{id}/"), input, Auth::Bearer(token))
            .await
    }

    pub async fn remover_livro(&self, id: u64, token: &str) -> Result<()> {
        self.send_discarding(Method::DELETE, &format!("livros/{id}/"), NO_BODY, Auth::Bearer(token))
            .await
    }

    /// Reviews of a book. With a bearer, `usuario_curtiu` and `pode_curtir`
    /// reflect that user.
    pub async fn avaliacoes(&self, livro_id: u64, auth: Auth<'_>) -> Result<Vec<Avaliacao>> {
        let listing: Listing<Avaliacao> = self
            .get(&format!("livros/{livro_id}/avaliacoes/"), &[], auth)
            .await?;
        Ok(listing.into_results())
    }

    pub async fn criar_avaliacao(
        &self,
        livro_id: u64,
        avaliacao: &NovaAvaliacao,
        token: &str,
    ) -> Result<()> {
        self.send_discarding(
            Method::POST,
            &format!("livros/{livro_id}/avaliacoes/"),
            Some(avaliacao),
            Auth::Bearer(token),
        )
        .await
    }

    pub async fn curtir_avaliacao(&self, avaliacao_id: u64, token: &str) -> Result<()> {
        self.send_discarding(
            Method::POST,
            &format!("avaliacoes/{avaliacao_id}/curtir/"),
            NO_BODY,
            Auth::Bearer(token),
        )
        .await
    }

    pub async fn remover_curtida(&self, avaliacao_id: u64, token: &str) -> Result<()> {
        self.send_discarding(
            Method::DELETE,
            &format!("avaliacoes/{avaliacao_id}/curtir/"),
            NO_BODY,
            Auth::Bearer(token),
        )
        .await
    }
}
