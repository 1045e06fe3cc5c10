use reqwest::Method;

use crate::client::{ApiClient, Auth};
use crate::error::Result;
use crate::models::{FreteCarrinhoRequest, FreteGenericoRequest, FreteLivroRequest, ResultadoFrete};

impl ApiClient {
    pub async fn frete_generico(&self, request: &FreteGenericoRequest) -> Result<ResultadoFrete> {
        self.send(Method::POST, "frete/calcular/", request, Auth::Anonymous)
            .await
    }

    pub async fn frete_livro(
        &self,
        livro_id: u64,
        request: &FreteLivroRequest,
    ) -> Result<ResultadoFrete> {
        self.send(
            Method::POST,
            &format!("frete/livro/{livro_id}/"),
            request,
            Auth::Anonymous,
        )
        .await
    }

    pub async fn frete_carrinho(
        &self,
        request: &FreteCarrinhoRequest,
        token: &str,
    ) -> Result<ResultadoFrete> {
        self.send(Method::POST, "frete/carrinho/", request, Auth::Bearer(token))
            .await
    }
}
