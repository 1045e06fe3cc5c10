use reqwest::Method;

use crate::api::NO_BODY;
use crate::client::{ApiClient, Auth};
use crate::error::Result;
use crate::models::{Carrinho, NovoItem, QuantidadeItem};

impl ApiClient {
    pub async fn carrinho(&self, token: &str) -> Result<Carrinho> {
        self.get("carrinho/", &[], Auth::Bearer(token)).await
    }

    pub async fn adicionar_item(&self, item: &NovoItem, token: &str) -> Result<()> {
        self.send_discarding(Method::POST, "carrinho/itens/", Some(item), Auth::Bearer(token))
            .await
    }

    pub async fn atualizar_item(&self, item_id: u64, quantidade: u32, token: &str) -> Result<()> {
        self.send_discarding(
            Method::PATCH,
            &format!("carrinho/itens/{item_id}/"),
            Some(&QuantidadeItem { quantidade }),
            Auth::Bearer(token),
        )
        .await
    }

    pub async fn remover_item(&self, item_id: u64, token: &str) -> Result<()> {
        self.send_discarding(
            Method::DELETE,
            &format!("carrinho/itens/{item_id}/"),
            NO_BODY,
            Auth::Bearer(token),
        )
        .await
    }
}
