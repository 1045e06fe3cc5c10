use reqwest::Method;

use crate::client::{ApiClient, Auth};
use crate::error::Result;
use crate::listing::Listing;
use crate::models::{
    Cancelamento, Pedido, PedidoCreate, PedidoFiltro, PedidoStats, PedidoUpdate, Scope,
};

impl ApiClient {
    pub async fn pedidos(
        &self,
        scope: Scope,
        filtro: &PedidoFiltro,
        token: &str,
    ) -> Result<Listing<Pedido>> {
        let path = match scope {
            Scope::Customer => "pedidos/",
            Scope::Admin => "admin/pedidos/",
        };
        self.get(path, &filtro.query(), Auth::Bearer(token)).await
    }

    pub async fn pedido(&self, scope: Scope, id: u64, token: &str) -> Result<Pedido> {
        let path = match scope {
            Scope::Customer => format!("pedidos/{id}/"),
            Scope::Admin => format!("admin/{id}/get_pedido/"),
        };
        self.get(&path, &[], Auth::Bearer(token)).await
    }

    pub async fn criar_pedido(&self, pedido: &PedidoCreate, token: &str) -> Result<Pedido> {
        self.send(Method::POST, "pedidos/", pedido, Auth::Bearer(token)).await
    }

    /// Applies `update` and returns the order as stored afterwards.
    ///
    /// The admin endpoint answers with a partial record, so the order is
    /// fetched again.
    pub async fn atualizar_pedido(
        &self,
        scope: Scope,
        id: u64,
        update: &PedidoUpdate,
        token: &str,
    ) -> Result<Pedido> {
        match scope {
            Scope::Customer => {
                self.send(Method::PATCH, &format!("pedidos/{id}/"), update, Auth::Bearer(token))
                    .await
            }
            Scope::Admin => {
                self.send_discarding(
                    Method::PATCH,
                    &format!("admin/{id}/update_pedido_status/"),
                    Some(update),
                    Auth::Bearer(token),
                )
                .await?;
                self.pedido(scope, id, token).await
            }
        }
    }

    /// Cancels the order and returns it re-fetched.
    pub async fn cancelar_pedido(
        &self,
        scope: Scope,
        id: u64,
        cancelamento: &Cancelamento,
        token: &str,
    ) -> Result<Pedido> {
        let path = match scope {
            Scope::Customer => format!("pedidos/{id}/cancelar/"),
            Scope::Admin => format!("admin/{id}/cancelar_pedido_admin/"),
        };
        self.send_discarding(Method::PATCH, &path, Some(cancelamento), Auth::Bearer(token))
            .await?;
        self.pedido(scope, id, token).await
    }

    pub async fn estatisticas_pedidos(&self, scope: Scope, token: &str) -> Result<PedidoStats> {
        let path = match scope {
            Scope::Customer => "pedidos/estatisticas/",
            Scope::Admin => "admin/pedidos_estatisticas/",
        };
        self.get(path, &[], Auth::Bearer(token)).await
    }
}
