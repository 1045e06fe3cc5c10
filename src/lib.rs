//! eLibros web: the storefront and admin console's backend-for-frontend.
//!
//! Each page area is a [`Module`](elibros_kernel::Module) mounted under
//! `/api/{name}`. Modules validate forms, call the eLibros backend through
//! [`elibros_client`], and rank the lists they fetched with
//! [`elibros_search`].

pub mod modules;
pub mod state;
pub mod utils;

use std::future::Future;

use anyhow::Context;
use elibros_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub use state::AppState;

/// Registry with every page module, wired to `state`.
pub fn build_registry(state: &AppState) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, state);
    registry
}

/// Boots every module and serves until ctrl-c.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    run_until(settings, elibros_http::shutdown_signal()).await
}

/// Boots every module, serves until `shutdown` resolves, then stops the
/// modules in reverse order.
pub async fn run_until<F>(settings: Settings, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = AppState::from_settings(&settings)?;
    let registry = build_registry(&state);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_core_modules(&ctx).await?;
    registry.init_custom_modules(&ctx).await?;
    registry.start_core_modules(&ctx).await?;
    registry.start_custom_modules(&ctx).await?;

    let served = elibros_http::start_server_with_shutdown(&registry, &settings, shutdown)
        .await
        .context("HTTP server exited with an error");

    registry.stop_custom_modules().await?;
    registry.stop_core_modules().await?;

    served
}
