use anyhow::Context;
use elibros_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load eLibros settings")?;
    elibros_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        backend = %settings.backend.base_url,
        "elibros-web bootstrap starting"
    );

    elibros_web::run(settings).await
}
