use anyhow::Context;
use catalog_kernel::settings::Settings;
use catalog_service::app::{self, Stores};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load catalog settings")?;
    catalog_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.sqlite_path.display(),
        reviews = ?settings.reviews.backend,
        "catalog-service bootstrap starting"
    );

    let stores = Stores::connect(&settings).await?;
    let app = app::bootstrap(&settings, &stores).await?;

    catalog_http::start_server(app.router, &settings.server, shutdown_signal()).await?;

    app.registry.stop_all().await?;
    tracing::info!("catalog-service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
