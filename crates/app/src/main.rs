use anyhow::Context;

use storefront_app::Storefront;
use storefront_infra::DatabaseConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront_observability::init();

    let config = DatabaseConfig::from_env().context("invalid database configuration")?;
    tracing::info!(max_connections = config.max_connections, "connecting to database");

    let _storefront = Storefront::connect(&config)
        .await
        .context("failed to initialise storage")?;

    tracing::info!("storefront ready");
    Ok(())
}
