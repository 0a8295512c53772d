use anyhow::Context;

use supplyhub_infra::InfraConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    supplyhub_observability::init();

    let config = InfraConfig::from_env().context("invalid storage configuration")?;
    if !config.use_persistent_store() {
        tracing::warn!("USE_PERSISTENT_STORE not set; suppliers are kept in memory only");
    }
    let operations = supplyhub_api::app::build_operations(&config)
        .await
        .context("failed to initialize supplier storage")?;

    let app = supplyhub_api::app::build_app(operations);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
