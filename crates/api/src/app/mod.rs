use std::sync::Arc;

use axum::{extract::Extension, routing::get, Router};
use tower::ServiceBuilder;

use supplyhub_infra::{
    InMemorySupplierStore, InfraConfig, PostgresSupplierStore, StoreError, SupplierStore,
};
use supplyhub_service::SupplierService;

use crate::Operations;

pub mod dto;
pub mod errors;
pub mod routes;

/// Wire the supplier core onto the configured store.
///
/// The Postgres schema is applied before the store is handed out.
pub async fn build_operations(config: &InfraConfig) -> Result<Operations, StoreError> {
    let store: Arc<dyn SupplierStore> = match &config.database {
        Some(db) => {
            let store = PostgresSupplierStore::connect(db).await?;
            store.migrate().await?;
            tracing::info!(
                max_connections = db.max_connections,
                "using postgres supplier store"
            );
            Arc::new(store)
        }
        None => Arc::new(InMemorySupplierStore::new()),
    };
    Ok(Arc::new(SupplierService::new(store)))
}

pub fn build_app(operations: Operations) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(ServiceBuilder::new().layer(Extension(operations)))
}
