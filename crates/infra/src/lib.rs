//! Infrastructure layer: supplier storage backends and configuration.

pub mod config;
pub mod store;

pub use config::{ConfigError, DatabaseConfig, InfraConfig};
pub use store::{InMemorySupplierStore, PostgresSupplierStore, StoreError, SupplierStore};
