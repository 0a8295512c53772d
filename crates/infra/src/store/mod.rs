//! Supplier persistence boundary.
//!
//! The trait makes no storage assumptions: tests and dev runs use the
//! in-memory store, deployments use Postgres.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemorySupplierStore;
pub use postgres::PostgresSupplierStore;
pub use r#trait::{StoreError, SupplierStore};
