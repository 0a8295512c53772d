//! Supplier front ends: the REST adapter (`app`) and the graph adapter (`graph`).
//!
//! Both hold an `Arc<dyn SupplierOperations>` and translate
//! [`supplyhub_core::DomainError`] into their own wire formats.

pub mod app;
pub mod graph;

use std::sync::Arc;

use supplyhub_service::SupplierOperations;

/// Shared handle to the supplier core.
pub type Operations = Arc<dyn SupplierOperations>;
