//! Supplier domain services.
//!
//! The read and write services are the only place where storage outcomes are
//! turned into [`DomainError`]s. Front ends talk to [`SupplierOperations`].

pub mod operations;
pub mod read_service;
pub mod write_service;

pub use operations::{SupplierOperations, SupplierService};
pub use read_service::SupplierReadService;
pub use write_service::SupplierWriteService;

use supplyhub_core::DomainError;
use supplyhub_infra::StoreError;

/// Translation used for store failures that carry no write-specific meaning.
pub(crate) fn storage_error(err: StoreError) -> DomainError {
    match err {
        StoreError::NotFound(id) => DomainError::not_found_id(id),
        StoreError::EmailTaken(email) => DomainError::EmailExists(email),
        StoreError::VersionConflict { expected, .. } => DomainError::VersionOutdated(expected),
        StoreError::Backend(msg) => DomainError::storage(msg),
    }
}
