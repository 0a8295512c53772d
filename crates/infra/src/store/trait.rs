use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use supplyhub_core::{ExpectedVersion, SupplierId};
use supplyhub_suppliers::{FetchPlan, NewSupplier, Supplier, SupplierPredicate};

/// Supplier store operation error.
///
/// These are storage outcomes, not domain errors. The write service decides
/// which domain error each one becomes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The email is already held by another supplier (unique index).
    #[error("email address {0} is already taken")]
    EmailTaken(String),

    /// Compare-and-swap on the version column failed.
    #[error("version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("supplier {0} not found")]
    NotFound(SupplierId),

    /// Connection, transaction or lock failure.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Persistence boundary for the supplier aggregate.
///
/// A supplier is always stored together with its manager and deliveries.
/// Every write is atomic: either the whole aggregate change is visible or
/// none of it is.
///
/// ## Ordering
///
/// Collection reads are ordered by supplier id. Ids are UUIDv7, so this is
/// creation order.
///
/// ## Implementation requirements
///
/// - `insert` stores version 0 and rejects a taken email with `EmailTaken`.
/// - `update` compares `expected` with the stored version inside the same
///   atomic unit that writes the new state, and bumps the version by one.
/// - `delete` removes the manager and deliveries too. Deleting an absent id
///   returns `false`.
#[async_trait]
pub trait SupplierStore: Send + Sync {
    async fn insert(&self, id: SupplierId, supplier: NewSupplier) -> Result<Supplier, StoreError>;

    /// Persist the name and email of `supplier` if the stored version matches `expected`.
    async fn update(
        &self,
        supplier: &Supplier,
        expected: ExpectedVersion,
    ) -> Result<Supplier, StoreError>;

    async fn find_by_id(
        &self,
        id: SupplierId,
        fetch: FetchPlan,
    ) -> Result<Option<Supplier>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Supplier>, StoreError>;

    async fn find_all_matching(
        &self,
        predicate: &SupplierPredicate,
    ) -> Result<Vec<Supplier>, StoreError>;

    /// Exact match on the stored email.
    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError>;

    async fn delete(&self, id: SupplierId) -> Result<bool, StoreError>;

    /// Case-insensitive substring search on the name.
    async fn find_by_name_substring(&self, needle: &str) -> Result<Vec<Supplier>, StoreError>;

    /// First supplier (by id) whose email starts with `prefix`, ignoring case.
    async fn find_by_email_prefix(&self, prefix: &str) -> Result<Option<Supplier>, StoreError>;

    /// Distinct names starting with `prefix` (case-insensitive), sorted.
    async fn find_names_by_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

#[async_trait]
impl<S> SupplierStore for Arc<S>
where
    S: SupplierStore + ?Sized,
{
    async fn insert(&self, id: SupplierId, supplier: NewSupplier) -> Result<Supplier, StoreError> {
        (**self).insert(id, supplier).await
    }

    async fn update(
        &self,
        supplier: &Supplier,
        expected: ExpectedVersion,
    ) -> Result<Supplier, StoreError> {
        (**self).update(supplier, expected).await
    }

    async fn find_by_id(
        &self,
        id: SupplierId,
        fetch: FetchPlan,
    ) -> Result<Option<Supplier>, StoreError> {
        (**self).find_by_id(id, fetch).await
    }

    async fn find_all(&self) -> Result<Vec<Supplier>, StoreError> {
        (**self).find_all().await
    }

    async fn find_all_matching(
        &self,
        predicate: &SupplierPredicate,
    ) -> Result<Vec<Supplier>, StoreError> {
        (**self).find_all_matching(predicate).await
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        (**self).exists_by_email(email).await
    }

    async fn delete(&self, id: SupplierId) -> Result<bool, StoreError> {
        (**self).delete(id).await
    }

    async fn find_by_name_substring(&self, needle: &str) -> Result<Vec<Supplier>, StoreError> {
        (**self).find_by_name_substring(needle).await
    }

    async fn find_by_email_prefix(&self, prefix: &str) -> Result<Option<Supplier>, StoreError> {
        (**self).find_by_email_prefix(prefix).await
    }

    async fn find_names_by_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        (**self).find_names_by_prefix(prefix).await
    }
}
