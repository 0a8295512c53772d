use tracing::{debug, info, instrument, warn};

use supplyhub_core::{
    AggregateRoot, DomainError, DomainResult, ExpectedVersion, SupplierId, Validate,
    ValidationGroup,
};
use supplyhub_infra::{StoreError, SupplierStore};
use supplyhub_suppliers::{FetchPlan, Supplier, SupplierDraft};

use crate::storage_error;

/// Create, update and delete under field rules, email uniqueness and
/// optimistic versioning.
///
/// Every failure is terminal for the call: nothing is written unless all
/// checks pass, and the store's compare-and-swap guards the final write.
#[derive(Debug, Clone)]
pub struct SupplierWriteService<S> {
    store: S,
}

impl<S: SupplierStore> SupplierWriteService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validate, reject a taken email, then persist at version 0.
    #[instrument(skip(self, draft), fields(email = %draft.email), err)]
    pub async fn create(&self, draft: SupplierDraft) -> DomainResult<Supplier> {
        debug!("create supplier");
        let new = draft.into_new()?;

        if self
            .store
            .exists_by_email(new.email())
            .await
            .map_err(storage_error)?
        {
            warn!("email already in use");
            return Err(DomainError::EmailExists(new.email().to_string()));
        }

        let id = SupplierId::new();
        let created = self.store.insert(id, new).await.map_err(|err| match err {
            StoreError::EmailTaken(email) => {
                warn!(%email, "email taken concurrently");
                DomainError::EmailExists(email)
            }
            other => storage_error(other),
        })?;

        info!(supplier_id = %created.id(), "supplier created");
        Ok(created)
    }

    /// Change name and email of an existing supplier at `expected_version`.
    #[instrument(skip(self, draft), fields(supplier_id = %id), err)]
    pub async fn update(
        &self,
        draft: SupplierDraft,
        id: SupplierId,
        expected_version: u64,
    ) -> DomainResult<Supplier> {
        debug!("update supplier");
        draft.ensure_valid(ValidationGroup::Update)?;

        let mut supplier = self
            .store
            .find_by_id(id, FetchPlan::WithDeliveries)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| DomainError::not_found_id(id))?;

        if let Err(err) = ExpectedVersion::Exact(expected_version).check(supplier.version()) {
            warn!(actual = supplier.version(), "stale version");
            return Err(err);
        }

        if supplier.email() != draft.email
            && self
                .store
                .exists_by_email(&draft.email)
                .await
                .map_err(storage_error)?
        {
            warn!(email = %draft.email, "email already in use");
            return Err(DomainError::EmailExists(draft.email));
        }

        supplier.apply_changes(&draft);
        let updated = self
            .store
            .update(&supplier, ExpectedVersion::Exact(expected_version))
            .await
            .map_err(|err| match err {
                StoreError::VersionConflict { actual, .. } => {
                    warn!(actual, "concurrent update won the race");
                    DomainError::VersionOutdated(expected_version)
                }
                StoreError::EmailTaken(email) => {
                    warn!(%email, "email taken concurrently");
                    DomainError::EmailExists(email)
                }
                StoreError::NotFound(_) => DomainError::not_found_id(id),
                other => storage_error(other),
            })?;

        info!(version = updated.version(), "supplier updated");
        Ok(updated)
    }

    /// Remove a supplier with its manager and deliveries. Absent ids are a no-op.
    #[instrument(skip(self), fields(supplier_id = %id), err)]
    pub async fn delete_by_id(&self, id: SupplierId) -> DomainResult<()> {
        let removed = self.store.delete(id).await.map_err(storage_error)?;
        if removed {
            info!("supplier deleted");
        } else {
            debug!("nothing to delete");
        }
        Ok(())
    }
}
