use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use supplyhub_core::{AggregateRoot, ExpectedVersion, SupplierId};
use supplyhub_suppliers::{FetchPlan, NewSupplier, Supplier, SupplierPredicate};

use super::r#trait::{StoreError, SupplierStore};

/// In-memory supplier store.
///
/// Intended for tests/dev. Every write takes the lock once, so the email and
/// version checks happen in the same critical section as the write. The lock
/// is never held across an `.await`.
#[derive(Debug, Default)]
pub struct InMemorySupplierStore {
    suppliers: RwLock<BTreeMap<SupplierId, Supplier>>,
}

impl InMemorySupplierStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<SupplierId, Supplier>>, StoreError> {
        self.suppliers
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<SupplierId, Supplier>>, StoreError> {
        self.suppliers
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn collect<F>(&self, keep: F) -> Result<Vec<Supplier>, StoreError>
    where
        F: Fn(&Supplier) -> bool,
    {
        let suppliers = self.read()?;
        Ok(suppliers.values().filter(|s| keep(s)).cloned().collect())
    }
}

#[async_trait]
impl SupplierStore for InMemorySupplierStore {
    async fn insert(&self, id: SupplierId, supplier: NewSupplier) -> Result<Supplier, StoreError> {
        let mut suppliers = self.write()?;

        if suppliers.values().any(|s| s.email() == supplier.email()) {
            return Err(StoreError::EmailTaken(supplier.email().to_string()));
        }
        if suppliers.contains_key(&id) {
            return Err(StoreError::Backend(format!("duplicate supplier id {id}")));
        }

        let stored = supplier.into_supplier(id, Utc::now());
        suppliers.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        supplier: &Supplier,
        expected: ExpectedVersion,
    ) -> Result<Supplier, StoreError> {
        let id = supplier.id();
        let mut suppliers = self.write()?;

        let current = suppliers
            .get(&id)
            .map(|s| s.version())
            .ok_or(StoreError::NotFound(id))?;

        if !expected.matches(current) {
            let expected = match expected {
                ExpectedVersion::Exact(v) => v,
                ExpectedVersion::Any => current,
            };
            return Err(StoreError::VersionConflict {
                expected,
                actual: current,
            });
        }

        if suppliers
            .values()
            .any(|s| s.id() != id && s.email() == supplier.email())
        {
            return Err(StoreError::EmailTaken(supplier.email().to_string()));
        }

        let stored = suppliers.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        let mut parts = stored.clone().into_parts();
        parts.name = supplier.name().to_string();
        parts.email = supplier.email().to_string();
        parts.version = current + 1;
        parts.updated_at = Utc::now();
        *stored = Supplier::hydrate(parts);

        Ok(stored.clone())
    }

    async fn find_by_id(
        &self,
        id: SupplierId,
        fetch: FetchPlan,
    ) -> Result<Option<Supplier>, StoreError> {
        let suppliers = self.read()?;
        Ok(suppliers.get(&id).cloned().map(|s| match fetch {
            FetchPlan::WithDeliveries => s,
            FetchPlan::ManagerOnly => s.without_deliveries(),
        }))
    }

    async fn find_all(&self) -> Result<Vec<Supplier>, StoreError> {
        self.collect(|_| true)
    }

    async fn find_all_matching(
        &self,
        predicate: &SupplierPredicate,
    ) -> Result<Vec<Supplier>, StoreError> {
        self.collect(|s| predicate.matches(s))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let suppliers = self.read()?;
        Ok(suppliers.values().any(|s| s.email() == email))
    }

    async fn delete(&self, id: SupplierId) -> Result<bool, StoreError> {
        let mut suppliers = self.write()?;
        Ok(suppliers.remove(&id).is_some())
    }

    async fn find_by_name_substring(&self, needle: &str) -> Result<Vec<Supplier>, StoreError> {
        let needle = needle.to_lowercase();
        self.collect(|s| s.name().to_lowercase().contains(&needle))
    }

    async fn find_by_email_prefix(&self, prefix: &str) -> Result<Option<Supplier>, StoreError> {
        let prefix = prefix.to_lowercase();
        let suppliers = self.read()?;
        Ok(suppliers
            .values()
            .find(|s| s.email().to_lowercase().starts_with(&prefix))
            .cloned())
    }

    async fn find_names_by_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let prefix = prefix.to_lowercase();
        let suppliers = self.read()?;
        let names: BTreeSet<String> = suppliers
            .values()
            .filter(|s| s.name().to_lowercase().starts_with(&prefix))
            .map(|s| s.name().to_string())
            .collect();
        Ok(names.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supplyhub_suppliers::{Delivery, Manager, SupplierDraft};

    fn new_supplier(name: &str, email: &str) -> NewSupplier {
        SupplierDraft {
            name: name.to_string(),
            email: email.to_string(),
            username: None,
            manager: Some(Manager {
                name: "Peter".to_string(),
                email: "peter@acme.de".to_string(),
                salary: 50_000,
            }),
            deliveries: vec![Delivery::new("Gold"), Delivery::new("Silver")],
        }
        .into_new()
        .unwrap()
    }

    #[tokio::test]
    async fn insert_rejects_taken_email() {
        let store = InMemorySupplierStore::new();
        store
            .insert(SupplierId::new(), new_supplier("Paprika", "info@paprika.de"))
            .await
            .unwrap();

        let err = store
            .insert(SupplierId::new(), new_supplier("Wurst", "info@paprika.de"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::EmailTaken("info@paprika.de".into()));
        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_is_compare_and_swap() {
        let store = InMemorySupplierStore::new();
        let id = SupplierId::new();
        let mut s = store
            .insert(id, new_supplier("Paprika", "info@paprika.de"))
            .await
            .unwrap();
        assert_eq!(s.version(), 0);

        s.apply_changes(&SupplierDraft {
            name: "Pfeffer".into(),
            email: "info@pfeffer.de".into(),
            ..SupplierDraft::default()
        });
        let updated = store.update(&s, ExpectedVersion::Exact(0)).await.unwrap();
        assert_eq!(updated.version(), 1);
        assert_eq!(updated.name(), "Pfeffer");
        assert_eq!(updated.deliveries().map(<[Delivery]>::len), Some(2));

        let err = store.update(&s, ExpectedVersion::Exact(0)).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::VersionConflict {
                expected: 0,
                actual: 1
            }
        );
    }

    #[tokio::test]
    async fn update_rejects_email_of_another_supplier() {
        let store = InMemorySupplierStore::new();
        store
            .insert(SupplierId::new(), new_supplier("Paprika", "info@paprika.de"))
            .await
            .unwrap();
        let mut other = store
            .insert(SupplierId::new(), new_supplier("Wurst", "info@wurst.de"))
            .await
            .unwrap();

        other.apply_changes(&SupplierDraft {
            name: "Wurst".into(),
            email: "info@paprika.de".into(),
            ..SupplierDraft::default()
        });
        let err = store.update(&other, ExpectedVersion::Exact(0)).await.unwrap_err();
        assert_eq!(err, StoreError::EmailTaken("info@paprika.de".into()));
    }

    #[tokio::test]
    async fn manager_only_reads_skip_deliveries() {
        let store = InMemorySupplierStore::new();
        let id = SupplierId::new();
        store
            .insert(id, new_supplier("Paprika", "info@paprika.de"))
            .await
            .unwrap();

        let light = store.find_by_id(id, FetchPlan::ManagerOnly).await.unwrap().unwrap();
        assert!(light.deliveries().is_none());
        assert_eq!(light.manager().name, "Peter");

        let full = store
            .find_by_id(id, FetchPlan::WithDeliveries)
            .await
            .unwrap()
            .unwrap();
        let articles: Vec<_> = full
            .deliveries()
            .unwrap()
            .iter()
            .map(|d| d.article.clone())
            .collect();
        assert_eq!(articles, ["Gold", "Silver"]);
    }

    #[tokio::test]
    async fn lookups_ignore_case() {
        let store = InMemorySupplierStore::new();
        store
            .insert(SupplierId::new(), new_supplier("Paprika", "Info@Paprika.de"))
            .await
            .unwrap();
        store
            .insert(SupplierId::new(), new_supplier("Papaya", "hello@papaya.de"))
            .await
            .unwrap();
        store
            .insert(SupplierId::new(), new_supplier("Papaya", "sales@papaya.de"))
            .await
            .unwrap();

        assert_eq!(store.find_by_name_substring("PAP").await.unwrap().len(), 3);
        assert!(store.find_by_email_prefix("info@").await.unwrap().is_some());
        assert!(store.find_by_email_prefix("paprika").await.unwrap().is_none());
        assert_eq!(
            store.find_names_by_prefix("pa").await.unwrap(),
            ["Papaya", "Paprika"]
        );
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let store = InMemorySupplierStore::new();
        let id = SupplierId::new();
        store
            .insert(id, new_supplier("Paprika", "info@paprika.de"))
            .await
            .unwrap();

        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
        assert!(!store.exists_by_email("info@paprika.de").await.unwrap());
    }
}
