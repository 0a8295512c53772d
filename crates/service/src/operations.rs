use async_trait::async_trait;

use supplyhub_core::{DomainResult, SearchCriteria, SupplierId};
use supplyhub_infra::SupplierStore;
use supplyhub_suppliers::{FetchPlan, Supplier, SupplierDraft};

use crate::read_service::SupplierReadService;
use crate::write_service::SupplierWriteService;

/// Everything a front end may ask of the supplier core.
///
/// The REST and graph adapters both hold an `Arc<dyn SupplierOperations>`.
#[async_trait]
pub trait SupplierOperations: Send + Sync {
    async fn create(&self, draft: SupplierDraft) -> DomainResult<Supplier>;

    async fn update(
        &self,
        draft: SupplierDraft,
        id: SupplierId,
        expected_version: u64,
    ) -> DomainResult<Supplier>;

    async fn delete_by_id(&self, id: SupplierId) -> DomainResult<()>;

    async fn find_by_id(&self, id: SupplierId, fetch: FetchPlan) -> DomainResult<Supplier>;

    async fn find(&self, criteria: &SearchCriteria) -> DomainResult<Vec<Supplier>>;

    async fn find_names_by_prefix(&self, prefix: &str) -> DomainResult<Vec<String>>;
}

/// Read and write services over one shared store.
#[derive(Debug, Clone)]
pub struct SupplierService<S> {
    reads: SupplierReadService<S>,
    writes: SupplierWriteService<S>,
}

impl<S: SupplierStore + Clone> SupplierService<S> {
    pub fn new(store: S) -> Self {
        Self {
            reads: SupplierReadService::new(store.clone()),
            writes: SupplierWriteService::new(store),
        }
    }
}

#[async_trait]
impl<S> SupplierOperations for SupplierService<S>
where
    S: SupplierStore + Clone,
{
    async fn create(&self, draft: SupplierDraft) -> DomainResult<Supplier> {
        self.writes.create(draft).await
    }

    async fn update(
        &self,
        draft: SupplierDraft,
        id: SupplierId,
        expected_version: u64,
    ) -> DomainResult<Supplier> {
        self.writes.update(draft, id, expected_version).await
    }

    async fn delete_by_id(&self, id: SupplierId) -> DomainResult<()> {
        self.writes.delete_by_id(id).await
    }

    async fn find_by_id(&self, id: SupplierId, fetch: FetchPlan) -> DomainResult<Supplier> {
        self.reads.find_by_id(id, fetch).await
    }

    async fn find(&self, criteria: &SearchCriteria) -> DomainResult<Vec<Supplier>> {
        self.reads.find(criteria).await
    }

    async fn find_names_by_prefix(&self, prefix: &str) -> DomainResult<Vec<String>> {
        self.reads.find_names_by_prefix(prefix).await
    }
}
