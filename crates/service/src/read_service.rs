use tracing::{debug, instrument};

use supplyhub_core::{DomainError, DomainResult, SearchCriteria, SupplierId};
use supplyhub_infra::SupplierStore;
use supplyhub_suppliers::{Criterion, FetchPlan, PredicateBuilder, PredicateOutcome, Supplier};

use crate::storage_error;

/// Lookups by id, by criteria and by name prefix.
///
/// A search that matches nothing is an error ([`DomainError::NotFound`]),
/// never an empty success.
#[derive(Debug, Clone)]
pub struct SupplierReadService<S> {
    store: S,
    predicates: PredicateBuilder,
}

impl<S: SupplierStore> SupplierReadService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            predicates: PredicateBuilder::new(),
        }
    }

    #[instrument(skip(self), fields(supplier_id = %id), err)]
    pub async fn find_by_id(&self, id: SupplierId, fetch: FetchPlan) -> DomainResult<Supplier> {
        debug!(?fetch, "find supplier by id");
        self.store
            .find_by_id(id, fetch)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| DomainError::not_found_id(id))
    }

    #[instrument(skip(self), fields(criteria = %criteria), err)]
    pub async fn find(&self, criteria: &SearchCriteria) -> DomainResult<Vec<Supplier>> {
        let found = match criteria.single() {
            Some((name, value)) if Criterion::from_name(name) == Some(Criterion::Name) => {
                debug!("direct lookup by name substring");
                self.store.find_by_name_substring(value).await
            }
            Some((name, value)) if Criterion::from_name(name) == Some(Criterion::Email) => {
                debug!("direct lookup by email prefix");
                self.store
                    .find_by_email_prefix(value)
                    .await
                    .map(|s| s.into_iter().collect::<Vec<_>>())
            }
            _ => match self.predicates.build(criteria) {
                PredicateOutcome::Unconstrained => self.store.find_all().await,
                PredicateOutcome::Usable(predicate) => {
                    debug!(?predicate, "search with compiled predicate");
                    self.store.find_all_matching(&predicate).await
                }
                PredicateOutcome::Unusable(reason) => {
                    debug!(%reason, "criteria cannot be compiled");
                    return Err(DomainError::not_found_criteria(criteria.clone()));
                }
            },
        }
        .map_err(storage_error)?;

        if found.is_empty() {
            return Err(DomainError::not_found_criteria(criteria.clone()));
        }
        Ok(found)
    }

    /// Distinct supplier names starting with `prefix`, sorted.
    #[instrument(skip(self), err)]
    pub async fn find_names_by_prefix(&self, prefix: &str) -> DomainResult<Vec<String>> {
        let names = self
            .store
            .find_names_by_prefix(prefix)
            .await
            .map_err(storage_error)?;
        if names.is_empty() {
            return Err(DomainError::not_found_criteria(
                SearchCriteria::new().with("prefix", prefix),
            ));
        }
        Ok(names)
    }
}
