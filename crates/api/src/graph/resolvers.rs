use serde::{Deserialize, Serialize};
use tracing::debug;

use supplyhub_core::version::parse_version;
use supplyhub_core::{AggregateRoot, SearchCriteria, SupplierId};
use supplyhub_suppliers::{Delivery, FetchPlan, Manager, Supplier, SupplierDraft};

use super::errors::{from_domain, GraphError, GraphErrorType, GraphResult};
use crate::Operations;

#[derive(Debug, Clone, Deserialize)]
pub struct ManagerInput {
    pub name: String,
    pub email: String,
    pub salary: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryInput {
    pub article: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupplierInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub manager: Option<ManagerInput>,
    #[serde(default)]
    pub deliveries: Vec<DeliveryInput>,
}

impl From<SupplierInput> for SupplierDraft {
    fn from(input: SupplierInput) -> Self {
        SupplierDraft {
            name: input.name,
            email: input.email,
            username: input.username,
            manager: input.manager.map(|m| Manager {
                name: m.name,
                email: m.email,
                salary: m.salary,
            }),
            deliveries: input
                .deliveries
                .into_iter()
                .map(|d| Delivery::new(d.article))
                .collect(),
        }
    }
}

/// Optional search filter; absent fields are not constrained.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplierFilter {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<SupplierFilter> for SearchCriteria {
    fn from(filter: SupplierFilter) -> Self {
        let mut criteria = SearchCriteria::new();
        if let Some(name) = filter.name {
            criteria.push("name", name);
        }
        if let Some(email) = filter.email {
            criteria.push("email", email);
        }
        criteria
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierNode {
    pub id: String,
    pub version: u64,
    pub name: String,
    pub email: String,
    pub username: Option<String>,
    pub manager: Manager,
    /// Only present when the query selected deliveries.
    pub deliveries: Option<Vec<Delivery>>,
}

impl From<Supplier> for SupplierNode {
    fn from(s: Supplier) -> Self {
        let version = s.version();
        let parts = s.into_parts();
        Self {
            id: parts.id.to_string(),
            version,
            name: parts.name,
            email: parts.email,
            username: parts.username,
            manager: parts.manager,
            deliveries: parts.deliveries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePayload {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatePayload {
    pub id: String,
    pub version: u64,
}

/// Query and mutation resolvers.
#[derive(Clone)]
pub struct SupplierResolvers {
    ops: Operations,
}

fn parse_id(raw: &str) -> GraphResult<SupplierId> {
    raw.parse().map_err(|_| {
        vec![GraphError::new(GraphErrorType::BadRequest, format!("invalid id {raw:?}")).at(["id"])]
    })
}

impl SupplierResolvers {
    pub fn new(ops: Operations) -> Self {
        Self { ops }
    }

    /// `supplier(id)`; deliveries are resolved only when selected.
    pub async fn supplier(&self, id: &str, with_deliveries: bool) -> GraphResult<SupplierNode> {
        debug!(id, with_deliveries, "graph supplier");
        let id = parse_id(id)?;
        let fetch = if with_deliveries {
            FetchPlan::WithDeliveries
        } else {
            FetchPlan::ManagerOnly
        };
        self.ops
            .find_by_id(id, fetch)
            .await
            .map(SupplierNode::from)
            .map_err(from_domain)
    }

    /// `suppliers(filter)`; no filter finds everything.
    pub async fn suppliers(&self, filter: Option<SupplierFilter>) -> GraphResult<Vec<SupplierNode>> {
        let criteria: SearchCriteria = filter.unwrap_or_default().into();
        debug!(%criteria, "graph suppliers");
        let found = self.ops.find(&criteria).await.map_err(from_domain)?;
        Ok(found.into_iter().map(SupplierNode::from).collect())
    }

    pub async fn create(&self, input: SupplierInput) -> GraphResult<CreatePayload> {
        debug!(email = %input.email, "graph create");
        let created = self.ops.create(input.into()).await.map_err(from_domain)?;
        Ok(CreatePayload {
            id: created.id().to_string(),
        })
    }

    /// `update(id, version, input)`; `version` is the bare number the client last read.
    pub async fn update(
        &self,
        id: &str,
        version: Option<&str>,
        input: SupplierInput,
    ) -> GraphResult<UpdatePayload> {
        debug!(id, ?version, "graph update");
        let id = parse_id(id)?;
        let version = parse_version(version).map_err(from_domain)?;
        let updated = self
            .ops
            .update(input.into(), id, version)
            .await
            .map_err(from_domain)?;
        Ok(UpdatePayload {
            id: updated.id().to_string(),
            version: updated.version(),
        })
    }

    /// `delete(id)`; `true` also when nothing was stored under `id`.
    pub async fn delete(&self, id: &str) -> GraphResult<bool> {
        let id = parse_id(id)?;
        self.ops.delete_by_id(id).await.map_err(from_domain)?;
        Ok(true)
    }
}
