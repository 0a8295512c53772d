use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use supplyhub_core::AggregateRoot;
use supplyhub_suppliers::{Delivery, Manager, Supplier, SupplierDraft};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct ManagerRequest {
    pub name: String,
    pub email: String,
    pub salary: i64,
}

#[derive(Debug, Deserialize)]
pub struct DeliveryRequest {
    pub article: String,
}

/// Body of `POST /suppliers` and `PUT /suppliers/:id`.
#[derive(Debug, Deserialize)]
pub struct SupplierRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub manager: Option<ManagerRequest>,
    #[serde(default)]
    pub deliveries: Vec<DeliveryRequest>,
}

impl SupplierRequest {
    pub fn into_draft(self) -> SupplierDraft {
        SupplierDraft {
            name: self.name,
            email: self.email,
            username: self.username,
            manager: self.manager.map(|m| Manager {
                name: m.name,
                email: m.email,
                salary: m.salary,
            }),
            deliveries: self
                .deliveries
                .into_iter()
                .map(|d| Delivery::new(d.article))
                .collect(),
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct SupplierResponse {
    pub id: String,
    pub version: u64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub manager: Manager,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deliveries: Option<Vec<Delivery>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Supplier> for SupplierResponse {
    fn from(s: &Supplier) -> Self {
        Self {
            id: s.id().to_string(),
            version: s.version(),
            name: s.name().to_string(),
            email: s.email().to_string(),
            username: s.username().map(str::to_string),
            manager: s.manager().clone(),
            deliveries: s.deliveries().map(<[Delivery]>::to_vec),
            created_at: s.created_at(),
            updated_at: s.updated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SupplierListResponse {
    pub items: Vec<SupplierResponse>,
}

impl SupplierListResponse {
    pub fn from_suppliers(suppliers: &[Supplier]) -> Self {
        Self {
            items: suppliers.iter().map(SupplierResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}
