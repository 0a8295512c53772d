use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use supplyhub_core::{
    AggregateRoot, DomainResult, SupplierId, Validate, ValidationGroup, ValueObject,
    Violations,
};

/// Maximum length (in characters) of a supplier's display username.
pub const USERNAME_MAX_CHARS: usize = 20;

/// Lowest accepted manager salary.
pub const SALARY_MIN: i64 = 0;

/// Highest accepted manager salary.
pub const SALARY_MAX: i64 = 10_000_000;

/// The manager of a supplier (owned 1:1, lives and dies with its supplier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manager {
    pub name: String,
    pub email: String,
    pub salary: i64,
}

impl ValueObject for Manager {}

impl Manager {
    fn violations(&self) -> Violations {
        let mut v = Violations::new();
        v.check_capitalized_word("name", &self.name);
        v.check_email("email", &self.email);
        v.check_range("salary", self.salary, SALARY_MIN, SALARY_MAX);
        v
    }
}

/// One delivery line item, identified by its article name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub article: String,
}

impl ValueObject for Delivery {}

impl Delivery {
    pub fn new(article: impl Into<String>) -> Self {
        Self {
            article: article.into(),
        }
    }
}

/// Unvalidated supplier candidate as assembled by a front end.
///
/// The manager is optional here so that its absence can be reported as a
/// violation instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierDraft {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub manager: Option<Manager>,
    #[serde(default)]
    pub deliveries: Vec<Delivery>,
}

impl Validate for SupplierDraft {
    fn validate(&self, group: ValidationGroup) -> Violations {
        let mut v = Violations::new();
        v.check_capitalized_word("name", &self.name);
        v.check_email("email", &self.email);
        if let Some(username) = &self.username {
            v.check_max_chars("username", username, USERNAME_MAX_CHARS);
        }

        match (&self.manager, group) {
            (Some(manager), _) => v.extend_nested("manager", manager.violations()),
            (None, ValidationGroup::Create) => v.check_present::<Manager>("manager", None),
            (None, ValidationGroup::Update) => {}
        }

        for (idx, delivery) in self.deliveries.iter().enumerate() {
            v.check_capitalized_word(&format!("deliveries[{idx}].article"), &delivery.article);
        }
        v
    }
}

impl SupplierDraft {
    /// Validate for creation and, if clean, turn the draft into a [`NewSupplier`].
    pub fn into_new(self) -> DomainResult<NewSupplier> {
        self.ensure_valid(ValidationGroup::Create)?;
        match self.manager {
            Some(manager) => Ok(NewSupplier {
                name: self.name,
                email: self.email,
                username: self.username,
                manager,
                deliveries: self.deliveries,
            }),
            // `ensure_valid` already rejected a missing manager.
            None => Err(supplyhub_core::DomainError::ConstraintViolations(
                self.validate(ValidationGroup::Create),
            )),
        }
    }
}

/// A supplier that passed creation rules and is ready to be inserted.
///
/// Only obtainable through [`SupplierDraft::into_new`], so stores can rely on
/// a present manager and well-formed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSupplier {
    name: String,
    email: String,
    username: Option<String>,
    manager: Manager,
    deliveries: Vec<Delivery>,
}

impl NewSupplier {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    /// Complete the aggregate with storage-assigned identity and timestamps (version 0).
    pub fn into_supplier(self, id: SupplierId, now: DateTime<Utc>) -> Supplier {
        Supplier::hydrate(SupplierParts {
            id,
            version: 0,
            name: self.name,
            email: self.email,
            username: self.username,
            manager: self.manager,
            deliveries: Some(self.deliveries),
            created_at: now,
            updated_at: now,
        })
    }
}

/// How much of the aggregate a read must resolve.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum FetchPlan {
    /// Supplier row and manager only.
    #[default]
    ManagerOnly,
    /// Supplier, manager and the ordered delivery list.
    WithDeliveries,
}

/// Raw persisted state, used by stores to rebuild an aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierParts {
    pub id: SupplierId,
    pub version: u64,
    pub name: String,
    pub email: String,
    pub username: Option<String>,
    pub manager: Manager,
    /// `None` when the read did not resolve deliveries.
    pub deliveries: Option<Vec<Delivery>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate root: Supplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Supplier {
    id: SupplierId,
    version: u64,
    name: String,
    email: String,
    username: Option<String>,
    manager: Manager,
    deliveries: Option<Vec<Delivery>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Supplier {
    /// Rebuild an aggregate from persisted state.
    pub fn hydrate(parts: SupplierParts) -> Self {
        Self {
            id: parts.id,
            version: parts.version,
            name: parts.name,
            email: parts.email,
            username: parts.username,
            manager: parts.manager,
            deliveries: parts.deliveries,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        }
    }

    /// Decompose into persisted state (inverse of [`Supplier::hydrate`]).
    pub fn into_parts(self) -> SupplierParts {
        SupplierParts {
            id: self.id,
            version: self.version,
            name: self.name,
            email: self.email,
            username: self.username,
            manager: self.manager,
            deliveries: self.deliveries,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn id(&self) -> SupplierId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    /// Ordered deliveries, or `None` if this read did not resolve them.
    pub fn deliveries(&self) -> Option<&[Delivery]> {
        self.deliveries.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Copy the mutable surface of a draft onto this aggregate.
    ///
    /// Only name and email change after creation; manager, deliveries and
    /// username are left untouched.
    pub fn apply_changes(&mut self, draft: &SupplierDraft) {
        self.name = draft.name.clone();
        self.email = draft.email.clone();
    }

    /// Record a successful persist (new version + modification time).
    pub fn mark_persisted(&mut self, version: u64, updated_at: DateTime<Utc>) {
        self.version = version;
        self.updated_at = updated_at;
    }

    /// Drop resolved deliveries (for reads that did not ask for them).
    pub fn without_deliveries(mut self) -> Self {
        self.deliveries = None;
        self
    }

    pub fn with_deliveries(mut self, deliveries: Vec<Delivery>) -> Self {
        self.deliveries = Some(deliveries);
        self
    }
}

impl AggregateRoot for Supplier {
    type Id = SupplierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
