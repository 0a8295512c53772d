//! Suppliers domain module.
//!
//! This crate contains the supplier aggregate (supplier + owned manager +
//! ordered deliveries), its field rules and the search predicate builder,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod predicate;
pub mod supplier;

pub use predicate::{escape_like, Criterion, PredicateBuilder, PredicateOutcome, SupplierPredicate, UnusableCriteria};
pub use supplier::{
    Delivery, FetchPlan, Manager, NewSupplier, Supplier, SupplierDraft, SupplierParts,
    SALARY_MAX, SALARY_MIN, USERNAME_MAX_CHARS,
};
