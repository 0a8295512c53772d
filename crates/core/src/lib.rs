//! `supplyhub-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the supplier model,
//! the services and both front ends (no infrastructure concerns).

pub mod aggregate;
pub mod criteria;
pub mod error;
pub mod id;
pub mod validation;
pub mod value_object;
pub mod version;

pub use aggregate::{AggregateRoot, ExpectedVersion};
pub use criteria::SearchCriteria;
pub use error::{DomainError, DomainResult, NotFoundTarget};
pub use id::SupplierId;
pub use validation::{Validate, ValidationGroup, Violation, Violations};
pub use value_object::ValueObject;
