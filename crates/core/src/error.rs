//! Domain error model.
//!
//! Every variant is a terminal outcome of the operation that raised it. Front
//! ends translate these into their own wire formats but must keep the kinds
//! apart: "nothing matched", "input rejected" and "someone else changed it
//! first" are different answers.

use thiserror::Error;

use crate::criteria::SearchCriteria;
use crate::id::SupplierId;
use crate::validation::Violations;

/// Result type used across the domain and service layers.
pub type DomainResult<T> = Result<T, DomainError>;

/// What a failed lookup was looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundTarget {
    Id(SupplierId),
    Criteria(SearchCriteria),
}

impl core::fmt::Display for NotFoundTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NotFoundTarget::Id(id) => write!(f, "no supplier with id {id}"),
            NotFoundTarget::Criteria(criteria) => {
                write!(f, "no supplier matching criteria {criteria}")
            }
        }
    }
}

/// Domain-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Resource absent (by id or by search criteria).
    #[error("not found: {0}")]
    NotFound(NotFoundTarget),

    /// Input rejected; always the full set of violations, never just the first.
    #[error("constraints violated: {0}")]
    ConstraintViolations(Violations),

    /// Another supplier already uses this email address.
    #[error("email address {0} already exists")]
    EmailExists(String),

    /// The supplied version does not match the persisted one.
    #[error("version {0} is outdated")]
    VersionOutdated(u64),

    /// A write requiring a version was submitted without one.
    #[error("version is missing")]
    VersionMissing,

    /// The supplied version could not be parsed.
    #[error("invalid version {0:?}")]
    VersionMalformed(String),

    /// The storage backend failed (connection, transaction, poisoned lock).
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn not_found_id(id: SupplierId) -> Self {
        Self::NotFound(NotFoundTarget::Id(id))
    }

    pub fn not_found_criteria(criteria: SearchCriteria) -> Self {
        Self::NotFound(NotFoundTarget::Criteria(criteria))
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Whether the error belongs to the concurrency-conflict kind.
    pub fn is_version_error(&self) -> bool {
        matches!(
            self,
            DomainError::VersionOutdated(_)
                | DomainError::VersionMissing
                | DomainError::VersionMalformed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_messages_name_what_was_searched() {
        let id = SupplierId::new();
        let err = DomainError::not_found_id(id);
        assert_eq!(err.to_string(), format!("not found: no supplier with id {id}"));

        let err = DomainError::not_found_criteria(SearchCriteria::new().with("bogus", "x"));
        assert_eq!(
            err.to_string(),
            "not found: no supplier matching criteria {bogus=[x]}"
        );
    }

    #[test]
    fn version_errors_are_grouped() {
        assert!(DomainError::VersionOutdated(1).is_version_error());
        assert!(DomainError::VersionMissing.is_version_error());
        assert!(DomainError::VersionMalformed("\"x\"".into()).is_version_error());
        assert!(!DomainError::EmailExists("a@b.de".into()).is_version_error());
    }
}
