//! Search predicates over suppliers.
//!
//! A [`PredicateBuilder`] compiles raw [`SearchCriteria`] into a
//! [`SupplierPredicate`]. The predicate is plain data: the in-memory store
//! evaluates it with [`SupplierPredicate::matches`], the SQL store compiles it
//! into bound `LIKE` clauses. User values never become query text.

use supplyhub_core::SearchCriteria;
use tracing::debug;

use crate::supplier::Supplier;

/// Recognized criterion names.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Criterion {
    Name,
    Email,
}

impl Criterion {
    pub const ALL: [Criterion; 2] = [Criterion::Name, Criterion::Email];

    pub fn as_str(self) -> &'static str {
        match self {
            Criterion::Name => "name",
            Criterion::Email => "email",
        }
    }

    /// Look up a criterion by its wire name. Names are matched exactly.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }

    fn compile(self, value: &str) -> SupplierPredicate {
        match self {
            Criterion::Name => SupplierPredicate::NameContains(value.to_string()),
            Criterion::Email => SupplierPredicate::EmailContains(value.to_string()),
        }
    }
}

impl core::fmt::Display for Criterion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter over suppliers. Substring matches are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupplierPredicate {
    NameContains(String),
    EmailContains(String),
    /// Conjunction; an empty list matches everything.
    AllOf(Vec<SupplierPredicate>),
}

impl SupplierPredicate {
    pub fn matches(&self, supplier: &Supplier) -> bool {
        match self {
            SupplierPredicate::NameContains(needle) => contains_ignore_case(supplier.name(), needle),
            SupplierPredicate::EmailContains(needle) => {
                contains_ignore_case(supplier.email(), needle)
            }
            SupplierPredicate::AllOf(parts) => parts.iter().all(|p| p.matches(supplier)),
        }
    }

    /// Conjunction of `self` and `other`, flattening nested `AllOf`s.
    pub fn and(self, other: SupplierPredicate) -> SupplierPredicate {
        let mut parts = self.into_parts();
        parts.extend(other.into_parts());
        SupplierPredicate::AllOf(parts)
    }

    /// Leaf predicates of this predicate, in order.
    pub fn leaves(&self) -> Vec<&SupplierPredicate> {
        match self {
            SupplierPredicate::AllOf(parts) => parts.iter().flat_map(|p| p.leaves()).collect(),
            leaf => vec![leaf],
        }
    }

    fn into_parts(self) -> Vec<SupplierPredicate> {
        match self {
            SupplierPredicate::AllOf(parts) => parts,
            leaf => vec![leaf],
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Escape `LIKE` metacharacters so the value matches literally (escape char `\`).
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Why a criteria set cannot be turned into a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnusableCriteria {
    UnknownCriterion(String),
    ValueCount { criterion: Criterion, count: usize },
}

impl core::fmt::Display for UnusableCriteria {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UnusableCriteria::UnknownCriterion(name) => write!(f, "unknown criterion {name:?}"),
            UnusableCriteria::ValueCount { criterion, count } => {
                write!(f, "criterion {criterion} needs exactly one value, got {count}")
            }
        }
    }
}

/// Result of compiling a criteria set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateOutcome {
    /// No criteria at all: find everything.
    Unconstrained,
    Usable(SupplierPredicate),
    /// At least one criterion was unusable; the whole set is rejected.
    Unusable(UnusableCriteria),
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PredicateBuilder;

impl PredicateBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, criteria: &SearchCriteria) -> PredicateOutcome {
        if criteria.is_empty() {
            return PredicateOutcome::Unconstrained;
        }

        let mut parts = Vec::with_capacity(criteria.len());
        for (name, values) in criteria.iter() {
            let Some(criterion) = Criterion::from_name(name) else {
                debug!(criterion = name, "unknown search criterion");
                return PredicateOutcome::Unusable(UnusableCriteria::UnknownCriterion(
                    name.to_string(),
                ));
            };
            let [value] = values else {
                debug!(%criterion, count = values.len(), "criterion needs exactly one value");
                return PredicateOutcome::Unusable(UnusableCriteria::ValueCount {
                    criterion,
                    count: values.len(),
                });
            };
            parts.push(criterion.compile(value));
        }

        let predicate = match parts.len() {
            1 => parts.remove(0),
            _ => SupplierPredicate::AllOf(parts),
        };
        PredicateOutcome::Usable(predicate)
    }
}
