//! Field validation primitives.
//!
//! Validation never short-circuits: every rule is evaluated and each failure is
//! recorded as a [`Violation`] (field path → rule → message), so callers can
//! report all problems at once.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{DomainError, DomainResult};

/// Which set of rules applies to a candidate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValidationGroup {
    /// Full aggregate construction; owned children are mandatory.
    Create,
    /// Rework of an existing aggregate; absent children are not checked.
    Update,
}

/// The constraint a field failed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Rule {
    NotNull,
    Pattern,
    Email,
    Min,
    Max,
    Size,
}

impl Rule {
    pub fn as_str(self) -> &'static str {
        match self {
            Rule::NotNull => "NotNull",
            Rule::Pattern => "Pattern",
            Rule::Email => "Email",
            Rule::Min => "Min",
            Rule::Max => "Max",
            Rule::Size => "Size",
        }
    }
}

impl core::fmt::Display for Rule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed constraint on one field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Violation {
    /// Dotted field path, e.g. `manager.salary` or `deliveries[1].article`.
    pub path: String,
    pub rule: Rule,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, rule: Rule, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            rule,
            message: message.into(),
        }
    }

    /// Path segments (`deliveries[1].article` → `["deliveries", "1", "article"]`).
    pub fn path_segments(&self) -> Vec<String> {
        self.path
            .split('.')
            .flat_map(|segment| match segment.split_once('[') {
                Some((field, rest)) => vec![field.to_string(), rest.trim_end_matches(']').to_string()],
                None => vec![segment.to_string()],
            })
            .collect()
    }
}

impl core::fmt::Display for Violation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {} {}", self.path, self.rule, self.message)
    }
}

/// Ordered set of violations.
///
/// Ordering is by path, then rule, so evaluating the same candidate twice
/// yields an equal set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Violations(BTreeSet<Violation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.0.insert(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    pub fn contains(&self, path: &str, rule: Rule) -> bool {
        self.0.iter().any(|v| v.path == path && v.rule == rule)
    }

    /// Merge violations of a nested value, prefixing their paths.
    pub fn extend_nested(&mut self, prefix: &str, nested: Violations) {
        for v in nested.0 {
            self.0.insert(Violation {
                path: format!("{prefix}.{}", v.path),
                ..v
            });
        }
    }

    /// `Ok(())` when empty, `ConstraintViolations` otherwise.
    pub fn into_result(self) -> DomainResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::ConstraintViolations(self))
        }
    }

    pub fn check_capitalized_word(&mut self, path: &str, value: &str) {
        if !is_capitalized_word(value) {
            self.push(Violation::new(
                path,
                Rule::Pattern,
                format!("must match \"{CAPITALIZED_WORD_PATTERN}\""),
            ));
        }
    }

    pub fn check_email(&mut self, path: &str, value: &str) {
        if !is_email(value) {
            self.push(Violation::new(
                path,
                Rule::Email,
                "must be a well-formed email address",
            ));
        }
    }

    pub fn check_range(&mut self, path: &str, value: i64, min: i64, max: i64) {
        if value < min {
            self.push(Violation::new(
                path,
                Rule::Min,
                format!("must be greater than or equal to {min}"),
            ));
        }
        if value > max {
            self.push(Violation::new(
                path,
                Rule::Max,
                format!("must be less than or equal to {max}"),
            ));
        }
    }

    pub fn check_max_chars(&mut self, path: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.push(Violation::new(
                path,
                Rule::Size,
                format!("size must be between 0 and {max}"),
            ));
        }
    }

    pub fn check_present<T>(&mut self, path: &str, value: Option<&T>) {
        if value.is_none() {
            self.push(Violation::new(path, Rule::NotNull, "must not be null"));
        }
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::collections::btree_set::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<Violation> for Violations {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl core::fmt::Display for Violations {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (idx, v) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Field validator for a candidate value.
pub trait Validate {
    /// Evaluate every rule of `group` and return all violations.
    fn validate(&self, group: ValidationGroup) -> Violations;

    fn ensure_valid(&self, group: ValidationGroup) -> DomainResult<()> {
        self.validate(group).into_result()
    }
}

/// Human-readable form of the capitalized-word rule.
pub const CAPITALIZED_WORD_PATTERN: &str = "[A-ZÄÖÜ][a-zäöüß]+";

/// One upper-case letter followed by at least one lower-case letter
/// (German umlauts and ß included).
pub fn is_capitalized_word(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_uppercase() || matches!(first, 'Ä' | 'Ö' | 'Ü')) {
        return false;
    }
    let mut rest = chars.peekable();
    if rest.peek().is_none() {
        return false;
    }
    rest.all(|c| c.is_ascii_lowercase() || matches!(c, 'ä' | 'ö' | 'ü' | 'ß'))
}

const LOCAL_PART_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~-";

/// Pragmatic address check: `local@domain` with dot-separated labels.
pub fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > 64 || domain.is_empty() || domain.contains('@') {
        return false;
    }
    let local_ok = local
        .split('.')
        .all(|atom| !atom.is_empty() && atom.chars().all(|c| c.is_alphanumeric() || LOCAL_PART_SPECIALS.contains(c)));
    let domain_ok = domain.split('.').all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    });
    local_ok && domain_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn capitalized_word_accepts_umlauts() {
        assert!(is_capitalized_word("Gold"));
        assert!(is_capitalized_word("Äpfelhof"));
        assert!(is_capitalized_word("Straße"));
        assert!(!is_capitalized_word(""));
        assert!(!is_capitalized_word("G"));
        assert!(!is_capitalized_word("gold"));
        assert!(!is_capitalized_word("GoldBar"));
        assert!(!is_capitalized_word("Gold Bar"));
    }

    #[test]
    fn email_rejects_obvious_garbage() {
        assert!(is_email("paprika@acme.de"));
        assert!(is_email("first.last+tag@mail.acme.de"));
        assert!(!is_email(""));
        assert!(!is_email("no-at-sign"));
        assert!(!is_email("@acme.de"));
        assert!(!is_email("a@@acme.de"));
        assert!(!is_email("a@acme..de"));
        assert!(!is_email("a b@acme.de"));
        assert!(!is_email("a@-acme.de"));
    }

    #[test]
    fn range_reports_min_and_max_separately() {
        let mut v = Violations::new();
        v.check_range("salary", -1, 0, 10);
        v.check_range("other", 11, 0, 10);
        assert!(v.contains("salary", Rule::Min));
        assert!(v.contains("other", Rule::Max));
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn nested_paths_are_prefixed() {
        let mut inner = Violations::new();
        inner.check_capitalized_word("name", "x");
        let mut outer = Violations::new();
        outer.extend_nested("manager", inner);
        assert!(outer.contains("manager.name", Rule::Pattern));
    }

    #[test]
    fn path_segments_split_indices() {
        let v = Violation::new("deliveries[1].article", Rule::Pattern, "bad");
        assert_eq!(v.path_segments(), vec!["deliveries", "1", "article"]);
    }

    #[test]
    fn empty_set_converts_to_ok() {
        assert_eq!(Violations::new().into_result(), Ok(()));
        let mut v = Violations::new();
        v.check_present::<u8>("manager", None);
        assert!(matches!(v.into_result(), Err(DomainError::ConstraintViolations(_))));
    }

    proptest! {
        #[test]
        fn generated_capitalized_words_pass(word in "[A-ZÄÖÜ][a-zäöüß]{1,16}") {
            prop_assert!(is_capitalized_word(&word));
        }

        #[test]
        fn lowercase_initial_always_fails(word in "[a-z][a-z]{0,16}") {
            prop_assert!(!is_capitalized_word(&word));
        }
    }
}
