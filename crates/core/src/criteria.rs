//! Named search criteria as collected by the front ends.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Multi-valued mapping from criterion name to the raw values supplied for it.
///
/// Front ends collect this verbatim (e.g. from a query string); interpreting the
/// names is left to the predicate builder. Keys are kept sorted so diagnostic
/// messages are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchCriteria(BTreeMap<String, Vec<String>>);

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one value to a criterion (creating it if absent).
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.entry(name.into()).or_default().push(value.into());
    }

    /// Builder-style variant of [`SearchCriteria::push`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Replace all values of a criterion (an empty list is kept as-is).
    pub fn set(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.0.insert(name.into(), values);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// The sole criterion, if exactly one is present and it carries exactly one value.
    pub fn single(&self) -> Option<(&str, &str)> {
        if self.0.len() != 1 {
            return None;
        }
        let (name, values) = self.0.iter().next()?;
        match values.as_slice() {
            [value] => Some((name.as_str(), value.as_str())),
            _ => None,
        }
    }
}

impl<K, V> FromIterator<(K, V)> for SearchCriteria
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut criteria = SearchCriteria::new();
        for (name, value) in iter {
            criteria.push(name, value);
        }
        criteria
    }
}

impl core::fmt::Display for SearchCriteria {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("{")?;
        for (idx, (name, values)) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}=[{}]", values.join(", "))?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_repeated_names_into_one_criterion() {
        let criteria: SearchCriteria =
            [("name", "Alpha"), ("name", "Beta"), ("email", "x")].into_iter().collect();

        assert_eq!(criteria.len(), 2);
        assert_eq!(criteria.get("name").unwrap(), ["Alpha", "Beta"]);
        assert_eq!(criteria.single(), None);
    }

    #[test]
    fn single_requires_one_name_with_one_value() {
        let criteria = SearchCriteria::new().with("email", "a@b.de");
        assert_eq!(criteria.single(), Some(("email", "a@b.de")));

        let mut empty_values = SearchCriteria::new();
        empty_values.set("email", vec![]);
        assert_eq!(empty_values.single(), None);
    }

    #[test]
    fn display_is_sorted_and_stable() {
        let criteria = SearchCriteria::new().with("name", "Paprika").with("email", "acme");
        assert_eq!(criteria.to_string(), "{email=[acme], name=[Paprika]}");
    }

    #[test]
    fn serializes_as_plain_map() {
        let criteria = SearchCriteria::new().with("name", "Paprika");
        let json = serde_json::to_value(&criteria).unwrap();
        assert_eq!(json, serde_json::json!({ "name": ["Paprika"] }));
    }
}
