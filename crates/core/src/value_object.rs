//! Value object trait: equality by value, not identity.
//!
//! Children of an aggregate (a supplier's manager, its delivery lines) are
//! value objects: they are defined entirely by their attributes and only exist
//! inside their owning aggregate.

/// Marker trait for value objects.
///
/// Value objects are compared by value and cloned freely. Two value objects
/// with the same attributes are interchangeable.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Delivery {
///     article: String,
/// }
///
/// impl ValueObject for Delivery {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
