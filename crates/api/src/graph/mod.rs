//! Graph adapter: typed query/mutation resolvers over the supplier core.
//!
//! Resolvers take already-decoded arguments and return either a payload or a
//! list of [`GraphError`]s, one per problem, each carrying the argument path
//! it refers to.

pub mod errors;
pub mod resolvers;

pub use errors::{GraphError, GraphErrorType, GraphResult};
pub use resolvers::{
    CreatePayload, DeliveryInput, ManagerInput, SupplierFilter, SupplierInput, SupplierNode,
    SupplierResolvers, UpdatePayload,
};
