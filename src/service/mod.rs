//! Query and mutation services over a `StoreHandle`.

mod mutation;
mod query;
mod validation;
pub use mutation::MutationService;
pub use query::QueryService;
pub use validation::RequestValidator;
