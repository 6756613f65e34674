//! Request validation: per-operation constraint sets, a middleware that
//! enforces them by operation name, and a typed `ValidatedJson` extractor.

pub mod auth;
mod extract;
mod middleware;

pub use auth::{schema_for, AuthOperation, InputSource, OperationSchema, AUTH_SCHEMAS};
pub use extract::ValidatedJson;
pub use middleware::{validate, MAX_BODY_BYTES};
