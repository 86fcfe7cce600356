//! Custom Axum extractors.

pub mod caller;

pub use caller::{CallerId, DEFAULT_USER_ID, USER_ID_HEADER};
