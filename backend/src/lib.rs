//! Lending backend: borrow-request lifecycle coordination for shared assets.
//!
//! - [`domain`] holds the lending rules, ports and services.
//! - [`inbound`] exposes them over HTTP.
//! - [`outbound`] persists them in PostgreSQL.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use middleware::Trace;
