//! Quarry: the dialect-aware database access layer.
//!
//! Queries are plain values ([`Query`]) compiled by the [`Dialect`] bound to a
//! [`Connection`] and executed through a driver crate (`quarry-sqlite`,
//! `quarry-postgres`, `quarry-mysql`).
pub use quarry_core::*;
