//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for deviations and the
//!   category/type catalog.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - One write call commits exactly one transaction.
//! - Single-row reads return `Ok(None)` on miss; deletes of missing rows
//!   return `RepoError::NotFound`.
//! - Store failures are propagated unchanged, never retried.

pub mod catalog_repo;
pub mod deviation_repo;
mod rows;
mod schema;
