//! Domain model for deviations and their fee-bearing classification.
//!
//! # Responsibility
//! - Define the three entities persisted by core: categories, types and
//!   deviations.
//! - Own field validation so every constructed value is storable.
//!
//! # Invariants
//! - Entities are only built through validating constructors.
//! - Public identifiers are random, never nil, and never change.
//! - No entity exposes a mutator; values are append-only projections of the
//!   store.

pub mod deviation;
pub mod deviation_category;
pub mod deviation_type;
mod validation;

pub use validation::ValidationError;
pub(crate) use validation::{require_text, trim_millis};
