//! Deviation category: a named, fee-bearing grouping of deviation types.

use crate::model::{require_text, ValidationError};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Public identifier of a [`DeviationCategory`].
pub type CategoryId = Uuid;

/// Fee-bearing grouping of deviation types.
///
/// Deleting a category from the store removes every type filed under it,
/// and every deviation filed under those types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviationCategory {
    #[serde(skip_serializing)]
    id: Option<i64>,
    public_id: CategoryId,
    name: String,
    fee: Decimal,
}

impl DeviationCategory {
    /// Creates a category with a freshly generated public id.
    ///
    /// # Errors
    /// - `BlankField("name")` when `name` is blank.
    /// - `NegativeFee` when `fee < 0`.
    pub fn new(name: impl Into<String>, fee: Decimal) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4(), name, fee)
    }

    /// Creates a category with a caller-provided public id.
    ///
    /// Used when the identity already exists outside this process.
    pub fn with_id(
        public_id: CategoryId,
        name: impl Into<String>,
        fee: Decimal,
    ) -> Result<Self, ValidationError> {
        if public_id.is_nil() {
            return Err(ValidationError::NilPublicId);
        }
        if fee < Decimal::ZERO {
            return Err(ValidationError::NegativeFee(fee));
        }

        Ok(Self {
            id: None,
            public_id,
            name: require_text("name", name)?,
            fee,
        })
    }

    pub(crate) fn with_row_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Store-assigned identity; `None` until the category has been read back
    /// from the database.
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn public_id(&self) -> CategoryId {
        self.public_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Monetary fee charged for deviations in this category.
    pub fn fee(&self) -> Decimal {
        self.fee
    }
}
