//! Deviation type: a named classification owned by exactly one category.

use crate::model::deviation_category::DeviationCategory;
use crate::model::{require_text, ValidationError};
use serde::Serialize;
use uuid::Uuid;

/// Public identifier of a [`DeviationType`].
pub type DeviationTypeId = Uuid;

/// Named classification of deviations, e.g. "Late Departure".
///
/// The parent category is carried by value; reads hydrate it from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviationType {
    #[serde(skip_serializing)]
    id: Option<i64>,
    public_id: DeviationTypeId,
    name: String,
    category: DeviationCategory,
}

impl DeviationType {
    /// Creates a type under `category` with a freshly generated public id.
    pub fn new(
        name: impl Into<String>,
        category: DeviationCategory,
    ) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4(), name, category)
    }

    /// Creates a type with a caller-provided public id.
    pub fn with_id(
        public_id: DeviationTypeId,
        name: impl Into<String>,
        category: DeviationCategory,
    ) -> Result<Self, ValidationError> {
        if public_id.is_nil() {
            return Err(ValidationError::NilPublicId);
        }

        Ok(Self {
            id: None,
            public_id,
            name: require_text("name", name)?,
            category,
        })
    }

    pub(crate) fn with_row_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn public_id(&self) -> DeviationTypeId {
        self.public_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &DeviationCategory {
        &self.category
    }
}
