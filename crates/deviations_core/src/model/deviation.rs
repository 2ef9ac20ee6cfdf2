//! Deviation domain model.
//!
//! # Responsibility
//! - Represent one reported service incident tied to a line and an
//!   optional stop place.
//! - Assign identity and record time at construction.
//!
//! # Invariants
//! - `public_id` is generated once and never reassigned.
//! - `created_at` is system time at construction; `reported_at` is supplied
//!   by the caller. Both are kept at millisecond precision.
//! - `description` and `line_id` are non-blank; `stop_place` is either
//!   absent or non-blank.

use crate::model::deviation_type::DeviationType;
use crate::model::{require_text, trim_millis, ValidationError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Public identifier of a [`Deviation`].
pub type DeviationId = Uuid;

/// Recorded service incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deviation {
    #[serde(skip_serializing)]
    id: Option<i64>,
    public_id: DeviationId,
    created_at: DateTime<Utc>,
    reported_at: DateTime<Utc>,
    description: String,
    line_id: String,
    stop_place: Option<String>,
    deviation_type: DeviationType,
}

impl Deviation {
    /// Creates a deviation stamped with the current time.
    ///
    /// # Errors
    /// - `BlankField` when `description`, `line_id` or a provided
    ///   `stop_place` is blank.
    pub fn new(
        reported_at: DateTime<Utc>,
        description: impl Into<String>,
        line_id: impl Into<String>,
        stop_place: Option<String>,
        deviation_type: DeviationType,
    ) -> Result<Self, ValidationError> {
        Self::with_id(
            Uuid::new_v4(),
            Utc::now(),
            reported_at,
            description,
            line_id,
            stop_place,
            deviation_type,
        )
    }

    /// Creates a deviation with caller-provided identity and record time.
    ///
    /// Used by import paths and when rehydrating persisted rows.
    pub fn with_id(
        public_id: DeviationId,
        created_at: DateTime<Utc>,
        reported_at: DateTime<Utc>,
        description: impl Into<String>,
        line_id: impl Into<String>,
        stop_place: Option<String>,
        deviation_type: DeviationType,
    ) -> Result<Self, ValidationError> {
        if public_id.is_nil() {
            return Err(ValidationError::NilPublicId);
        }

        let stop_place = stop_place
            .map(|value| require_text("stop_place", value))
            .transpose()?;

        Ok(Self {
            id: None,
            public_id,
            created_at: trim_millis(created_at),
            reported_at: trim_millis(reported_at),
            description: require_text("description", description)?,
            line_id: require_text("line_id", line_id)?,
            stop_place,
            deviation_type,
        })
    }

    pub(crate) fn with_row_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Store-assigned identity. Never exposed outside the process.
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn public_id(&self) -> DeviationId {
        self.public_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn reported_at(&self) -> DateTime<Utc> {
        self.reported_at
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn line_id(&self) -> &str {
        &self.line_id
    }

    pub fn stop_place(&self) -> Option<&str> {
        self.stop_place.as_deref()
    }

    pub fn deviation_type(&self) -> &DeviationType {
        &self.deviation_type
    }
}
