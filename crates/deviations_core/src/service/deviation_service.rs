//! Deviation use-case service.
//!
//! # Responsibility
//! - Turn a report request into a validated `Deviation` and persist it.
//! - Resolve deviation types by public id through the catalog.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::deviation::{Deviation, DeviationId};
use crate::model::deviation_type::DeviationTypeId;
use crate::model::ValidationError;
use crate::repo::catalog_repo::CatalogRepository;
use crate::repo::deviation_repo::{DeviationRepository, RepoError};
use chrono::{DateTime, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for deviation use-cases.
#[derive(Debug)]
pub enum DeviationServiceError {
    /// Request fields failed entity validation.
    Validation(ValidationError),
    /// Referenced deviation type is not stored.
    UnknownDeviationType(DeviationTypeId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for DeviationServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::UnknownDeviationType(id) => write!(f, "unknown deviation type: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DeviationServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::UnknownDeviationType(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for DeviationServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for DeviationServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type DeviationServiceResult<T> = Result<T, DeviationServiceError>;

/// Request model for reporting one deviation against a stored type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDeviationRequest {
    pub deviation_type_id: DeviationTypeId,
    /// When the incident was reported by the outside party.
    pub reported_at: DateTime<Utc>,
    pub description: String,
    pub line_id: String,
    pub stop_place: Option<String>,
}

/// Use-case service wrapper for deviation reporting and lookup.
pub struct DeviationService<D: DeviationRepository, C: CatalogRepository> {
    deviations: D,
    catalog: C,
}

impl<D: DeviationRepository, C: CatalogRepository> DeviationService<D, C> {
    /// Creates a service over the provided repository implementations.
    pub fn new(deviations: D, catalog: C) -> Self {
        Self {
            deviations,
            catalog,
        }
    }

    /// Builds and stores a deviation for `request`.
    ///
    /// # Contract
    /// - The deviation type must already be stored.
    /// - Returns the stored deviation, including its hydrated type.
    pub fn report_deviation(
        &self,
        request: ReportDeviationRequest,
    ) -> DeviationServiceResult<Deviation> {
        let deviation_type = self
            .catalog
            .get_deviation_type(request.deviation_type_id)?
            .ok_or(DeviationServiceError::UnknownDeviationType(
                request.deviation_type_id,
            ))?;

        let deviation = Deviation::new(
            request.reported_at,
            request.description,
            request.line_id,
            request.stop_place,
            deviation_type,
        )?;
        self.deviations.add_deviation(&deviation)?;

        info!(
            "event=deviation_report module=service status=ok deviation_id={} type_id={}",
            deviation.public_id(),
            request.deviation_type_id
        );
        Ok(deviation)
    }

    /// Gets one deviation by public id.
    pub fn get_deviation(&self, id: DeviationId) -> DeviationServiceResult<Option<Deviation>> {
        Ok(self.deviations.get_deviation(id)?)
    }

    /// Lists every stored deviation.
    pub fn list_deviations(&self) -> DeviationServiceResult<Vec<Deviation>> {
        Ok(self.deviations.get_deviations()?)
    }
}
