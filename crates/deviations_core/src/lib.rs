//! Core domain logic for deviation tracking.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, DeviationsConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::deviation::{Deviation, DeviationId};
pub use model::deviation_category::{CategoryId, DeviationCategory};
pub use model::deviation_type::{DeviationType, DeviationTypeId};
pub use model::ValidationError;
pub use repo::catalog_repo::{CatalogRepository, SqliteCatalogRepository};
pub use repo::deviation_repo::{
    DeviationRepository, RepoError, RepoResult, SqliteDeviationRepository,
};
pub use service::deviation_service::{
    DeviationService, DeviationServiceError, DeviationServiceResult, ReportDeviationRequest,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
