use chrono::{Duration, Utc};
use deviations_core::db::open_db_in_memory;
use deviations_core::{
    CatalogRepository, DeviationCategory, DeviationService, DeviationServiceError,
    DeviationType, ReportDeviationRequest, SqliteCatalogRepository, SqliteDeviationRepository,
    ValidationError,
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn request(deviation_type_id: Uuid, description: &str) -> ReportDeviationRequest {
    ReportDeviationRequest {
        deviation_type_id,
        reported_at: Utc::now() - Duration::minutes(5),
        description: description.to_string(),
        line_id: "12".to_string(),
        stop_place: Some("StopA".to_string()),
    }
}

#[test]
fn report_deviation_persists_against_stored_type() {
    let conn = open_db_in_memory().unwrap();
    let catalog = SqliteCatalogRepository::try_new(&conn).unwrap();
    let category = DeviationCategory::new("Late Departure Fees", Decimal::new(5000, 2)).unwrap();
    let late = DeviationType::new("Late Departure", category).unwrap();
    catalog.add_deviation_type(&late).unwrap();

    let service = DeviationService::new(
        SqliteDeviationRepository::try_new(&conn).unwrap(),
        SqliteCatalogRepository::try_new(&conn).unwrap(),
    );

    let reported = service
        .report_deviation(request(late.public_id(), "Bus 5 min late"))
        .unwrap();
    assert!(reported.created_at() > reported.reported_at());

    let fetched = service
        .get_deviation(reported.public_id())
        .unwrap()
        .unwrap();
    assert_eq!(fetched.line_id(), "12");
    assert_eq!(fetched.stop_place(), Some("StopA"));
    assert_eq!(fetched.deviation_type().public_id(), late.public_id());

    assert_eq!(service.list_deviations().unwrap().len(), 1);
}

#[test]
fn report_deviation_rejects_unknown_type() {
    let conn = open_db_in_memory().unwrap();
    let service = DeviationService::new(
        SqliteDeviationRepository::try_new(&conn).unwrap(),
        SqliteCatalogRepository::try_new(&conn).unwrap(),
    );

    let unknown = Uuid::new_v4();
    let err = service
        .report_deviation(request(unknown, "Bus 5 min late"))
        .unwrap_err();
    assert!(matches!(err, DeviationServiceError::UnknownDeviationType(id) if id == unknown));
    assert!(service.list_deviations().unwrap().is_empty());
}

#[test]
fn report_deviation_surfaces_validation_failures() {
    let conn = open_db_in_memory().unwrap();
    let catalog = SqliteCatalogRepository::try_new(&conn).unwrap();
    let category = DeviationCategory::new("Fees", Decimal::ONE).unwrap();
    let late = DeviationType::new("Late Departure", category).unwrap();
    catalog.add_deviation_type(&late).unwrap();

    let service = DeviationService::new(
        SqliteDeviationRepository::try_new(&conn).unwrap(),
        catalog,
    );

    let err = service
        .report_deviation(request(late.public_id(), "   "))
        .unwrap_err();
    assert!(matches!(
        err,
        DeviationServiceError::Validation(ValidationError::BlankField("description"))
    ));
    assert!(service.list_deviations().unwrap().is_empty());
}
