use chrono::{TimeZone, Timelike, Utc};
use deviations_core::{Deviation, DeviationCategory, DeviationType, ValidationError};
use rust_decimal::Decimal;
use std::collections::HashSet;
use uuid::Uuid;

fn late_departure_type() -> DeviationType {
    let category = DeviationCategory::new("Late Departure Fees", Decimal::new(5000, 2)).unwrap();
    DeviationType::new("Late Departure", category).unwrap()
}

#[test]
fn factories_assign_fresh_public_ids() {
    let deviation_type = late_departure_type();
    let mut seen = HashSet::new();

    for _ in 0..100 {
        let deviation = Deviation::new(
            Utc::now(),
            "Bus 5 min late",
            "12",
            None,
            deviation_type.clone(),
        )
        .unwrap();
        assert!(!deviation.public_id().is_nil());
        assert!(seen.insert(deviation.public_id()));
    }

    let first = DeviationCategory::new("Fees", Decimal::ONE).unwrap();
    let second = DeviationCategory::new("Fees", Decimal::ONE).unwrap();
    assert_ne!(first.public_id(), second.public_id());
}

#[test]
fn new_entities_have_no_store_identity() {
    let deviation_type = late_departure_type();
    assert_eq!(deviation_type.id(), None);
    assert_eq!(deviation_type.category().id(), None);

    let deviation =
        Deviation::new(Utc::now(), "Bus 5 min late", "12", None, deviation_type).unwrap();
    assert_eq!(deviation.id(), None);
}

#[test]
fn category_rejects_blank_name_and_negative_fee() {
    assert_eq!(
        DeviationCategory::new("   ", Decimal::ONE).unwrap_err(),
        ValidationError::BlankField("name")
    );

    let fee = Decimal::new(-1, 2);
    assert_eq!(
        DeviationCategory::new("Refunds", fee).unwrap_err(),
        ValidationError::NegativeFee(fee)
    );

    let free = DeviationCategory::new("Courtesy", Decimal::ZERO).unwrap();
    assert_eq!(free.fee(), Decimal::ZERO);
}

#[test]
fn with_id_rejects_nil_public_id() {
    let category = DeviationCategory::new("Fees", Decimal::ONE).unwrap();

    assert_eq!(
        DeviationCategory::with_id(Uuid::nil(), "Fees", Decimal::ONE).unwrap_err(),
        ValidationError::NilPublicId
    );
    assert_eq!(
        DeviationType::with_id(Uuid::nil(), "Late", category.clone()).unwrap_err(),
        ValidationError::NilPublicId
    );

    let deviation_type = DeviationType::new("Late", category).unwrap();
    let err = Deviation::with_id(
        Uuid::nil(),
        Utc::now(),
        Utc::now(),
        "Bus 5 min late",
        "12",
        None,
        deviation_type,
    )
    .unwrap_err();
    assert_eq!(err, ValidationError::NilPublicId);
}

#[test]
fn deviation_requires_description_line_and_non_blank_stop_place() {
    let deviation_type = late_departure_type();

    let err = Deviation::new(Utc::now(), " ", "12", None, deviation_type.clone()).unwrap_err();
    assert_eq!(err, ValidationError::BlankField("description"));

    let err = Deviation::new(Utc::now(), "late", "", None, deviation_type.clone()).unwrap_err();
    assert_eq!(err, ValidationError::BlankField("line_id"));

    let err = Deviation::new(
        Utc::now(),
        "late",
        "12",
        Some("\t".to_string()),
        deviation_type,
    )
    .unwrap_err();
    assert_eq!(err, ValidationError::BlankField("stop_place"));
}

#[test]
fn deviation_trims_text_fields() {
    let deviation = Deviation::new(
        Utc::now(),
        "  Bus 5 min late ",
        " 12 ",
        Some(" StopA ".to_string()),
        late_departure_type(),
    )
    .unwrap();

    assert_eq!(deviation.description(), "Bus 5 min late");
    assert_eq!(deviation.line_id(), "12");
    assert_eq!(deviation.stop_place(), Some("StopA"));
}

#[test]
fn deviation_timestamps_are_millisecond_precise() {
    let reported_at = Utc
        .with_ymd_and_hms(2024, 10, 23, 13, 4, 24)
        .unwrap()
        .with_nanosecond(987_654_321)
        .unwrap();
    let before = Utc::now().timestamp_millis();

    let deviation =
        Deviation::new(reported_at, "late", "12", None, late_departure_type()).unwrap();

    let after = Utc::now().timestamp_millis();
    assert_eq!(deviation.reported_at().nanosecond(), 987_000_000);
    assert_eq!(deviation.created_at().nanosecond() % 1_000_000, 0);
    let created = deviation.created_at().timestamp_millis();
    assert!(before <= created && created <= after);
}

#[test]
fn deviation_serialization_uses_public_fields_only() {
    let deviation = Deviation::new(
        Utc::now(),
        "Bus 5 min late",
        "12",
        Some("StopA".to_string()),
        late_departure_type(),
    )
    .unwrap();

    let json = serde_json::to_value(&deviation).unwrap();
    assert_eq!(json["public_id"], deviation.public_id().to_string());
    assert_eq!(json["description"], "Bus 5 min late");
    assert_eq!(json["line_id"], "12");
    assert_eq!(json["stop_place"], "StopA");
    assert_eq!(json["deviation_type"]["name"], "Late Departure");
    assert_eq!(
        json["deviation_type"]["category"]["name"],
        "Late Departure Fees"
    );
    assert!(json.get("id").is_none());
    assert!(json["deviation_type"].get("id").is_none());
}
