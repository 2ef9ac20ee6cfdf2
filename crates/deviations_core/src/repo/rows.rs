//! Row mapping and parent inserts shared by the SQLite repositories.
//!
//! Every query that hydrates a type or a deviation aliases its columns with
//! the `category_*`, `type_*` and `deviation_*` prefixes used here.

use crate::model::deviation::Deviation;
use crate::model::deviation_category::DeviationCategory;
use crate::model::deviation_type::DeviationType;
use crate::repo::deviation_repo::{RepoError, RepoResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

pub(crate) const CATEGORY_COLUMNS_SQL: &str = "
    c.id AS category_id,
    c.public_id AS category_public_id,
    c.name AS category_name,
    c.fee AS category_fee";

pub(crate) const TYPE_COLUMNS_SQL: &str = "
    t.id AS type_id,
    t.public_id AS type_public_id,
    t.name AS type_name";

pub(crate) fn parse_category_row(row: &Row<'_>) -> RepoResult<DeviationCategory> {
    let public_id = parse_uuid(&row.get::<_, String>("category_public_id")?, "category")?;
    let fee_text: String = row.get("category_fee")?;
    let fee = Decimal::from_str(&fee_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid fee value `{fee_text}` in deviation_categories.fee"
        ))
    })?;

    let category = DeviationCategory::with_id(public_id, row.get::<_, String>("category_name")?, fee)
        .map_err(|err| invalid_entity("deviation_categories", public_id, err))?;
    Ok(category.with_row_id(row.get("category_id")?))
}

pub(crate) fn parse_type_row(row: &Row<'_>) -> RepoResult<DeviationType> {
    let category = parse_category_row(row)?;
    let public_id = parse_uuid(&row.get::<_, String>("type_public_id")?, "type")?;

    let deviation_type =
        DeviationType::with_id(public_id, row.get::<_, String>("type_name")?, category)
            .map_err(|err| invalid_entity("deviation_types", public_id, err))?;
    Ok(deviation_type.with_row_id(row.get("type_id")?))
}

pub(crate) fn parse_deviation_row(row: &Row<'_>) -> RepoResult<Deviation> {
    let deviation_type = parse_type_row(row)?;
    let public_id = parse_uuid(
        &row.get::<_, String>("deviation_public_id")?,
        "deviation",
    )?;

    let deviation = Deviation::with_id(
        public_id,
        parse_epoch_millis(row.get("created_at")?, "created_at")?,
        parse_epoch_millis(row.get("reported_at")?, "reported_at")?,
        row.get::<_, String>("description")?,
        row.get::<_, String>("line_id")?,
        row.get::<_, Option<String>>("stop_place")?,
        deviation_type,
    )
    .map_err(|err| invalid_entity("deviations", public_id, err))?;
    Ok(deviation.with_row_id(row.get("deviation_id")?))
}

/// Inserts `category` unless a row with the same public id already exists.
///
/// Returns whether a row was written.
pub(crate) fn insert_category_if_absent(
    conn: &Connection,
    category: &DeviationCategory,
) -> RepoResult<bool> {
    let changed = conn.execute(
        "INSERT INTO deviation_categories (public_id, name, fee)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (public_id) DO NOTHING;",
        params![
            category.public_id().to_string(),
            category.name(),
            category.fee().to_string(),
        ],
    )?;
    Ok(changed == 1)
}

/// Inserts `deviation_type`, and its category first, unless the type is
/// already stored.
///
/// A stored type must still belong to the category the caller holds; the
/// category is only touched when the type row is absent.
pub(crate) fn insert_type_if_absent(
    conn: &Connection,
    deviation_type: &DeviationType,
) -> RepoResult<bool> {
    let type_id = deviation_type.public_id().to_string();
    let category_id = deviation_type.category().public_id().to_string();

    let stored_category: Option<String> = conn
        .query_row(
            "SELECT c.public_id
             FROM deviation_types t
             INNER JOIN deviation_categories c ON c.id = t.deviation_category_id
             WHERE t.public_id = ?1;",
            [&type_id],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(stored) = stored_category {
        if stored != category_id {
            return Err(RepoError::InvalidData(format!(
                "deviation type {type_id} is stored under category {stored}, not {category_id}"
            )));
        }
        return Ok(false);
    }

    insert_category_if_absent(conn, deviation_type.category())?;
    conn.execute(
        "INSERT INTO deviation_types (public_id, name, deviation_category_id)
         SELECT ?1, ?2, id
         FROM deviation_categories
         WHERE public_id = ?3;",
        params![type_id, deviation_type.name(), category_id],
    )?;
    Ok(true)
}

fn parse_uuid(value: &str, entity: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| {
        RepoError::InvalidData(format!("invalid {entity} public_id value `{value}`"))
    })
}

fn parse_epoch_millis(value: i64, column: &'static str) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{value}` in deviations.{column}"
        ))
    })
}

fn invalid_entity(table: &str, public_id: Uuid, err: impl std::fmt::Display) -> RepoError {
    RepoError::InvalidData(format!("row {public_id} in {table} failed validation: {err}"))
}
