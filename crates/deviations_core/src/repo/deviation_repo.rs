//! Deviation repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide fetch-by-id, fetch-all and add over canonical `deviations`
//!   storage.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - `add_deviation` is one `IMMEDIATE` transaction: parent type/category
//!   rows missing from the store are inserted in that same unit.
//! - Existing parent rows are never rewritten by a deviation add, and a
//!   stored type must belong to the deviation's category.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::deviation::{Deviation, DeviationId};
use crate::repo::rows::{
    insert_type_if_absent, parse_deviation_row, CATEGORY_COLUMNS_SQL, TYPE_COLUMNS_SQL,
};
use crate::repo::schema::ensure_connection_ready;
use log::debug;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by deviation and catalog persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// No row carries the given public id.
    NotFound(Uuid),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted back into a domain value.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for deviation records.
///
/// No update or delete: deviations are append-only. Removal only happens
/// through cascading deletes of their type or category.
pub trait DeviationRepository {
    /// Returns the deviation with `public_id`, or `None` when absent.
    fn get_deviation(&self, public_id: DeviationId) -> RepoResult<Option<Deviation>>;
    /// Returns every stored deviation in the store's natural order.
    fn get_deviations(&self) -> RepoResult<Vec<Deviation>>;
    /// Persists `deviation` in one committed unit and returns its public id.
    fn add_deviation(&self, deviation: &Deviation) -> RepoResult<DeviationId>;
}

/// SQLite-backed deviation repository.
pub struct SqliteDeviationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDeviationRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn select_sql(filter: &str) -> String {
        format!(
            "SELECT
                d.id AS deviation_id,
                d.public_id AS deviation_public_id,
                d.created_at,
                d.reported_at,
                d.description,
                d.line_id,
                d.stop_place,
                {TYPE_COLUMNS_SQL},
                {CATEGORY_COLUMNS_SQL}
             FROM deviations d
             INNER JOIN deviation_types t ON t.id = d.deviation_type_id
             INNER JOIN deviation_categories c ON c.id = t.deviation_category_id
             {filter};"
        )
    }
}

impl DeviationRepository for SqliteDeviationRepository<'_> {
    fn get_deviation(&self, public_id: DeviationId) -> RepoResult<Option<Deviation>> {
        let mut stmt = self
            .conn
            .prepare(&Self::select_sql("WHERE d.public_id = ?1"))?;

        let mut rows = stmt.query([public_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_deviation_row(row)?));
        }

        Ok(None)
    }

    fn get_deviations(&self) -> RepoResult<Vec<Deviation>> {
        let mut stmt = self.conn.prepare(&Self::select_sql(""))?;
        let mut rows = stmt.query([])?;
        let mut deviations = Vec::new();

        while let Some(row) = rows.next()? {
            deviations.push(parse_deviation_row(row)?);
        }

        Ok(deviations)
    }

    fn add_deviation(&self, deviation: &Deviation) -> RepoResult<DeviationId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        insert_type_if_absent(&tx, deviation.deviation_type())?;

        let changed = tx.execute(
            "INSERT INTO deviations (
                public_id,
                created_at,
                reported_at,
                description,
                line_id,
                stop_place,
                deviation_type_id
            )
            SELECT ?1, ?2, ?3, ?4, ?5, ?6, id
            FROM deviation_types
            WHERE public_id = ?7;",
            params![
                deviation.public_id().to_string(),
                deviation.created_at().timestamp_millis(),
                deviation.reported_at().timestamp_millis(),
                deviation.description(),
                deviation.line_id(),
                deviation.stop_place(),
                deviation.deviation_type().public_id().to_string(),
            ],
        )?;
        debug_assert_eq!(changed, 1, "deviation type row is present in this transaction");

        tx.commit()?;
        debug!(
            "event=deviation_add module=repo status=ok deviation_id={} type_id={}",
            deviation.public_id(),
            deviation.deviation_type().public_id()
        );
        Ok(deviation.public_id())
    }
}
