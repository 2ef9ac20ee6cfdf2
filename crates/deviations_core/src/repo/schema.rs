//! Guards that a borrowed connection is migrated before repositories use it.

use crate::db::migrations::{current_version, latest_version};
use crate::repo::deviation_repo::{RepoError, RepoResult};
use rusqlite::Connection;

const REQUIRED_TABLES: &[(&str, &[&str])] = &[
    ("deviation_categories", &["id", "public_id", "name", "fee"]),
    (
        "deviation_types",
        &["id", "public_id", "name", "deviation_category_id"],
    ),
    (
        "deviations",
        &[
            "id",
            "public_id",
            "created_at",
            "reported_at",
            "description",
            "line_id",
            "stop_place",
            "deviation_type_id",
        ],
    ),
];

pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM pragma_table_info(?1)
            WHERE name = ?2
        );",
        [table, column],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
