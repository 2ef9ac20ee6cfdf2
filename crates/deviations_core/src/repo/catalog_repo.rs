//! Category/type catalog repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist and read the fee-bearing categories and the types filed under
//!   them.
//! - Own the delete paths; children go with their parent.
//!
//! # Invariants
//! - Deletes rely on `ON DELETE CASCADE` foreign keys, so a single statement
//!   removes the parent and all descendants atomically.
//! - Adding a type inserts its category first when the category is not yet
//!   stored, inside the same transaction.
//! - Adding an already stored category or type fails on the unique
//!   `public_id` constraint.

use crate::model::deviation_category::{CategoryId, DeviationCategory};
use crate::model::deviation_type::{DeviationType, DeviationTypeId};
use crate::repo::deviation_repo::{RepoError, RepoResult};
use crate::repo::rows::{
    insert_category_if_absent, parse_category_row, parse_type_row,
    CATEGORY_COLUMNS_SQL, TYPE_COLUMNS_SQL,
};
use crate::repo::schema::ensure_connection_ready;
use log::info;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

/// Repository interface for deviation categories and types.
pub trait CatalogRepository {
    /// Stores `category` and returns its public id.
    fn add_category(&self, category: &DeviationCategory) -> RepoResult<CategoryId>;
    fn get_category(&self, public_id: CategoryId) -> RepoResult<Option<DeviationCategory>>;
    fn list_categories(&self) -> RepoResult<Vec<DeviationCategory>>;
    /// Deletes a category together with its types and their deviations.
    fn delete_category(&self, public_id: CategoryId) -> RepoResult<()>;
    /// Stores `deviation_type`, plus its category when not yet stored.
    fn add_deviation_type(&self, deviation_type: &DeviationType) -> RepoResult<DeviationTypeId>;
    fn get_deviation_type(&self, public_id: DeviationTypeId)
        -> RepoResult<Option<DeviationType>>;
    /// Lists the types filed under one category.
    fn list_deviation_types_in_category(
        &self,
        category_id: CategoryId,
    ) -> RepoResult<Vec<DeviationType>>;
    /// Deletes a type together with its deviations.
    fn delete_deviation_type(&self, public_id: DeviationTypeId) -> RepoResult<()>;
}

/// SQLite-backed catalog repository.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

fn type_select_sql(filter: &str) -> String {
    format!(
        "SELECT
            {TYPE_COLUMNS_SQL},
            {CATEGORY_COLUMNS_SQL}
         FROM deviation_types t
         INNER JOIN deviation_categories c ON c.id = t.deviation_category_id
         {filter};"
    )
}

fn category_select_sql(filter: &str) -> String {
    format!(
        "SELECT {CATEGORY_COLUMNS_SQL}
         FROM deviation_categories c
         {filter};"
    )
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn add_category(&self, category: &DeviationCategory) -> RepoResult<CategoryId> {
        self.conn.execute(
            "INSERT INTO deviation_categories (public_id, name, fee)
             VALUES (?1, ?2, ?3);",
            params![
                category.public_id().to_string(),
                category.name(),
                category.fee().to_string(),
            ],
        )?;
        Ok(category.public_id())
    }

    fn get_category(&self, public_id: CategoryId) -> RepoResult<Option<DeviationCategory>> {
        let mut stmt = self
            .conn
            .prepare(&category_select_sql("WHERE c.public_id = ?1"))?;
        let mut rows = stmt.query([public_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_category_row(row)?));
        }

        Ok(None)
    }

    fn list_categories(&self) -> RepoResult<Vec<DeviationCategory>> {
        let mut stmt = self
            .conn
            .prepare(&category_select_sql("ORDER BY c.name ASC, c.id ASC"))?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }

        Ok(categories)
    }

    fn delete_category(&self, public_id: CategoryId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM deviation_categories WHERE public_id = ?1;",
            [public_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(public_id));
        }

        info!("event=category_delete module=repo status=ok category_id={public_id}");
        Ok(())
    }

    fn add_deviation_type(&self, deviation_type: &DeviationType) -> RepoResult<DeviationTypeId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        insert_category_if_absent(&tx, deviation_type.category())?;
        tx.execute(
            "INSERT INTO deviation_types (public_id, name, deviation_category_id)
             SELECT ?1, ?2, id
             FROM deviation_categories
             WHERE public_id = ?3;",
            params![
                deviation_type.public_id().to_string(),
                deviation_type.name(),
                deviation_type.category().public_id().to_string(),
            ],
        )?;
        tx.commit()?;

        Ok(deviation_type.public_id())
    }

    fn get_deviation_type(
        &self,
        public_id: DeviationTypeId,
    ) -> RepoResult<Option<DeviationType>> {
        let mut stmt = self
            .conn
            .prepare(&type_select_sql("WHERE t.public_id = ?1"))?;
        let mut rows = stmt.query([public_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_type_row(row)?));
        }

        Ok(None)
    }

    fn list_deviation_types_in_category(
        &self,
        category_id: CategoryId,
    ) -> RepoResult<Vec<DeviationType>> {
        let mut stmt = self.conn.prepare(&type_select_sql(
            "WHERE c.public_id = ?1 ORDER BY t.name ASC, t.id ASC",
        ))?;
        let mut rows = stmt.query([category_id.to_string()])?;
        let mut types = Vec::new();
        while let Some(row) = rows.next()? {
            types.push(parse_type_row(row)?);
        }

        Ok(types)
    }

    fn delete_deviation_type(&self, public_id: DeviationTypeId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM deviation_types WHERE public_id = ?1;",
            [public_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(public_id));
        }

        info!("event=deviation_type_delete module=repo status=ok type_id={public_id}");
        Ok(())
    }
}
