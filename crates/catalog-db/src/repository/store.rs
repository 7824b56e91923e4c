//! # Entity Store
//!
//! One store implementation shared by every entity. The entity supplies its
//! table, column lists and binders through [`Entity`]; the store owns the
//! SQL shape, the timeout and the error mapping.
//!
//! ## Operation Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        EntityStore<E>                                   │
//! │                                                                         │
//! │  insert(draft)                                                         │
//! │    validate → parent exists? → INSERT ... RETURNING *                  │
//! │                                                                         │
//! │  get(id)          SELECT * FROM t WHERE id = ?                         │
//! │  delete(id)       DELETE FROM t WHERE id = ?                           │
//! │  exists(id)       SELECT EXISTS(SELECT 1 FROM t WHERE id = ?)          │
//! │                                                                         │
//! │  update(entity)                                                        │
//! │    UPDATE t SET ..., version = version + 1                             │
//! │    WHERE id = ? AND version = ? RETURNING *                            │
//! │      │                                                                  │
//! │      └── no row? SELECT version ... → NotFound or EditConflict         │
//! │                                                                         │
//! │  get_all(filters, terms)                                               │
//! │    SELECT *, COUNT(*) OVER() AS total_records FROM t                   │
//! │    WHERE id IN (SELECT rowid FROM t_fts WHERE t_fts MATCH ?) ...       │
//! │    ORDER BY <safelisted column> <ASC|DESC>, id ASC                     │
//! │    LIMIT ? OFFSET ?                                                    │
//! │                                                                         │
//! │  Every operation: tokio::time::timeout(query_timeout) → Timeout        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Table and column names reach the SQL text only from `&'static str`
//! constants on the entity or from the sort safelist. Everything a caller
//! supplies is bound.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;

use chrono::Utc;
use sqlx::query::QueryAs;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Row, Sqlite, SqlitePool};
use tracing::{debug, warn};

use catalog_core::filters::phrase_query;
use catalog_core::{
    calculate_metadata, FilterParams, Filters, Metadata, SearchTerms, SortDirection,
    SortSafelist, ValidationError, ValidationErrors, ValidationResult,
};

use crate::error::{DbError, DbResult};

/// A typed query whose rows decode into `E`.
pub type EntityQuery<'q, E> = QueryAs<'q, Sqlite, E, SqliteArguments<'q>>;

// =============================================================================
// Entity
// =============================================================================

/// The row an entity's draft must reference before it can be inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentRef {
    /// Entity name used in NotFound errors.
    pub entity: &'static str,
    pub table: &'static str,
    /// Foreign key column on the child table.
    pub column: &'static str,
}

/// A row type the generic store can manage.
///
/// Implementors describe their table; they never build SQL themselves.
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static {
    /// Insert input.
    type Draft: Send + Sync;

    /// Partial update input.
    type Patch: Send;

    /// Name used in errors and logs, e.g. `"Review"`.
    const NAME: &'static str;

    const TABLE: &'static str;

    /// FTS5 table indexing `SEARCH_COLUMNS`, keyed by rowid = id.
    const FTS_TABLE: &'static str;

    /// Columns bound by [`Entity::bind_draft`], in order.
    const INSERT_COLUMNS: &'static [&'static str];

    /// Columns bound by [`Entity::bind_changes`], in order.
    const UPDATE_COLUMNS: &'static [&'static str];

    /// Columns a list request may search.
    const SEARCH_COLUMNS: &'static [&'static str];

    /// Sort keys a list request may use.
    const SORT_SAFELIST: SortSafelist;

    const PARENT: Option<ParentRef> = None;

    fn id(&self) -> i64;

    fn version(&self) -> i64;

    /// Parent id carried by a draft, if the entity has a parent.
    fn parent_id(_draft: &Self::Draft) -> Option<i64> {
        None
    }

    fn validate_draft(draft: &Self::Draft) -> ValidationResult<()>;

    fn validate(&self) -> ValidationResult<()>;

    fn apply_patch(&mut self, patch: Self::Patch);

    /// Whether `patch` sets no field at all.
    fn patch_is_empty(patch: &Self::Patch) -> bool;

    /// Binds `INSERT_COLUMNS` from the draft.
    fn bind_draft<'q>(draft: &'q Self::Draft, query: EntityQuery<'q, Self>)
        -> EntityQuery<'q, Self>;

    /// Binds `UPDATE_COLUMNS` from the entity.
    fn bind_changes<'q>(&'q self, query: EntityQuery<'q, Self>) -> EntityQuery<'q, Self>;
}

// =============================================================================
// SQL Builders
// =============================================================================

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

pub(crate) fn insert_sql<E: Entity>() -> String {
    format!(
        "INSERT INTO {} ({}, created_at, updated_at, version) VALUES ({}, ?, ?, 1) RETURNING *",
        E::TABLE,
        E::INSERT_COLUMNS.join(", "),
        placeholders(E::INSERT_COLUMNS.len()),
    )
}

pub(crate) fn update_sql<E: Entity>() -> String {
    let assignments = E::UPDATE_COLUMNS
        .iter()
        .map(|column| format!("{} = ?", column))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "UPDATE {} SET {}, updated_at = ?, version = version + 1 \
         WHERE id = ? AND version = ? RETURNING *",
        E::TABLE,
        assignments
    )
}

/// `search_count` is the number of non-empty compiled search queries.
pub(crate) fn list_sql<E: Entity>(
    filters: &Filters,
    scope_column: Option<&'static str>,
    search_count: usize,
) -> String {
    let mut sql = format!(
        "SELECT *, COUNT(*) OVER() AS total_records FROM {} WHERE 1 = 1",
        E::TABLE
    );

    if let Some(column) = scope_column {
        sql.push_str(&format!(" AND {} = ?", column));
    }

    for _ in 0..search_count {
        sql.push_str(&format!(
            " AND id IN (SELECT rowid FROM {fts} WHERE {fts} MATCH ?)",
            fts = E::FTS_TABLE
        ));
    }

    sql.push_str(&format!(
        " ORDER BY {} {}, id ASC LIMIT ? OFFSET ?",
        filters.sort_column(),
        filters.sort_direction().as_sql()
    ));

    sql
}

// =============================================================================
// Timeout
// =============================================================================

/// Runs `fut` under `after`, mapping an elapsed deadline to
/// [`DbError::Timeout`]. The future is dropped on timeout.
pub async fn with_timeout<T, F>(operation: &'static str, after: Duration, fut: F) -> DbResult<T>
where
    F: Future<Output = DbResult<T>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, timeout_ms = after.as_millis() as u64, "Store operation timed out");
            Err(DbError::Timeout { operation, after })
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Store for one entity type over a shared pool.
///
/// Cloning is cheap (the pool is reference-counted). The store holds no
/// mutable state; same-row races are settled by SQLite and the version check.
pub struct EntityStore<E> {
    pool: SqlitePool,
    timeout: Duration,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityStore<E> {
    fn clone(&self) -> Self {
        EntityStore {
            pool: self.pool.clone(),
            timeout: self.timeout,
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Debug for EntityStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("entity", &E::NAME)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl<E: Entity> EntityStore<E> {
    pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
        EntityStore {
            pool,
            timeout,
            _entity: PhantomData,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn run<T, F>(&self, operation: &'static str, fut: F) -> DbResult<T>
    where
        F: Future<Output = DbResult<T>>,
    {
        with_timeout(operation, self.timeout, fut).await
    }

    /// Validates raw list parameters against this entity's safelist.
    pub fn filters(&self, params: &FilterParams) -> DbResult<Filters> {
        Ok(Filters::new(params, &E::SORT_SAFELIST)?)
    }

    /// Inserts a new row and returns it with its id, timestamps and
    /// version 1.
    ///
    /// ## Errors
    /// - `Validation` - the draft failed its field rules
    /// - `NotFound` - the parent row doesn't exist (also when it vanished
    ///   between the check and the insert)
    pub async fn insert(&self, draft: &E::Draft) -> DbResult<E> {
        E::validate_draft(draft)?;

        let parent = match (E::PARENT, E::parent_id(draft)) {
            (Some(parent), Some(id)) => Some((parent, id)),
            _ => None,
        };

        self.run("insert", async {
            if let Some((parent, parent_id)) = parent {
                if !row_exists(&self.pool, parent.table, parent_id).await? {
                    debug!(entity = E::NAME, parent = parent.entity, parent_id, "Parent missing");
                    return Err(DbError::not_found(parent.entity, parent_id));
                }
            }

            let now = Utc::now();
            let sql = insert_sql::<E>();
            let entity = E::bind_draft(draft, sqlx::query_as::<_, E>(&sql))
                .bind(now)
                .bind(now)
                .fetch_one(&self.pool)
                .await
                .map_err(|err| match (DbError::from(err), parent) {
                    (DbError::ForeignKeyViolation { .. }, Some((parent, parent_id))) => {
                        DbError::not_found(parent.entity, parent_id)
                    }
                    (other, _) => other,
                })?;

            debug!(entity = E::NAME, id = entity.id(), "Inserted");
            Ok(entity)
        })
        .await
    }

    /// Fetches one row by id.
    pub async fn get(&self, id: i64) -> DbResult<E> {
        if id < 1 {
            return Err(DbError::not_found(E::NAME, id));
        }

        self.run("get", async {
            let sql = format!("SELECT * FROM {} WHERE id = ?", E::TABLE);
            let entity = sqlx::query_as::<_, E>(&sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

            debug!(entity = E::NAME, id, found = entity.is_some(), "Fetched");
            entity.ok_or_else(|| DbError::not_found(E::NAME, id))
        })
        .await
    }

    /// Writes the mutable columns of `entity` if its version is still
    /// current, and returns the row with the bumped version.
    ///
    /// ## Errors
    /// - `Validation` - the entity failed its field rules
    /// - `NotFound` - no row with this id
    /// - `EditConflict` - the row moved past `entity.version()`
    pub async fn update(&self, entity: &E) -> DbResult<E> {
        let (id, version) = (entity.id(), entity.version());
        if id < 1 {
            return Err(DbError::not_found(E::NAME, id));
        }

        entity.validate()?;

        self.run("update", async {
            let sql = update_sql::<E>();
            let updated = entity
                .bind_changes(sqlx::query_as::<_, E>(&sql))
                .bind(Utc::now())
                .bind(id)
                .bind(version)
                .fetch_optional(&self.pool)
                .await?;

            if let Some(updated) = updated {
                debug!(entity = E::NAME, id, version = updated.version(), "Updated");
                return Ok(updated);
            }

            // Zero rows: either the id is gone or the version moved on.
            let version_sql = format!("SELECT version FROM {} WHERE id = ?", E::TABLE);
            let current: Option<i64> = sqlx::query_scalar(&version_sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

            match current {
                None => Err(DbError::not_found(E::NAME, id)),
                Some(current) => {
                    debug!(entity = E::NAME, id, expected = version, current, "Version mismatch");
                    Err(DbError::edit_conflict(E::NAME, id, version))
                }
            }
        })
        .await
    }

    /// Read-merge-update: fetches `id`, applies `patch`, writes it back.
    ///
    /// With `expected_version`, the read must still be at that version. A
    /// patch that sets nothing returns the row as read, version unchanged.
    pub async fn patch(
        &self,
        id: i64,
        patch: E::Patch,
        expected_version: Option<i64>,
    ) -> DbResult<E> {
        let mut entity = self.get(id).await?;

        if let Some(expected) = expected_version {
            if entity.version() != expected {
                return Err(DbError::edit_conflict(E::NAME, id, expected));
            }
        }

        if E::patch_is_empty(&patch) {
            debug!(entity = E::NAME, id, "Empty patch, nothing to write");
            return Ok(entity);
        }

        entity.apply_patch(patch);
        self.update(&entity).await
    }

    /// Deletes one row by id. Dependent rows go with it (ON DELETE CASCADE).
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        if id < 1 {
            return Err(DbError::not_found(E::NAME, id));
        }

        self.run("delete", async {
            let sql = format!("DELETE FROM {} WHERE id = ?", E::TABLE);
            let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

            if result.rows_affected() == 0 {
                return Err(DbError::not_found(E::NAME, id));
            }

            debug!(entity = E::NAME, id, "Deleted");
            Ok(())
        })
        .await
    }

    /// Whether a row with `id` exists. Storage failures are errors, not
    /// `false`.
    pub async fn exists(&self, id: i64) -> DbResult<bool> {
        if id < 1 {
            return Ok(false);
        }

        self.run("exists", row_exists(&self.pool, E::TABLE, id)).await
    }

    /// Total number of rows.
    pub async fn count(&self) -> DbResult<i64> {
        self.run("count", async {
            let sql = format!("SELECT COUNT(*) FROM {}", E::TABLE);
            let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
            Ok(count)
        })
        .await
    }

    /// One page of rows matching every non-empty search term, with
    /// pagination metadata.
    ///
    /// No match is `(vec![], Metadata::default())`, not an error.
    pub async fn get_all(
        &self,
        filters: &Filters,
        terms: &SearchTerms,
    ) -> DbResult<(Vec<E>, Metadata)> {
        self.list("get_all", filters, terms, None).await
    }

    /// Lists rows, optionally scoped to one parent. The parent check and the
    /// listing share a single deadline.
    pub(crate) async fn list(
        &self,
        operation: &'static str,
        filters: &Filters,
        terms: &SearchTerms,
        scope: Option<(ParentRef, i64)>,
    ) -> DbResult<(Vec<E>, Metadata)> {
        if let Some((parent, parent_id)) = scope {
            if parent_id < 1 {
                return Err(DbError::not_found(parent.entity, parent_id));
            }
        }

        check_sort::<E>(filters)?;
        terms.validate(E::SEARCH_COLUMNS)?;

        // Only a blank term leaves its column unfiltered. A term with no
        // searchable words matches nothing.
        let mut queries: Vec<String> = Vec::new();
        let mut unmatchable = false;
        for column in E::SEARCH_COLUMNS {
            let term = terms.get(column);
            if term.is_empty() {
                continue;
            }
            let query = phrase_query(column, term);
            if query.is_empty() {
                unmatchable = true;
                break;
            }
            queries.push(query);
        }

        let sql = list_sql::<E>(
            filters,
            scope.map(|(parent, _)| parent.column),
            queries.len(),
        );

        self.run(operation, async {
            if let Some((parent, parent_id)) = scope {
                if !row_exists(&self.pool, parent.table, parent_id).await? {
                    debug!(entity = E::NAME, parent = parent.entity, parent_id, "Parent missing");
                    return Err(DbError::not_found(parent.entity, parent_id));
                }
            }

            if unmatchable {
                debug!(entity = E::NAME, "Search term has no searchable words");
                return Ok((Vec::new(), Metadata::default()));
            }

            let mut query = sqlx::query(&sql);
            if let Some((_, scope_id)) = scope {
                query = query.bind(scope_id);
            }
            for fts_query in &queries {
                query = query.bind(fts_query.as_str());
            }

            let rows = query
                .bind(filters.limit())
                .bind(filters.offset())
                .fetch_all(&self.pool)
                .await?;

            let Some(first) = rows.first() else {
                debug!(entity = E::NAME, page = filters.page(), "List returned nothing");
                return Ok((Vec::new(), Metadata::default()));
            };

            let total: i64 = first.try_get("total_records")?;
            let items = rows
                .iter()
                .map(|row| E::from_row(row))
                .collect::<Result<Vec<_>, _>>()?;

            debug!(
                entity = E::NAME,
                page = filters.page(),
                returned = items.len(),
                total,
                "Listed"
            );

            Ok((items, calculate_metadata(total, filters.page(), filters.page_size())))
        })
        .await
    }
}

/// Rejects filters built against a different entity's safelist.
fn check_sort<E: Entity>(filters: &Filters) -> DbResult<()> {
    let key = match filters.sort_direction() {
        SortDirection::Asc => filters.sort_column().to_string(),
        SortDirection::Desc => format!("-{}", filters.sort_column()),
    };

    if E::SORT_SAFELIST.contains(&key) {
        return Ok(());
    }

    Err(DbError::from(ValidationErrors::from(
        ValidationError::NotAllowed {
            field: "sort".to_string(),
            allowed: E::SORT_SAFELIST
                .keys()
                .iter()
                .map(|k| k.to_string())
                .collect(),
        },
    )))
}

pub(crate) async fn row_exists(pool: &SqlitePool, table: &'static str, id: i64) -> DbResult<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", table);
    let found: i64 = sqlx::query_scalar(&sql).bind(id).fetch_one(pool).await?;
    Ok(found != 0)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::{Product, Review};

    #[tokio::test]
    async fn test_with_timeout_elapses() {
        let result: DbResult<()> = with_timeout("get", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, DbError::Timeout { operation: "get", .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::TimeoutFault);
    }

    #[tokio::test]
    async fn test_with_timeout_passes_result_through() {
        let ok = with_timeout("count", Duration::from_secs(1), async { Ok(5) }).await;
        assert_eq!(ok.unwrap(), 5);

        let err: DbResult<()> = with_timeout("get", Duration::from_secs(1), async {
            Err(DbError::not_found("Product", 9))
        })
        .await;
        assert!(err.unwrap_err().is_not_found());
    }

    #[test]
    fn test_insert_sql() {
        assert_eq!(
            insert_sql::<Review>(),
            "INSERT INTO reviews (product_id, author, rating, review_text, created_at, updated_at, version) \
             VALUES (?, ?, ?, ?, ?, ?, 1) RETURNING *"
        );
    }

    #[test]
    fn test_update_sql_checks_version() {
        let sql = update_sql::<Product>();
        assert!(sql.starts_with("UPDATE products SET name = ?, description = ?"));
        assert!(sql.contains("version = version + 1"));
        assert!(sql.contains("WHERE id = ? AND version = ? RETURNING *"));
    }

    #[test]
    fn test_list_sql_orders_with_id_tiebreak() {
        let filters = Filters::new(&FilterParams::new(2, 10, "-rating"), &Review::SORT_SAFELIST)
            .unwrap();
        let sql = list_sql::<Review>(&filters, Some("product_id"), 1);

        assert!(sql.contains("COUNT(*) OVER() AS total_records"));
        assert!(sql.contains("AND product_id = ?"));
        assert!(sql.contains("reviews_fts MATCH ?"));
        assert!(sql.ends_with("ORDER BY rating DESC, id ASC LIMIT ? OFFSET ?"));
    }

    #[test]
    fn test_sort_from_foreign_safelist_rejected() {
        const OTHER: SortSafelist = SortSafelist::new(&["image_url"]);
        let filters = Filters::new(&FilterParams::new(1, 10, "image_url"), &OTHER).unwrap();

        let err = check_sort::<Review>(&filters).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }
}
