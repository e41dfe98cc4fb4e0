//! Storage repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/patch/find/delete APIs over the `storage` table.
//! - Run every operation as exactly one statement inside its own transaction.
//! - Classify SQLite failures into `NotFound` vs store errors in one place.
//!
//! # Invariants
//! - A transaction is committed only on the success path; every other exit
//!   drops it, which rolls it back.
//! - List results are ordered by `id DESC`.
//! - Credential values are never written to logs.

use crate::db::DbError;
use crate::model::storage::{
    Storage, StorageCreate, StorageDelete, StorageFind, StoragePatch, StorageValidationError,
};
use crate::repo::query::{Assignments, Conditions};
use log::{debug, info, warn};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, InterruptHandle, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const STORAGE_TABLE: &str = "storage";
const STORAGE_COLUMNS: [&str; 8] = [
    "id",
    "name",
    "end_point",
    "region",
    "access_key",
    "secret_key",
    "bucket",
    "url_prefix",
];
const STORAGE_SELECT_LIST: &str =
    "id, name, end_point, region, access_key, secret_key, bucket, url_prefix";

pub type RepoResult<T> = Result<T, RepoError>;

/// Coarse classification callers map to their own surface (e.g. HTTP status).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Store,
}

/// Repository error for storage persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(StorageValidationError),
    Store(DbError),
    /// Carries the filter that matched nothing.
    NotFound(StorageFind),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Store(_)
            | Self::InvalidData(_)
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => ErrorKind::Store,
        }
    }

    fn kind_label(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::Store => "store",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::NotFound(find) => match (find.id, find.name.as_deref()) {
                (Some(id), Some(name)) => write!(f, "storage not found: id={id} name={name}"),
                (Some(id), None) => write!(f, "storage not found: id={id}"),
                (None, Some(name)) => write!(f, "storage not found: name={name}"),
                (None, None) => write!(f, "storage not found"),
            },
            Self::InvalidData(message) => write!(f, "invalid storage data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::NotFound(_)
            | Self::InvalidData(_)
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<StorageValidationError> for RepoError {
    fn from(value: StorageValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Store(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(DbError::Sqlite(value))
    }
}

/// Maps a raw SQLite error into the repository taxonomy.
///
/// `QueryReturnedNoRows` means the statement addressed no row, so it becomes
/// `NotFound(target)`; anything else is a store error.
pub fn classify_store_error(err: rusqlite::Error, target: &StorageFind) -> RepoError {
    match err {
        rusqlite::Error::QueryReturnedNoRows => RepoError::NotFound(target.clone()),
        other => RepoError::from(other),
    }
}

/// Repository interface for storage configuration records.
pub trait StorageRepository {
    /// Inserts a record and returns it with its newly assigned id.
    fn create_storage(&self, create: &StorageCreate) -> RepoResult<Storage>;
    /// Updates only the fields present in `patch` and returns the full row.
    fn patch_storage(&self, patch: &StoragePatch) -> RepoResult<Storage>;
    /// Lists every record matching `find`, most recent id first.
    fn find_storage_list(&self, find: &StorageFind) -> RepoResult<Vec<Storage>>;
    /// Returns the first record (highest id) matching `find`.
    fn find_storage(&self, find: &StorageFind) -> RepoResult<Storage>;
    /// Physically deletes the record with `delete.id`.
    fn delete_storage(&self, delete: &StorageDelete) -> RepoResult<()>;
}

/// SQLite-backed storage repository.
pub struct SqliteStorageRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStorageRepository<'conn> {
    /// Constructs a repository from a ready connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the `storage`
    ///   schema has not been applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_storage_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Handle that aborts the statement currently running on this
    /// connection. The interrupted operation fails with a store error and
    /// its transaction is rolled back.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.conn.get_interrupt_handle()
    }

    fn in_transaction<T>(
        &self,
        op: &'static str,
        behavior: TransactionBehavior,
        body: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        let result = run_in_transaction(self.conn, behavior, body);
        match &result {
            Ok(_) => debug!(
                "event=storage_op module=repo op={op} status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) if err.kind() == ErrorKind::Store => warn!(
                "event=storage_op module=repo op={op} status=error duration_ms={} error_kind={} error={err}",
                started_at.elapsed().as_millis(),
                err.kind_label()
            ),
            Err(err) => info!(
                "event=storage_op module=repo op={op} status=error duration_ms={} error_kind={}",
                started_at.elapsed().as_millis(),
                err.kind_label()
            ),
        }
        result
    }
}

impl StorageRepository for SqliteStorageRepository<'_> {
    fn create_storage(&self, create: &StorageCreate) -> RepoResult<Storage> {
        let sql = format!(
            "INSERT INTO storage (
                name,
                end_point,
                region,
                access_key,
                secret_key,
                bucket,
                url_prefix
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING {STORAGE_SELECT_LIST};"
        );

        self.in_transaction("create", TransactionBehavior::Immediate, |tx| {
            let created = tx
                .query_row(
                    &sql,
                    params![
                        create.name.as_str(),
                        create.end_point.as_str(),
                        create.region.as_str(),
                        create.access_key.as_str(),
                        create.secret_key.as_str(),
                        create.bucket.as_str(),
                        create.url_prefix.as_str(),
                    ],
                    parse_storage_row,
                )
                .optional()?;

            created.ok_or_else(|| {
                RepoError::InvalidData("insert into storage returned no row".to_string())
            })
        })
    }

    fn patch_storage(&self, patch: &StoragePatch) -> RepoResult<Storage> {
        patch.validate()?;

        let mut set = Assignments::new();
        set.push_opt("name", patch.name.as_deref());
        set.push_opt("end_point", patch.end_point.as_deref());
        set.push_opt("region", patch.region.as_deref());
        set.push_opt("access_key", patch.access_key.as_deref());
        set.push_opt("secret_key", patch.secret_key.as_deref());
        set.push_opt("bucket", patch.bucket.as_deref());
        set.push_opt("url_prefix", patch.url_prefix.as_deref());
        let assignments = set.sql();
        let id_index = set.bind_trailing(Value::Integer(patch.id));
        let sql = format!(
            "UPDATE storage
             SET {assignments}
             WHERE id = ?{id_index}
             RETURNING {STORAGE_SELECT_LIST};"
        );
        let values = set.into_values();
        let target = StorageFind::by_id(patch.id);

        self.in_transaction("patch", TransactionBehavior::Immediate, |tx| {
            tx.query_row(&sql, params_from_iter(values), parse_storage_row)
                .map_err(|err| classify_store_error(err, &target))
        })
    }

    fn find_storage_list(&self, find: &StorageFind) -> RepoResult<Vec<Storage>> {
        self.in_transaction("find_list", TransactionBehavior::Deferred, |tx| {
            query_storage_list(tx, find)
        })
    }

    fn find_storage(&self, find: &StorageFind) -> RepoResult<Storage> {
        self.in_transaction("find", TransactionBehavior::Deferred, |tx| {
            query_storage_list(tx, find)?
                .into_iter()
                .next()
                .ok_or_else(|| RepoError::NotFound(find.clone()))
        })
    }

    fn delete_storage(&self, delete: &StorageDelete) -> RepoResult<()> {
        self.in_transaction("delete", TransactionBehavior::Immediate, |tx| {
            let changed = tx.execute("DELETE FROM storage WHERE id = ?1;", [delete.id])?;
            if changed == 0 {
                return Err(RepoError::NotFound(StorageFind::by_id(delete.id)));
            }
            Ok(())
        })
    }
}

fn run_in_transaction<T>(
    conn: &Connection,
    behavior: TransactionBehavior,
    body: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
) -> RepoResult<T> {
    // Dropping `tx` on any early return rolls it back.
    let tx = Transaction::new_unchecked(conn, behavior)?;
    let value = body(&tx)?;
    tx.commit()?;
    Ok(value)
}

fn query_storage_list(conn: &Connection, find: &StorageFind) -> RepoResult<Vec<Storage>> {
    let mut conditions = Conditions::new();
    conditions.push_eq("id", find.id.map(Value::Integer));
    conditions.push_eq("name", find.name.clone().map(Value::Text));

    let sql = format!(
        "SELECT {STORAGE_SELECT_LIST}
         FROM storage
         WHERE {}
         ORDER BY id DESC;",
        conditions.sql()
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(conditions.into_values()))?;
    let mut list = Vec::new();
    while let Some(row) = rows.next()? {
        list.push(parse_storage_row(row)?);
    }

    Ok(list)
}

fn parse_storage_row(row: &Row<'_>) -> rusqlite::Result<Storage> {
    Ok(Storage {
        id: row.get("id")?,
        name: row.get("name")?,
        end_point: row.get("end_point")?,
        region: row.get("region")?,
        access_key: row.get("access_key")?,
        secret_key: row.get("secret_key")?,
        bucket: row.get("bucket")?,
        url_prefix: row.get("url_prefix")?,
    })
}

fn ensure_storage_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, STORAGE_TABLE)? {
        return Err(RepoError::MissingRequiredTable(STORAGE_TABLE));
    }

    for column in STORAGE_COLUMNS {
        if !table_has_column(conn, STORAGE_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: STORAGE_TABLE,
                column,
            });
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
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{classify_store_error, ErrorKind, RepoError};
    use crate::model::storage::{StorageFind, StorageValidationError};

    #[test]
    fn no_rows_is_classified_as_not_found() {
        let target = StorageFind::by_id(9);
        let err = classify_store_error(rusqlite::Error::QueryReturnedNoRows, &target);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(matches!(err, RepoError::NotFound(ref find) if *find == target));
        assert_eq!(err.to_string(), "storage not found: id=9");
    }

    #[test]
    fn other_sqlite_errors_are_store_errors() {
        let err = classify_store_error(rusqlite::Error::InvalidQuery, &StorageFind::by_id(1));
        assert_eq!(err.kind(), ErrorKind::Store);
        assert!(matches!(err, RepoError::Store(_)));
    }

    #[test]
    fn validation_and_data_errors_have_expected_kinds() {
        let validation = RepoError::from(StorageValidationError::EmptyPatch { id: 1 });
        assert_eq!(validation.kind(), ErrorKind::Validation);

        let invalid = RepoError::InvalidData("bad".to_string());
        assert_eq!(invalid.kind(), ErrorKind::Store);
    }

    #[test]
    fn not_found_message_names_the_filter() {
        let by_name = RepoError::NotFound(StorageFind::by_name("s3"));
        assert_eq!(by_name.to_string(), "storage not found: name=s3");
        let unfiltered = RepoError::NotFound(StorageFind::default());
        assert_eq!(unfiltered.to_string(), "storage not found");
    }
}
