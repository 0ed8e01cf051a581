//! Collection-oriented document store over SQLite.
//!
//! [`DocumentStore`] owns the shared connection; [`Collection`] handles expose the three
//! operations the API needs: [`Collection::insert_one`], [`Collection::find`] and
//! [`Collection::update_one`]. Documents are JSON objects addressed by equality filters on
//! top-level fields. Every call runs on the blocking pool inside a single transaction.

pub mod query;

pub use query::{Filter, FindOptions, SortOrder};

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

/// Errors raised by store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid field name: {0:?}")]
    InvalidField(String),
    #[error("document must be a JSON object")]
    NotAnObject,
    #[error("db lock poisoned")]
    LockPoisoned,
    #[error("db task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of [`Collection::update_one`].
///
/// `matched` and `modified` are reported separately so callers can tell "no such
/// document" apart from "document already had these values".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateResult {
    pub matched: u64,
    pub modified: u64,
    pub upserted: bool,
}

/// Handle to the document database. Cheap to clone; all clones share one connection.
#[derive(Clone)]
pub struct DocumentStore {
    conn: Arc<Mutex<Connection>>,
}

impl DocumentStore {
    /// Wrap an already-initialized connection (see [`crate::db::open_database`]).
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Open the database behind a store connection string.
    pub fn open(url: &str) -> anyhow::Result<Self> {
        Ok(Self::new(crate::db::open_database(url)?))
    }

    /// An empty in-memory store.
    pub fn in_memory() -> anyhow::Result<Self> {
        Ok(Self::new(crate::db::open_memory_database()?))
    }

    pub fn collection(&self, name: &str) -> Collection {
        Collection {
            name: name.to_string(),
            conn: Arc::clone(&self.conn),
        }
    }

    /// Close the underlying connection. Fails if another handle is still alive.
    pub fn close(self) -> anyhow::Result<()> {
        let mutex = Arc::try_unwrap(self.conn)
            .map_err(|_| anyhow::anyhow!("store still in use; cannot close"))?;
        let conn = mutex
            .into_inner()
            .map_err(|_| anyhow::anyhow!("db lock poisoned"))?;
        conn.close().map_err(|(_, e)| anyhow::Error::from(e))?;
        tracing::info!("document store closed");
        Ok(())
    }
}

/// A named collection within a [`DocumentStore`].
#[derive(Clone)]
pub struct Collection {
    name: String,
    conn: Arc<Mutex<Connection>>,
}

impl Collection {
    /// Insert one document. No uniqueness check is made on any field.
    pub async fn insert_one(&self, document: Value) -> StoreResult<()> {
        if !document.is_object() {
            return Err(StoreError::NotAnObject);
        }
        let collection = self.name.clone();
        self.with_conn(move |conn| insert_document(conn, &collection, &document))
            .await
    }

    /// Return documents matching `filter`, ordered and truncated per `options`.
    pub async fn find(&self, filter: Filter, options: FindOptions) -> StoreResult<Vec<Value>> {
        let collection = self.name.clone();
        self.with_conn(move |conn| {
            let (sql, args) = query::select_sql(&collection, &filter, &options)?;
            let mut stmt = conn.prepare(&sql)?;
            let bodies = stmt
                .query_map(params_from_iter(args.iter()), |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            bodies
                .iter()
                .map(|body| serde_json::from_str(body).map_err(StoreError::from))
                .collect()
        })
        .await
    }

    /// Merge `fields` into the first document matching `filter`.
    ///
    /// With `upsert`, a miss inserts a new document built from the filter's fields
    /// overlaid with `fields`.
    pub async fn update_one(
        &self,
        filter: Filter,
        fields: Map<String, Value>,
        upsert: bool,
    ) -> StoreResult<UpdateResult> {
        let collection = self.name.clone();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let (sql, args) = query::first_match_sql(&collection, &filter)?;
            let existing: Option<(i64, String)> = tx
                .query_row(&sql, params_from_iter(args.iter()), |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })
                .optional()?;

            let result = match existing {
                Some((seq, body)) => {
                    let mut document: Map<String, Value> = serde_json::from_str(&body)?;
                    let before = document.clone();
                    document.extend(fields);
                    let modified = document != before;
                    if modified {
                        tx.execute(
                            "UPDATE documents SET body = ?1, updated_at = ?2 WHERE seq = ?3",
                            params![serde_json::to_string(&document)?, now(), seq],
                        )?;
                    }
                    UpdateResult {
                        matched: 1,
                        modified: u64::from(modified),
                        upserted: false,
                    }
                }
                None if upsert => {
                    let mut document = filter.to_document();
                    document.extend(fields);
                    insert_document(&tx, &collection, &Value::Object(document))?;
                    UpdateResult {
                        matched: 0,
                        modified: 0,
                        upserted: true,
                    }
                }
                None => UpdateResult::default(),
            };

            tx.commit()?;
            Ok(result)
        })
        .await
    }

    /// Count documents in this collection.
    pub async fn count(&self) -> StoreResult<i64> {
        let collection = self.name.clone();
        self.with_conn(move |conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM documents WHERE collection = ?1",
                params![collection],
                |row| row.get(0),
            )?)
        })
        .await
    }

    /// Run `f` against the locked connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = db.lock().map_err(|_| StoreError::LockPoisoned)?;
            f(&mut *conn)
        })
        .await?
    }
}

fn insert_document(conn: &Connection, collection: &str, document: &Value) -> StoreResult<()> {
    let now = now();
    conn.execute(
        "INSERT INTO documents (collection, body, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        params![collection, serde_json::to_string(document)?, now],
    )?;
    Ok(())
}

fn now() -> String {
    crate::records::timestamp::format(&chrono::Utc::now())
}
