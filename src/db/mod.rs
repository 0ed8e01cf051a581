pub mod migrations;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::PathBuf;
use std::time::Duration;

/// Where a store connection string points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    Memory,
    File(PathBuf),
}

impl DbLocation {
    /// Parse a store connection string: `:memory:`, `sqlite::memory:`, `sqlite://<path>`,
    /// or a plain path (with `~/` expanded).
    pub fn parse(url: &str) -> Self {
        let url = url.trim();
        let rest = url.strip_prefix("sqlite://").unwrap_or(url);
        let rest = rest.strip_prefix("sqlite:").unwrap_or(rest);
        if rest == ":memory:" {
            Self::Memory
        } else {
            Self::File(crate::config::expand_tilde(rest))
        }
    }
}

/// Open (or create) the database behind a store connection string, with the schema
/// initialized and migrations applied.
pub fn open_database(url: &str) -> Result<Connection> {
    match DbLocation::parse(url) {
        DbLocation::Memory => open_memory_database(),
        DbLocation::File(path) => {
            // Ensure parent directory exists
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create directory {}", parent.display()))?;
            }

            let mut conn = Connection::open(&path)
                .with_context(|| format!("failed to open database at {}", path.display()))?;

            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.busy_timeout(Duration::from_millis(5000))?;

            prepare(&mut conn)?;
            tracing::info!(path = %path.display(), "database initialized");
            Ok(conn)
        }
    }
}

/// Open an in-memory database with schema and migrations applied.
pub fn open_memory_database() -> Result<Connection> {
    let mut conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    prepare(&mut conn)?;
    Ok(conn)
}

fn prepare(conn: &mut Connection) -> Result<()> {
    schema::init_schema(conn).context("failed to initialize schema")?;
    migrations::run_migrations(conn).context("failed to run migrations")?;
    Ok(())
}

/// Result of a database health check.
#[derive(Debug)]
pub struct HealthReport {
    pub schema_version: u32,
    pub integrity_ok: bool,
    pub integrity_details: String,
    /// Document count per collection, sorted by collection name.
    pub collections: Vec<(String, i64)>,
}

/// Run integrity and bookkeeping checks against an open database.
pub fn check_database_health(conn: &Connection) -> Result<HealthReport> {
    let schema_version = migrations::get_schema_version(conn)?;

    let integrity_details: String =
        conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
    let integrity_ok = integrity_details == "ok";

    let collections = conn
        .prepare("SELECT collection, COUNT(*) FROM documents GROUP BY collection ORDER BY collection")?
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HealthReport {
        schema_version,
        integrity_ok,
        integrity_details,
        collections,
    })
}
