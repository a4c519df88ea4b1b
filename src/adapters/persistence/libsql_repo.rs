//! SQLite-backed rating repository via libsql. Implements RatingRepoPort.
//!
//! Single `rates` table with a UNIQUE (item_id, author_id) constraint; the
//! database file lives at `<data_dir>/ratings.db`. Every call checks out its
//! own connection. SQLite result codes are translated to SQLSTATE codes so the
//! domain classifier does not depend on the engine.

use crate::domain::{DataAccessError, NewRating, RatingSummary, RequestContext};
use crate::ports::RatingRepoPort;
use libsql::{Connection, Database, params};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const RATES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS rates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    item_id INTEGER NOT NULL,
    author_id INTEGER NOT NULL,
    rate INTEGER NOT NULL CHECK (rate >= 1 AND rate <= 5),
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (item_id, author_id)
)"#;
const RATES_ITEM_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_rates_item_id ON rates (item_id)";
const RATES_RATE_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_rates_rate ON rates (rate)";

const DB_FILE: &str = "ratings.db";

/// How long a connection waits on a locked database before failing with BUSY.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// SQLite primary result codes.
const SQLITE_ERROR: i32 = 1;
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;
const SQLITE_IOERR: i32 = 10;
const SQLITE_CANTOPEN: i32 = 14;
const SQLITE_CONSTRAINT: i32 = 19;
const SQLITE_AUTH: i32 = 23;
// Extended constraint codes.
const SQLITE_CONSTRAINT_CHECK: i32 = 275;
const SQLITE_CONSTRAINT_NOTNULL: i32 = 1299;
const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

/// SQLSTATE code for a SQLite result code, if it belongs to a known class.
pub fn sqlstate_for_sqlite_code(code: i32) -> Option<&'static str> {
    match code {
        SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY => return Some("23505"),
        SQLITE_CONSTRAINT_CHECK => return Some("23514"),
        SQLITE_CONSTRAINT_NOTNULL => return Some("23502"),
        _ => {}
    }
    match code & 0xff {
        SQLITE_CONSTRAINT => Some("23000"),
        SQLITE_CANTOPEN => Some("08001"),
        // Lock contention and I/O hiccups are transient; report them as
        // connection failures so callers may retry.
        SQLITE_BUSY | SQLITE_LOCKED | SQLITE_IOERR => Some("08006"),
        SQLITE_AUTH => Some("42501"),
        SQLITE_ERROR => Some("42000"),
        _ => None,
    }
}

fn sqlstate_for(err: &libsql::Error) -> Option<&'static str> {
    match err {
        libsql::Error::SqliteFailure(code, _) => sqlstate_for_sqlite_code(*code),
        libsql::Error::ConnectionFailed(_) => Some("08001"),
        _ => None,
    }
}

fn data_access(what: &str, err: libsql::Error) -> DataAccessError {
    DataAccessError::new(sqlstate_for(&err), format!("{what}: {err}")).with_source(err)
}

/// libsql rating repository. Safe to share via Arc.
pub struct LibsqlRatingRepo {
    db: Database,
    db_path: PathBuf,
}

impl LibsqlRatingRepo {
    /// Open (or create) `<base_dir>/ratings.db` and ensure the schema exists.
    ///
    /// Sets WAL mode and synchronous=NORMAL so readers do not block the writer.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DataAccessError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(|e| {
            DataAccessError::new(Some("08001"), format!("create data dir: {e}")).with_source(e)
        })?;
        let db_path = base.join(DB_FILE);
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(|e| data_access("open database", e))?;

        let repo = Self {
            db,
            db_path: db_path.clone(),
        };
        let conn = repo.checkout().await?;
        // PRAGMA returns a row (new value); query and drain instead of execute.
        pragma(&conn, "PRAGMA journal_mode=WAL").await?;
        pragma(&conn, "PRAGMA synchronous=NORMAL").await?;
        for ddl in [RATES_TABLE, RATES_ITEM_INDEX, RATES_RATE_INDEX] {
            conn.execute(ddl, ())
                .await
                .map_err(|e| data_access("create schema", e))?;
        }

        info!(path = %db_path.display(), "rating database ready (WAL mode)");
        Ok(repo)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// One connection per operation; never shared between requests.
    async fn checkout(&self) -> Result<Connection, DataAccessError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| data_access("connect", e))?;
        pragma(
            &conn,
            &format!("PRAGMA busy_timeout = {}", BUSY_TIMEOUT.as_millis()),
        )
        .await?;
        Ok(conn)
    }
}

async fn pragma(conn: &Connection, sql: &str) -> Result<(), DataAccessError> {
    let mut rows = conn.query(sql, ()).await.map_err(|e| data_access(sql, e))?;
    while rows
        .next()
        .await
        .map_err(|e| data_access(sql, e))?
        .is_some()
    {}
    Ok(())
}

#[async_trait::async_trait]
impl RatingRepoPort for LibsqlRatingRepo {
    async fn append_rating(
        &self,
        ctx: &RequestContext,
        rating: &NewRating,
    ) -> Result<i64, DataAccessError> {
        let conn = self.checkout().await?;
        let affected = conn
            .execute(
                "INSERT INTO rates (item_id, author_id, rate) VALUES (?1, ?2, ?3)",
                params![rating.item_id(), rating.author_id(), rating.value()],
            )
            .await
            .map_err(|e| data_access("insert rating", e))?;
        if affected == 0 {
            return Err(DataAccessError::new(
                None,
                "Creating rating failed, no rows affected.",
            ));
        }
        let id = conn.last_insert_rowid();
        debug!(%ctx, id, "rating row inserted");
        Ok(id)
    }

    async fn summarize(
        &self,
        ctx: &RequestContext,
        item_id: i64,
    ) -> Result<RatingSummary, DataAccessError> {
        let conn = self.checkout().await?;
        // One statement so counts and total come from the same snapshot.
        let mut rows = conn
            .query(
                "SELECT rate, COUNT(*) FROM rates WHERE item_id = ?1 GROUP BY rate",
                params![item_id],
            )
            .await
            .map_err(|e| data_access("count ratings", e))?;

        let mut summary = RatingSummary::empty();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| data_access("read rating counts", e))?
        {
            let rate: i32 = row.get(0).map_err(|e| data_access("read rate", e))?;
            let count: i64 = row.get(1).map_err(|e| data_access("read count", e))?;
            if !summary.add(rate, count) {
                return Err(DataAccessError::new(
                    None,
                    format!("unexpected rate value {rate} stored for item {item_id}"),
                ));
            }
        }
        debug!(%ctx, total = summary.total(), "rating counts read");
        Ok(summary)
    }
}
