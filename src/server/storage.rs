//! Score persistence. One table, append-only, read through a ranked query.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, params};

use crate::score::{NewScore, Score};

/// Storage errors
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    /// SQLite error
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A thread panicked while holding the store lock
    #[error("score store lock poisoned")]
    Poisoned,
}

/// Backend for the leaderboard routes. Calls are blocking; async callers run
/// them on the blocking pool.
pub trait ScoreStore: Send + Sync {
    /// Highest scores first, at most `limit` rows.
    fn top_scores(&self, limit: usize) -> Result<Vec<Score>, StorageError>;

    /// Insert an already validated score and return the stored row.
    fn create_score(&self, new: &NewScore) -> Result<Score, StorageError>;
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS scores (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    username   TEXT    NOT NULL,
    score      INTEGER NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS scores_score_idx ON scores (score DESC);
";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Private in-memory database; gone when the store is dropped.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

impl ScoreStore for SqliteStore {
    fn top_scores(&self, limit: usize) -> Result<Vec<Score>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, username, score, created_at FROM scores
             ORDER BY score DESC, id ASC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(Score {
                id: row.get(0)?,
                username: row.get(1)?,
                score: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;
        let scores = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(scores)
    }

    fn create_score(&self, new: &NewScore) -> Result<Score, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let score = conn.query_row(
            "INSERT INTO scores (username, score, created_at) VALUES (?1, ?2, ?3)
             RETURNING id, username, score, created_at",
            params![new.username, new.score, now_unix()],
            |row| {
                Ok(Score {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    score: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        )?;
        Ok(score)
    }
}

/// Process-local store for tests and throwaway runs (`database = ":memory:"`).
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Score>>,
}

impl ScoreStore for MemoryStore {
    fn top_scores(&self, limit: usize) -> Result<Vec<Score>, StorageError> {
        let rows = self.rows.lock().map_err(|_| StorageError::Poisoned)?;
        let mut top = rows.clone();
        top.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
        top.truncate(limit);
        Ok(top)
    }

    fn create_score(&self, new: &NewScore) -> Result<Score, StorageError> {
        let mut rows = self.rows.lock().map_err(|_| StorageError::Poisoned)?;
        let score = Score {
            id: rows.len() as i64 + 1,
            username: new.username.clone(),
            score: new.score,
            created_at: now_unix(),
        };
        rows.push(score.clone());
        Ok(score)
    }
}

/// `":memory:"` selects [`MemoryStore`], anything else is a SQLite file path.
pub fn open_store(database: &str) -> Result<Arc<dyn ScoreStore>, StorageError> {
    if database == ":memory:" {
        log::warn!("using in-memory score store; scores are lost on restart");
        return Ok(Arc::new(MemoryStore::default()));
    }
    log::info!("opening score database {database}");
    Ok(Arc::new(SqliteStore::open(database)?))
}
