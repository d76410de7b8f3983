//! SQLite-backed session cache.
//!
//! One database file can hold several client sessions; every row is keyed by
//! the session identifier so sessions never see each other's entries.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use locapub_shared::constants::DEFAULT_CACHE_QUOTA_BYTES;

use crate::cache::CacheStore;
use crate::error::{Result, StoreError};
use crate::migrations;

/// Cache entries of one session stored in SQLite.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    session_id: String,
    quota_bytes: usize,
}

impl SqliteStore {
    /// Open the default cache database under a fresh session.
    ///
    /// The file lives in the platform cache directory:
    /// - Linux:   `~/.cache/locapub/session-cache.db`
    /// - macOS:   `~/Library/Caches/com.locapub.locapub/session-cache.db`
    /// - Windows: `{FOLDERID_LocalAppData}\locapub\locapub\cache\session-cache.db`
    pub fn new() -> Result<Self> {
        Self::open_default(DEFAULT_CACHE_QUOTA_BYTES)
    }

    /// Same as [`new`](Self::new) with an explicit quota.
    pub fn open_default(quota_bytes: usize) -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("com", "locapub", "locapub").ok_or(StoreError::NoDataDir)?;

        let cache_dir = project_dirs.cache_dir();
        std::fs::create_dir_all(cache_dir)?;

        Self::open_session(&cache_dir.join("session-cache.db"), quota_bytes)
    }

    /// Open the database at `path` under a fresh session.
    pub fn open_session(path: &Path, quota_bytes: usize) -> Result<Self> {
        Self::open_at(path, &Uuid::new_v4().to_string(), quota_bytes)
    }

    /// Open (or create) a cache database at an explicit path for `session_id`.
    pub fn open_at(path: &Path, session_id: &str, quota_bytes: usize) -> Result<Self> {
        tracing::info!(path = %path.display(), session = session_id, "opening session cache");

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        migrations::run_migrations(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            session_id: session_id.to_string(),
            quota_bytes,
        })
    }

    /// Cache living only as long as this handle.
    pub fn in_memory(quota_bytes: usize) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run_migrations(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            session_id: Uuid::new_v4().to_string(),
            quota_bytes,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.conn()
            .ok()
            .and_then(|conn| conn.path().map(PathBuf::from))
    }

    /// Drop every entry of this session.
    pub fn clear(&self) -> Result<usize> {
        let removed = self.conn()?.execute(
            "DELETE FROM session_cache WHERE session_id = ?1",
            params![self.session_id],
        )?;
        Ok(removed)
    }

    /// Drop entries left behind by every other session in this file.
    pub fn purge_other_sessions(&self) -> Result<usize> {
        let removed = self.conn()?.execute(
            "DELETE FROM session_cache WHERE session_id <> ?1",
            params![self.session_id],
        )?;
        if removed > 0 {
            tracing::debug!(removed, "purged stale session cache rows");
        }
        Ok(removed)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl CacheStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()?
            .query_row(
                "SELECT value FROM session_cache WHERE session_id = ?1 AND key = ?2",
                params![self.session_id, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;

        let others: i64 = conn.query_row(
            "SELECT COALESCE(SUM(length(CAST(key AS BLOB)) + length(CAST(value AS BLOB))), 0)
             FROM session_cache
             WHERE session_id = ?1 AND key <> ?2",
            params![self.session_id, key],
            |row| row.get(0),
        )?;
        let needed = others.max(0) as usize + key.len() + value.len();
        if needed > self.quota_bytes {
            return Err(StoreError::QuotaExceeded {
                needed,
                quota: self.quota_bytes,
            });
        }

        conn.execute(
            "INSERT INTO session_cache (session_id, key, value, written_at)
             VALUES (?1, ?2, ?3, strftime('%s', 'now'))
             ON CONFLICT (session_id, key)
             DO UPDATE SET value = excluded.value, written_at = excluded.written_at",
            params![self.session_id, key, value],
        )?;
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<()> {
        self.conn()?.execute(
            "DELETE FROM session_cache WHERE session_id = ?1 AND key = ?2",
            params![self.session_id, key],
        )?;
        Ok(())
    }
}
