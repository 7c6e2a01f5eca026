//! SQLite-backed persistent store with per-entry write timestamps
//!
//! Entries are never deleted; they are superseded on write and evaluated
//! for expiry at read time. Two independent expiry checks apply on every
//! read: an optional caller-supplied max age, and the session-wide
//! `login_expiry` marker.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::cache::keys;
use crate::error::CacheError;

/// Schema version - a mismatch is treated as a corrupt store
const SCHEMA_VERSION: i32 = 1;

type Result<T> = std::result::Result<T, CacheError>;

/// Persistent key/value store with read-time TTL evaluation
pub struct TtlStore {
    conn: Mutex<Connection>,
}

impl TtlStore {
    /// Open or create the store at the default per-user cache location
    pub fn open_default() -> Result<Self> {
        let dir = Self::default_dir()?;
        Self::open_at(&dir)
    }

    /// Default cache directory (`~/.cache/carbonlink` on Linux)
    pub fn default_dir() -> Result<PathBuf> {
        let base = dirs::cache_dir().ok_or(CacheError::NoHome)?;
        Ok(base.join("carbonlink"))
    }

    /// Open or create the store in a specific directory.
    ///
    /// An unreadable or otherwise corrupt database is a fatal error here,
    /// never silently replaced with an empty store: a cache that quietly
    /// starts cold would mask the corruption behind spurious re-fetches
    /// and re-logins.
    pub fn open_at(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .map_err(|e| CacheError::Io(format!("Failed to create cache dir: {e}")))?;

        let db_path = dir.join("cache.db");
        let conn = Connection::open(&db_path)?;

        let version: i32 = conn
            .pragma_query_value(None, "user_version", |r| r.get(0))
            .map_err(|e| CacheError::Corrupt(format!("{}: {e}", db_path.display())))?;

        if version != 0 && version != SCHEMA_VERSION {
            return Err(CacheError::Corrupt(format!(
                "{}: schema version {version}, expected {SCHEMA_VERSION}",
                db_path.display()
            )));
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
                cache_key TEXT PRIMARY KEY NOT NULL,
                value BLOB NOT NULL,
                written_at INTEGER NOT NULL
            );
            "#,
        )
        .map_err(|e| CacheError::Corrupt(format!("{}: {e}", db_path.display())))?;

        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Persist `value` under `key` with the current timestamp, superseding
    /// any previous entry
    pub fn store(&self, key: &str, value: &[u8]) -> Result<()> {
        let conn = self.lock()?;
        let now = Utc::now().timestamp();

        conn.execute(
            "INSERT OR REPLACE INTO cache_entries (cache_key, value, written_at)
             VALUES (?1, ?2, ?3)",
            params![key, value, now],
        )?;

        log::debug!("cache stored: {key}");
        Ok(())
    }

    /// Serialize `value` as JSON and store it under `key`
    pub fn store_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_vec(value)
            .map_err(|e| CacheError::Io(format!("Failed to serialize entry '{key}': {e}")))?;
        self.store(key, &json)
    }

    /// Stored value for `key`, or `None` when the entry is missing, older
    /// than `max_age`, or the session has lapsed.
    ///
    /// The session check applies to every key except the `login_expiry`
    /// marker itself: once the marker indicates a lapsed login, ordinary
    /// entries are refused regardless of their own freshness. The three
    /// miss causes are logged distinctly but are indistinguishable to the
    /// caller.
    pub fn get(&self, key: &str, max_age: Option<Duration>) -> Result<Option<Vec<u8>>> {
        let conn = self.lock()?;
        let now = Utc::now().timestamp();

        if key != keys::LOGIN_EXPIRY && Self::session_lapsed(&conn, now)? {
            log::debug!("cache expired (session lapsed): {key}");
            return Ok(None);
        }

        let row: Option<(Vec<u8>, i64)> = conn
            .query_row(
                "SELECT value, written_at FROM cache_entries WHERE cache_key = ?1",
                [key],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;

        let Some((value, written_at)) = row else {
            log::debug!("cache miss: {key}");
            return Ok(None);
        };

        if let Some(max_age) = max_age {
            let age = now.saturating_sub(written_at);
            if age > max_age.as_secs() as i64 {
                log::debug!("cache expired (age {age}s): {key}");
                return Ok(None);
            }
        }

        log::debug!("cache hit: {key}");
        Ok(Some(value))
    }

    /// JSON-decoded stored value for `key`, subject to the same expiry
    /// rules as [`get`](Self::get)
    pub fn get_json<T: DeserializeOwned>(
        &self,
        key: &str,
        max_age: Option<Duration>,
    ) -> Result<Option<T>> {
        match self.get(key, max_age)? {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| {
                CacheError::Corrupt(format!("entry '{key}' is not valid JSON: {e}"))
            }),
        }
    }

    fn session_lapsed(conn: &Connection, now: i64) -> Result<bool> {
        let value: Option<Vec<u8>> = conn
            .query_row(
                "SELECT value FROM cache_entries WHERE cache_key = ?1",
                [keys::LOGIN_EXPIRY],
                |r| r.get(0),
            )
            .optional()?;

        match value {
            None => Ok(true),
            Some(bytes) => {
                let expiry: i64 = serde_json::from_slice(&bytes).map_err(|e| {
                    CacheError::Corrupt(format!("login_expiry entry is not a timestamp: {e}"))
                })?;
                Ok(now >= expiry)
            }
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CacheError::Io("Cache lock poisoned".to_string()))
    }

    /// Shift an entry's write timestamp into the past
    #[cfg(test)]
    pub(crate) fn backdate(&self, key: &str, secs: i64) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE cache_entries SET written_at = written_at - ?1 WHERE cache_key = ?2",
            params![secs, key],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TtlStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = TtlStore::open_at(dir.path()).unwrap();
        (store, dir)
    }

    fn seed_live_session(store: &TtlStore) {
        let expiry = Utc::now().timestamp() + 3600;
        store.store_json(keys::LOGIN_EXPIRY, &expiry).unwrap();
    }

    #[test]
    fn test_roundtrip_with_live_session() {
        let (store, _dir) = test_store();
        seed_live_session(&store);

        store.store("services", b"[1,2,3]").unwrap();
        assert_eq!(store.get("services", None).unwrap(), Some(b"[1,2,3]".to_vec()));
    }

    #[test]
    fn test_missing_session_marker_blocks_reads() {
        let (store, _dir) = test_store();

        store.store("services", b"[1]").unwrap();
        assert_eq!(store.get("services", None).unwrap(), None);
    }

    #[test]
    fn test_lapsed_session_blocks_every_other_key() {
        let (store, _dir) = test_store();
        seed_live_session(&store);
        store.store("services", b"[1]").unwrap();
        store.store("customer", b"{}").unwrap();

        let past = Utc::now().timestamp() - 1;
        store.store_json(keys::LOGIN_EXPIRY, &past).unwrap();

        assert_eq!(store.get("services", None).unwrap(), None);
        assert_eq!(store.get("customer", None).unwrap(), None);

        // The marker itself stays readable, otherwise the session state
        // could never be inspected after a lapse.
        let marker: i64 = store
            .get_json(keys::LOGIN_EXPIRY, None)
            .unwrap()
            .expect("marker should be readable");
        assert_eq!(marker, past);
    }

    #[test]
    fn test_max_age_both_sides_of_boundary() {
        let (store, _dir) = test_store();
        seed_live_session(&store);

        store.store("services", b"[1]").unwrap();
        store.backdate("services", 30).unwrap();

        // Fresh enough
        assert!(
            store
                .get("services", Some(Duration::from_secs(60)))
                .unwrap()
                .is_some()
        );
        // Too old
        assert!(
            store
                .get("services", Some(Duration::from_secs(10)))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_max_age_boundary_is_inclusive() {
        let (store, _dir) = test_store();
        seed_live_session(&store);

        store.store("services", b"[1]").unwrap();
        store.backdate("services", 30).unwrap();

        // age == max_age still serves
        assert!(
            store
                .get("services", Some(Duration::from_secs(30)))
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn test_overwrite_supersedes() {
        let (store, _dir) = test_store();
        seed_live_session(&store);

        store.store("customer", b"old").unwrap();
        store.store("customer", b"new").unwrap();
        assert_eq!(store.get("customer", None).unwrap(), Some(b"new".to_vec()));
    }

    #[test]
    fn test_json_roundtrip() {
        let (store, _dir) = test_store();
        seed_live_session(&store);

        store.store_json("customer", &serde_json::json!({"id": 7})).unwrap();
        let value: serde_json::Value = store.get_json("customer", None).unwrap().unwrap();
        assert_eq!(value["id"], 7);
    }

    #[test]
    fn test_corrupt_database_is_fatal_on_open() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("cache.db"), b"definitely not sqlite").unwrap();

        match TtlStore::open_at(dir.path()) {
            Err(CacheError::Corrupt(_)) => (),
            Err(e) => panic!("Expected CacheError::Corrupt, got {e:?}"),
            Ok(_) => panic!("Expected CacheError::Corrupt, got an open store"),
        }
    }

    #[test]
    fn test_schema_version_mismatch_is_fatal() {
        let dir = TempDir::new().unwrap();
        drop(TtlStore::open_at(dir.path()).unwrap());

        let conn = Connection::open(dir.path().join("cache.db")).unwrap();
        conn.pragma_update(None, "user_version", 99).unwrap();
        drop(conn);

        match TtlStore::open_at(dir.path()) {
            Err(CacheError::Corrupt(msg)) => assert!(msg.contains("schema version")),
            Err(e) => panic!("Expected CacheError::Corrupt, got {e:?}"),
            Ok(_) => panic!("Expected CacheError::Corrupt, got an open store"),
        }
    }
}
