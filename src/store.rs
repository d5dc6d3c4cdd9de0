use rusqlite::Connection;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, warn};

/// Storage keys, one JSON value per key
pub mod keys {
    pub const THEME: &str = "theme";
    pub const TASKS: &str = "tasks";
    pub const TASK_ID_COUNTER: &str = "taskIdCounter";
    pub const FOCUS_SESSIONS: &str = "focusSessions";
    pub const SCHEDULE: &str = "schedule";
    pub const NOTES: &str = "notes";
    pub const NOTE_ID_COUNTER: &str = "noteIdCounter";
    pub const FLASHCARDS: &str = "flashcards";
    pub const FLASHCARD_ID_COUNTER: &str = "flashcardIdCounter";
    pub const JOURNAL_ENTRIES: &str = "journalEntries";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create storage directory: {0}")]
    DirectoryError(String),
    #[error("Invalid JSON stored under '{key}': {source}")]
    JsonError {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Narrow get/set/remove interface over named JSON values.
///
/// All calls are synchronous and complete before returning.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Write several keys together. Implementations that support
    /// transactions make the whole batch visible at once.
    fn set_many(&self, entries: &[(&str, Value)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// Durable store backed by a single SQLite table
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the store file and initialize the schema
    pub fn new(path: &str) -> Result<Self, StoreError> {
        let db_path = PathBuf::from(path);

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;
        let store = SqliteStore { conn };
        store.initialize_schema()?;

        Ok(store)
    }

    /// Open a throwaway store that lives only as long as the connection
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = SqliteStore {
            conn: Connection::open_in_memory()?,
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key             TEXT PRIMARY KEY,
                value           TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn write(conn: &Connection, key: &str, value: &Value) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(value).map_err(|source| StoreError::JsonError {
            key: key.to_string(),
            source,
        })?;
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE
             SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![
                key,
                encoded,
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
            ],
        )?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let result = self.conn.query_row(
            "SELECT value FROM kv WHERE key = ?1",
            rusqlite::params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StoreError::JsonError {
                    key: key.to_string(),
                    source,
                }),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::from(e)),
        }
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        Self::write(&self.conn, key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key])?;
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, Value)]) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in entries {
            Self::write(&tx, key, value)?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// Volatile store used for tests and when the durable store cannot be opened
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// A module's view of the shared store.
///
/// The first storage failure switches the handle to in-memory-only
/// operation for the rest of the session; callers never see the error.
pub struct Persistence {
    store: Rc<dyn KeyValueStore>,
    scope: &'static str,
    degraded: Cell<bool>,
}

impl Persistence {
    pub fn new(store: Rc<dyn KeyValueStore>, scope: &'static str) -> Self {
        Self {
            store,
            scope,
            degraded: Cell::new(false),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.get()
    }

    /// Read and decode a value. Missing, undecodable and unreadable values all yield `None`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if self.is_degraded() {
            return None;
        }

        match self.store.get(key) {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    warn!(scope = self.scope, key, error = %e, "ignoring undecodable stored value");
                    None
                }
            },
            Ok(None) => None,
            Err(e @ StoreError::JsonError { .. }) => {
                warn!(scope = self.scope, key, error = %e, "ignoring undecodable stored value");
                None
            }
            Err(e) => {
                self.degrade(&e);
                None
            }
        }
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Some(encoded) = self.encode(key, value) {
            self.write_all(&[(key, encoded)]);
        }
    }

    /// Save two values in one batch (a list and its id counter)
    pub fn save_pair<A, B>(&self, first: (&str, &A), second: (&str, &B))
    where
        A: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let (Some(a), Some(b)) = (self.encode(first.0, first.1), self.encode(second.0, second.1))
        else {
            return;
        };
        self.write_all(&[(first.0, a), (second.0, b)]);
    }

    pub fn remove(&self, key: &str) {
        if self.is_degraded() {
            return;
        }
        if let Err(e) = self.store.remove(key) {
            self.degrade(&e);
        }
    }

    fn encode<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Option<Value> {
        match serde_json::to_value(value) {
            Ok(encoded) => Some(encoded),
            Err(e) => {
                warn!(scope = self.scope, key, error = %e, "failed to encode value, not saved");
                None
            }
        }
    }

    fn write_all(&self, entries: &[(&str, Value)]) {
        if self.is_degraded() {
            debug!(scope = self.scope, "storage degraded, keeping changes in memory");
            return;
        }
        if let Err(e) = self.store.set_many(entries) {
            self.degrade(&e);
        }
    }

    fn degrade(&self, error: &StoreError) {
        warn!(
            scope = self.scope,
            error = %error,
            "storage unavailable, continuing in memory for this session"
        );
        self.degraded.set(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FailingStore;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_sqlite_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("app.db");
        let path = path.to_str().unwrap();

        {
            let store = SqliteStore::new(path).unwrap();
            store.set(keys::TASKS, &json!([{"id": 1}])).unwrap();
            store.set(keys::THEME, &json!("dark")).unwrap();
            store.remove(keys::THEME).unwrap();
        }

        let store = SqliteStore::new(path).unwrap();
        assert_eq!(store.get(keys::TASKS).unwrap(), Some(json!([{"id": 1}])));
        assert_eq!(store.get(keys::THEME).unwrap(), None);
    }

    #[test]
    fn test_sqlite_set_overwrites() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("k", &json!(1)).unwrap();
        store.set("k", &json!(2)).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!(2)));
    }

    #[test]
    fn test_sqlite_set_many_writes_all_keys() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .set_many(&[(keys::NOTES, json!([])), (keys::NOTE_ID_COUNTER, json!(3))])
            .unwrap();
        assert_eq!(store.get(keys::NOTES).unwrap(), Some(json!([])));
        assert_eq!(store.get(keys::NOTE_ID_COUNTER).unwrap(), Some(json!(3)));
    }

    #[test]
    fn test_sqlite_rejects_corrupt_json() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO kv (key, value, updated_at) VALUES ('tasks', 'not json', 'x')",
                [],
            )
            .unwrap();
        assert!(matches!(
            store.get(keys::TASKS),
            Err(StoreError::JsonError { .. })
        ));

        // an unreadable value is treated as missing, not as a storage outage
        let persistence = Persistence::new(Rc::new(store), "tasks");
        assert_eq!(persistence.load::<Vec<u64>>(keys::TASKS), None);
        assert!(!persistence.is_degraded());
    }

    #[test]
    fn test_persistence_round_trip() {
        let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let persistence = Persistence::new(Rc::clone(&store), "test");

        persistence.save_pair((keys::TASKS, &vec![1u64, 2]), (keys::TASK_ID_COUNTER, &3u64));

        assert_eq!(persistence.load::<Vec<u64>>(keys::TASKS), Some(vec![1, 2]));
        assert_eq!(persistence.load::<u64>(keys::TASK_ID_COUNTER), Some(3));
        assert!(!persistence.is_degraded());
    }

    #[test]
    fn test_persistence_ignores_wrong_shape() {
        let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        store.set(keys::TASK_ID_COUNTER, &json!("4")).unwrap();
        let persistence = Persistence::new(store, "test");

        assert_eq!(persistence.load::<u64>(keys::TASK_ID_COUNTER), None);
        assert!(!persistence.is_degraded());
    }

    #[test]
    fn test_persistence_degrades_on_failure() {
        let persistence = Persistence::new(Rc::new(FailingStore), "test");

        assert_eq!(persistence.load::<Vec<u64>>(keys::TASKS), None);
        assert!(persistence.is_degraded());

        // further writes are swallowed
        persistence.save(keys::TASKS, &vec![1u64]);
        persistence.remove(keys::TASKS);
        assert!(persistence.is_degraded());
    }
}
