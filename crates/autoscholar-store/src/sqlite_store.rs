use std::path::Path;
use std::sync::mpsc::Receiver;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::event::{ChangeNotifier, KeyChanged};
use crate::store::{KeyValueStore, StoreError};

/// SQLite-backed implementation of the KeyValueStore trait.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    notifier: ChangeNotifier,
}

impl SqliteStore {
    /// Open (or create) a database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn =
            Connection::open(path).map_err(|e| StoreError::Storage(format!("open: {}", e)))?;
        Self::init_with_connection(conn)
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Storage(format!("open_in_memory: {}", e)))?;
        Self::init_with_connection(conn)
    }

    fn init_with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;

            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )
        .map_err(|e| StoreError::Storage(format!("init_schema: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
            notifier: ChangeNotifier::new(),
        })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|e| StoreError::Storage(format!("get: {}", e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        {
            let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
            conn.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(|e| StoreError::Storage(format!("set: {}", e)))?;
        }
        self.notifier.notify(key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let removed = {
            let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])
                .map_err(|e| StoreError::Storage(format!("remove: {}", e)))?
        };
        if removed > 0 {
            self.notifier.notify(key);
        }
        Ok(())
    }

    fn subscribe(&self, key: &str) -> Receiver<KeyChanged> {
        self.notifier.subscribe(key)
    }
}
