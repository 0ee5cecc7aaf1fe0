use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};

pub const TOKEN_KEY: &str = "token";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("no data directory available")]
    NoDataDir,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Small key/value store persisted in SQLite; the client keeps only the
/// session token in it.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

fn default_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("com", "maischat", "MaisChatViewer")?;
    Some(proj.data_dir().join("local.sqlite"))
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

impl LocalStore {
    pub fn open_default() -> Result<Self, StorageError> {
        let path = default_path().ok_or(StorageError::NoDataDir)?;
        Self::at(path)
    }

    pub fn at(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let store = Self { path: path.into() };
        store.init()?;
        Ok(store)
    }

    fn open_conn(&self) -> Result<Connection, StorageError> {
        ensure_dir(&self.path)?;
        Ok(Connection::open(&self.path)?)
    }

    fn init(&self) -> Result<(), StorageError> {
        let conn = self.open_conn()?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.open_conn()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let now = chrono::Utc::now().timestamp();
        let conn = self.open_conn()?;
        conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value=excluded.value,
                updated_at=excluded.updated_at
            "#,
            params![key, value, now],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.open_conn()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::at(dir.path().join("nested/local.sqlite")).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);

        store.set(TOKEN_KEY, "abc").unwrap();
        store.set(TOKEN_KEY, "def").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("def"));

        store.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn value_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.sqlite");
        LocalStore::at(&path).unwrap().set(TOKEN_KEY, "persisted").unwrap();
        let reopened = LocalStore::at(&path).unwrap();
        assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("persisted"));
    }
}
