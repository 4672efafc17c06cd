use std::{
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};

pub const POSTS_KEY: &str = "reddit_posts";
pub const SUBREDDITS_KEY: &str = "reddit_subreddits";

const TEMPLATE_CACHE_UP_SQL: &str = "
CREATE TABLE IF NOT EXISTS local_storage (
    key   TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);";

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("corrupt cache entry: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key -> string value storage; entries are always read and written whole
#[derive(Debug)]
pub struct LocalCache {
    conn: Mutex<Connection>,
}

impl LocalCache {
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if path.exists() {
            info!("Opening cache: {}", path.display());
        } else {
            info!("Creating cache: {}", path.display());
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, CacheError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, CacheError> {
        conn.execute_batch(TEMPLATE_CACHE_UP_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>, CacheError> {
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.conn().execute(
            "INSERT INTO local_storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> Result<(), CacheError> {
        self.conn()
            .execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// The array stored under `key`; empty when nothing was saved yet
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, CacheError> {
        match self.get_item(key)? {
            Some(value) => {
                debug!("Loading cache {}", key);
                Ok(serde_json::from_str(&value)?)
            }
            None => Ok(vec![]),
        }
    }

    pub fn save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), CacheError> {
        debug!("Saving cache {} ({} items)", key, items.len());
        let value = serde_json::to_string(items)?;
        self.set_item(key, &value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::User,
        post::{Post, PostDraft},
    };

    #[test]
    fn missing_key_loads_empty() {
        let cache = LocalCache::in_memory().unwrap();
        let posts: Vec<Post> = cache.load(POSTS_KEY).unwrap();
        assert!(posts.is_empty());
        assert_eq!(cache.get_item(POSTS_KEY).unwrap(), None);
    }

    #[test]
    fn save_overwrites_whole_array() {
        let cache = LocalCache::in_memory().unwrap();
        let user = User::new("u1", None);
        let a = Post::new(PostDraft::text("a", "general", ""), &user);
        let b = Post::new(PostDraft::text("b", "general", ""), &user);

        cache.save(POSTS_KEY, &[a.clone(), b]).unwrap();
        cache.save(POSTS_KEY, &[a.clone()]).unwrap();

        let posts: Vec<Post> = cache.load(POSTS_KEY).unwrap();
        assert_eq!(posts, vec![a]);
    }

    #[test]
    fn corrupt_entries_are_reported() {
        let cache = LocalCache::in_memory().unwrap();
        cache.set_item(POSTS_KEY, "{not json").unwrap();
        let loaded: Result<Vec<Post>, _> = cache.load(POSTS_KEY);
        assert!(matches!(loaded, Err(CacheError::Json(_))));

        cache.remove_item(POSTS_KEY).unwrap();
        assert_eq!(cache.get_item(POSTS_KEY).unwrap(), None);
    }

    #[test]
    fn entries_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");

        LocalCache::open(&path)
            .unwrap()
            .set_item(SUBREDDITS_KEY, "[]")
            .unwrap();

        let reopened = LocalCache::open(&path).unwrap();
        assert_eq!(
            reopened.get_item(SUBREDDITS_KEY).unwrap().as_deref(),
            Some("[]")
        );
    }
}
