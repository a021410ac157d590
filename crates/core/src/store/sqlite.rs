//! SQLite-backed movie store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::watch;
use tracing::debug;

use super::{MovieStore, StoreError};
use crate::movie::{CacheEntry, Favorite};

const FAVORITE_COLUMNS: &str =
    "id, name, image_url, price, currency, genre, long_description, duration_ms, release_date";

const CACHE_COLUMNS: &str = "id, name, image_url, price, currency, genre, long_description, \
     duration_ms, release_date, displayed, keyword, saved_at";

/// SQLite-backed movie store.
///
/// Snapshots are published while the connection lock is still held, so
/// observers receive them in commit order.
pub struct SqliteMovieStore {
    conn: Mutex<Connection>,
    favorites_tx: watch::Sender<Vec<Favorite>>,
    cache_tx: watch::Sender<Vec<CacheEntry>>,
}

impl SqliteMovieStore {
    /// Create a new SQLite store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::from_connection(conn)
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        Self::initialize_schema(&conn)?;
        let favorites = Self::load_favorites(&conn)?;
        let cache = Self::load_cache_entries(&conn)?;
        let (favorites_tx, _) = watch::channel(favorites);
        let (cache_tx, _) = watch::channel(cache);
        Ok(Self {
            conn: Mutex::new(conn),
            favorites_tx,
            cache_tx,
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            -- Favorites (one row per movie id)
            CREATE TABLE IF NOT EXISTS favorite (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                image_url TEXT NOT NULL,
                price REAL,
                currency TEXT NOT NULL,
                genre TEXT NOT NULL,
                long_description TEXT NOT NULL,
                duration_ms INTEGER NOT NULL,
                release_date TEXT NOT NULL
            );

            -- Last search results, or favorites mirrored for display
            CREATE TABLE IF NOT EXISTS cache_entry (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                image_url TEXT NOT NULL,
                price REAL,
                currency TEXT NOT NULL,
                genre TEXT NOT NULL,
                long_description TEXT NOT NULL,
                duration_ms INTEGER NOT NULL,
                release_date TEXT NOT NULL,
                displayed INTEGER NOT NULL DEFAULT 0,
                keyword TEXT NOT NULL DEFAULT '',
                saved_at TEXT NOT NULL,
                position INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_cache_entry_displayed ON cache_entry(displayed);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Internal("store connection lock poisoned".to_string()))
    }

    fn row_to_favorite(row: &rusqlite::Row) -> rusqlite::Result<Favorite> {
        Ok(Favorite {
            id: row.get(0)?,
            name: row.get(1)?,
            image_url: row.get(2)?,
            price: row.get(3)?,
            currency: row.get(4)?,
            genre: row.get(5)?,
            long_description: row.get(6)?,
            duration_ms: row.get(7)?,
            release_date: row.get(8)?,
        })
    }

    fn row_to_cache_entry(row: &rusqlite::Row) -> rusqlite::Result<CacheEntry> {
        let saved_at_str: String = row.get(11)?;
        let saved_at = DateTime::parse_from_rfc3339(&saved_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    11,
                    rusqlite::types::Type::Text,
                    Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("invalid saved_at {:?}: {}", saved_at_str, e),
                    )),
                )
            })?;

        Ok(CacheEntry {
            id: row.get(0)?,
            name: row.get(1)?,
            image_url: row.get(2)?,
            price: row.get(3)?,
            currency: row.get(4)?,
            genre: row.get(5)?,
            long_description: row.get(6)?,
            duration_ms: row.get(7)?,
            release_date: row.get(8)?,
            displayed: row.get(9)?,
            keyword: row.get(10)?,
            saved_at,
        })
    }

    fn load_favorites(conn: &Connection) -> Result<Vec<Favorite>, StoreError> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM favorite ORDER BY id",
                FAVORITE_COLUMNS
            ))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_favorite)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut favorites = Vec::new();
        for row in rows {
            favorites.push(row.map_err(|e| StoreError::Database(e.to_string()))?);
        }
        Ok(favorites)
    }

    fn load_cache_entries(conn: &Connection) -> Result<Vec<CacheEntry>, StoreError> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM cache_entry ORDER BY position, id",
                CACHE_COLUMNS
            ))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_cache_entry)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| StoreError::Database(e.to_string()))?);
        }
        Ok(entries)
    }

    fn insert_cache_entries(
        conn: &Connection,
        entries: &[CacheEntry],
    ) -> Result<(), StoreError> {
        let mut stmt = conn
            .prepare(
                "INSERT OR REPLACE INTO cache_entry (id, name, image_url, price, currency, genre,
                    long_description, duration_ms, release_date, displayed, keyword, saved_at, position)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        for (position, entry) in entries.iter().enumerate() {
            stmt.execute(params![
                entry.id,
                &entry.name,
                &entry.image_url,
                entry.price,
                &entry.currency,
                &entry.genre,
                &entry.long_description,
                entry.duration_ms,
                &entry.release_date,
                entry.displayed,
                &entry.keyword,
                entry.saved_at.to_rfc3339(),
                position as i64,
            ])
            .map_err(|e| StoreError::Database(e.to_string()))?;
        }
        Ok(())
    }

    fn publish_favorites(&self, conn: &Connection) -> Result<(), StoreError> {
        let favorites = Self::load_favorites(conn)?;
        self.favorites_tx.send_replace(favorites);
        Ok(())
    }

    fn publish_cache(&self, conn: &Connection) -> Result<(), StoreError> {
        let entries = Self::load_cache_entries(conn)?;
        self.cache_tx.send_replace(entries);
        Ok(())
    }
}

impl MovieStore for SqliteMovieStore {
    fn upsert_favorite(&self, favorite: &Favorite) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO favorite ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                FAVORITE_COLUMNS
            ),
            params![
                favorite.id,
                &favorite.name,
                &favorite.image_url,
                favorite.price,
                &favorite.currency,
                &favorite.genre,
                &favorite.long_description,
                favorite.duration_ms,
                &favorite.release_date,
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        debug!(id = favorite.id, "Favorite stored");
        self.publish_favorites(&conn)
    }

    fn delete_favorite(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let changed = conn
            .execute("DELETE FROM favorite WHERE id = ?", params![id])
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if changed > 0 {
            debug!(id, "Favorite removed");
            self.publish_favorites(&conn)?;
        }
        Ok(())
    }

    fn favorites(&self) -> Result<Vec<Favorite>, StoreError> {
        let conn = self.lock()?;
        Self::load_favorites(&conn)
    }

    fn observe_favorites(&self) -> watch::Receiver<Vec<Favorite>> {
        self.favorites_tx.subscribe()
    }

    fn replace_all_cache_entries(&self, entries: &[CacheEntry]) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tx.execute("DELETE FROM cache_entry", [])
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Self::insert_cache_entries(&tx, entries)?;

        tx.commit()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        debug!(count = entries.len(), "Cache replaced");
        self.publish_cache(&conn)
    }

    fn seed_cache_from_favorites(&self) -> Result<bool, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let count: i64 = tx
            .query_row("SELECT COUNT(*) FROM cache_entry", [], |row| row.get(0))
            .map_err(|e| StoreError::Database(e.to_string()))?;
        if count > 0 {
            return Ok(false);
        }

        let entries: Vec<CacheEntry> = Self::load_favorites(&tx)?
            .iter()
            .map(|favorite| CacheEntry::from_movie(&favorite.to_movie(), ""))
            .collect();
        if entries.is_empty() {
            return Ok(false);
        }

        tx.execute("DELETE FROM cache_entry", [])
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Self::insert_cache_entries(&tx, &entries)?;

        tx.commit()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        debug!(count = entries.len(), "Cache seeded from favorites");
        self.publish_cache(&conn)?;
        Ok(true)
    }

    fn set_displayed(&self, id: i64) -> Result<bool, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM cache_entry WHERE id = ?",
                params![id],
                |_| Ok(()),
            )
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();
        if !exists {
            return Ok(false);
        }

        tx.execute(
            "UPDATE cache_entry SET displayed = (id = ?1) WHERE displayed = 1 OR id = ?1",
            params![id],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        tx.commit()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        self.publish_cache(&conn)?;
        Ok(true)
    }

    fn clear_displayed(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE cache_entry SET displayed = 0 WHERE displayed = 1",
                [],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if changed > 0 {
            self.publish_cache(&conn)?;
        }
        Ok(())
    }

    fn get_displayed(&self) -> Result<Option<CacheEntry>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM cache_entry WHERE displayed = 1 LIMIT 1",
                CACHE_COLUMNS
            ))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut rows = stmt
            .query_map([], Self::row_to_cache_entry)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        match rows.next() {
            Some(row) => Ok(Some(
                row.map_err(|e| StoreError::Database(e.to_string()))?,
            )),
            None => Ok(None),
        }
    }

    fn clear_all_cache_entries(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let changed = conn
            .execute("DELETE FROM cache_entry", [])
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if changed > 0 {
            debug!(count = changed, "Cache cleared");
            self.publish_cache(&conn)?;
        }
        Ok(())
    }

    fn cache_entries(&self) -> Result<Vec<CacheEntry>, StoreError> {
        let conn = self.lock()?;
        Self::load_cache_entries(&conn)
    }

    fn is_cache_empty(&self) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM cache_entry", [], |row| row.get(0))
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(count == 0)
    }

    fn observe_cache_entries(&self) -> watch::Receiver<Vec<CacheEntry>> {
        self.cache_tx.subscribe()
    }
}
