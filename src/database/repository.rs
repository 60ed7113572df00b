/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for the persistent string cache,
 * abstracting away the SQL details and providing type-safe access.
 */

use anyhow::Result;
use log::debug;
use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};

use super::connection::DatabaseConnection;
use super::models::{CacheRecord, CacheStats};

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// The underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Hash identifying a prompt sent for a target language
    pub fn cache_key(language: &str, prompt: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(language.as_bytes());
        hasher.update([0u8]);
        hasher.update(prompt.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Get a cached response
    pub async fn get_cached_response(&self, language: &str, prompt: &str) -> Result<Option<String>> {
        let key_hash = Self::cache_key(language, prompt);

        self.db
            .execute_async(move |conn| {
                let response: Option<String> = conn
                    .query_row(
                        "SELECT response FROM string_cache WHERE key_hash = ?1",
                        [&key_hash],
                        |row| row.get(0),
                    )
                    .optional()?;

                if response.is_some() {
                    conn.execute(
                        "UPDATE string_cache SET hit_count = hit_count + 1 WHERE key_hash = ?1",
                        [&key_hash],
                    )?;
                    debug!("Persistent cache hit for {}", &key_hash[..12]);
                }
                Ok(response)
            })
            .await
    }

    /// Store a response, replacing any previous one for the same key
    pub async fn cache_response(&self, record: &CacheRecord) -> Result<()> {
        let record = record.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO string_cache (key_hash, language, prompt, response, created_at, hit_count)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    ON CONFLICT(key_hash) DO UPDATE SET response = excluded.response
                    "#,
                    params![
                        record.key_hash,
                        record.language,
                        record.prompt,
                        record.response,
                        record.created_at,
                        record.hit_count,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// All stored records for a language, oldest first
    pub async fn get_language_records(&self, language: &str) -> Result<Vec<CacheRecord>> {
        let language = language.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT key_hash, language, prompt, response, created_at, hit_count
                    FROM string_cache
                    WHERE language = ?1
                    ORDER BY created_at, key_hash
                    "#,
                )?;
                let records = stmt
                    .query_map([&language], |row| {
                        Ok(CacheRecord {
                            key_hash: row.get(0)?,
                            language: row.get(1)?,
                            prompt: row.get(2)?,
                            response: row.get(3)?,
                            created_at: row.get(4)?,
                            hit_count: row.get(5)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(records)
            })
            .await
    }

    /// Get cache statistics
    pub async fn get_cache_stats(&self) -> Result<CacheStats> {
        self.db
            .execute_async(|conn| {
                let total_entries: i64 = conn
                    .query_row("SELECT COUNT(*) FROM string_cache", [], |row| row.get(0))
                    .unwrap_or(0);

                let total_hits: i64 = conn
                    .query_row(
                        "SELECT COALESCE(SUM(hit_count), 0) FROM string_cache",
                        [],
                        |row| row.get(0),
                    )
                    .unwrap_or(0);

                Ok(CacheStats {
                    total_entries,
                    total_hits,
                })
            })
            .await
    }

    /// Clear the whole string cache
    pub async fn clear_cache(&self) -> Result<i64> {
        self.db
            .execute_async(|conn| {
                let deleted = conn.execute("DELETE FROM string_cache", [])?;
                Ok(deleted as i64)
            })
            .await
    }

    /// Clear the entries of one target language
    pub async fn clear_language(&self, language: &str) -> Result<i64> {
        let language = language.to_string();

        self.db
            .execute_async(move |conn| {
                let deleted = conn.execute("DELETE FROM string_cache WHERE language = ?1", [&language])?;
                Ok(deleted as i64)
            })
            .await
    }
}
