/*!
 * String cache for backend responses.
 *
 * Responses are keyed by the target language and the fully composed prompt.
 * An in-memory map answers repeated requests within a run; an optional SQLite
 * store keeps them across runs.
 */

use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::RwLock;
use log::{debug, warn};

use crate::database::{CacheRecord, Repository};
use crate::errors::TranslationError;

/// Cache key combining target language and prompt hash
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    /// Target language name
    language: String,

    /// SHA256 of language and prompt
    prompt_hash: String,
}

impl CacheKey {
    fn new(language: &str, prompt: &str) -> Self {
        Self {
            language: language.to_string(),
            prompt_hash: Repository::cache_key(language, prompt),
        }
    }
}

/// Which entries to clear
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheScope {
    /// Every entry
    All,
    /// Only the entries of one target language
    Language(String),
}

/// String cache for storing and retrieving backend responses
#[derive(Clone)]
pub struct StringCache {
    /// In-memory storage
    cache: Arc<RwLock<HashMap<CacheKey, String>>>,

    /// Optional persistent store
    store: Option<Repository>,

    /// Cache hit counter
    hits: Arc<RwLock<usize>>,

    /// Cache miss counter
    misses: Arc<RwLock<usize>>,

    /// Whether lookups and stores are performed
    enabled: bool,
}

impl StringCache {
    /// Create a memory-only cache
    pub fn new(enabled: bool) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            store: None,
            hits: Arc::new(RwLock::new(0)),
            misses: Arc::new(RwLock::new(0)),
            enabled,
        }
    }

    /// Create a cache backed by a persistent store
    pub fn with_store(enabled: bool, store: Repository) -> Self {
        Self {
            store: Some(store),
            ..Self::new(enabled)
        }
    }

    /// Look up the response for a prompt
    pub async fn get(&self, language: &str, prompt: &str) -> Result<Option<String>, TranslationError> {
        if !self.enabled {
            return Ok(None);
        }

        let key = CacheKey::new(language, prompt);
        let cached = self.cache.read().get(&key).cloned();
        if let Some(response) = cached {
            *self.hits.write() += 1;
            debug!("String cache hit for {} ({})", language, short_hash(&key.prompt_hash));
            return Ok(Some(response));
        }

        if let Some(store) = &self.store {
            let stored = store
                .get_cached_response(language, prompt)
                .await
                .map_err(|e| TranslationError::Cache(e.to_string()))?;
            if let Some(response) = stored {
                self.cache.write().insert(key, response.clone());
                *self.hits.write() += 1;
                debug!("String cache hit for {} from store", language);
                return Ok(Some(response));
            }
        }

        *self.misses.write() += 1;
        debug!("String cache miss for {} ({})", language, short_hash(&key.prompt_hash));
        Ok(None)
    }

    /// Store the response for a prompt
    pub async fn put(&self, language: &str, prompt: &str, response: &str) -> Result<(), TranslationError> {
        if !self.enabled {
            return Ok(());
        }

        let key = CacheKey::new(language, prompt);
        if let Some(store) = &self.store {
            let record = CacheRecord::new(
                key.prompt_hash.clone(),
                language.to_string(),
                prompt.to_string(),
                response.to_string(),
            );
            store
                .cache_response(&record)
                .await
                .map_err(|e| TranslationError::Cache(e.to_string()))?;
        }

        self.cache.write().insert(key, response.to_string());
        debug!("Cached response for {}", language);
        Ok(())
    }

    /// Remove entries, in memory and in the store
    pub async fn clear(&self, scope: &CacheScope) -> Result<(), TranslationError> {
        match scope {
            CacheScope::All => {
                self.cache.write().clear();
                *self.hits.write() = 0;
                *self.misses.write() = 0;
            }
            CacheScope::Language(language) => {
                self.cache.write().retain(|key, _| &key.language != language);
            }
        }

        if let Some(store) = &self.store {
            let deleted = match scope {
                CacheScope::All => store.clear_cache().await,
                CacheScope::Language(language) => store.clear_language(language).await,
            }
            .map_err(|e| TranslationError::Cache(e.to_string()))?;
            debug!("Removed {} stored responses ({:?})", deleted, scope);
        }

        debug!("String cache cleared ({:?})", scope);
        Ok(())
    }

    /// Get cache statistics: hits, misses and hit rate
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = *self.hits.read();
        let misses = *self.misses.read();
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        (hits, misses, hit_rate)
    }

    /// Get the number of entries held in memory
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Check if the in-memory cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Enable or disable the cache without discarding entries
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled && self.store.is_some() {
            warn!("String cache bypassed, stored responses are kept but not used");
        }
        self.enabled = enabled;
    }

    /// Check if the cache is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether responses survive the process
    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }
}

impl Default for StringCache {
    fn default() -> Self {
        Self::new(true)
    }
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}
