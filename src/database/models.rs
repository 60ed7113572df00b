/*!
 * Database record types.
 */

use serde::{Deserialize, Serialize};

/// A stored backend response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// SHA256 hash of language and prompt
    pub key_hash: String,
    /// Target language name
    pub language: String,
    /// Fully composed prompt
    pub prompt: String,
    /// Raw backend response
    pub response: String,
    /// Creation timestamp
    pub created_at: String,
    /// Number of cache hits
    pub hit_count: i64,
}

impl CacheRecord {
    /// Create a new cache record
    pub fn new(key_hash: String, language: String, prompt: String, response: String) -> Self {
        Self {
            key_hash,
            language,
            prompt,
            response,
            created_at: chrono::Utc::now().to_rfc3339(),
            hit_count: 0,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of cache entries
    pub total_entries: i64,
    /// Total number of cache hits
    pub total_hits: i64,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cache entries: {}, hits: {}", self.total_entries, self.total_hits)
    }
}
