//! Context store trait: the retrieval side of the pipeline.
//!
//! A context store holds short text snippets keyed by an identifier and
//! answers ranked lookups by lexical overlap between the query and the key.
//! Implementations must be safe for concurrent readers and writers without
//! any locking by the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::MemoryError;

/// Returned by `search` when the store holds nothing at all.
pub const NO_CONTEXT_AVAILABLE: &str = "No context available yet.";

/// Returned by `search` when the selection is empty (e.g. `limit == 0`).
pub const NO_RELEVANT_CONTEXT: &str = "No relevant context found.";

/// A single stored snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub key: String,
    pub text: String,
}

impl ContextEntry {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}

/// Render a ranked selection as the single block the prompt consumes.
///
/// `store_is_empty` selects the "nothing stored" sentinel over the
/// "nothing selected" one.
pub fn render_block(entries: &[ContextEntry], store_is_empty: bool) -> String {
    if store_is_empty {
        return NO_CONTEXT_AVAILABLE.to_string();
    }
    if entries.is_empty() {
        return NO_RELEVANT_CONTEXT.to_string();
    }
    entries
        .iter()
        .map(|e| format!("- {}", e.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The core ContextStore trait.
///
/// Implementations: in-memory (process lifetime). Entries are only added by
/// `upsert`; there is no delete and no expiry.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// The backend name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Insert or replace the entry for `key`. Last writer wins.
    async fn upsert(&self, key: &str, text: &str) -> std::result::Result<(), MemoryError>;

    /// The top `limit` entries ordered by descending overlap score, ties in
    /// insertion order.
    async fn rank(
        &self,
        query: &str,
        limit: usize,
    ) -> std::result::Result<Vec<ContextEntry>, MemoryError>;

    /// Get an entry by key.
    async fn get(&self, key: &str) -> std::result::Result<Option<ContextEntry>, MemoryError>;

    /// Number of stored entries.
    async fn len(&self) -> std::result::Result<usize, MemoryError>;

    /// Ranked lookup formatted as one bulleted block, with sentinels for an
    /// empty store or an empty selection.
    async fn search(&self, query: &str, limit: usize) -> std::result::Result<String, MemoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_empty_store_sentinel() {
        assert_eq!(render_block(&[], true), NO_CONTEXT_AVAILABLE);
    }

    #[test]
    fn render_empty_selection_sentinel() {
        assert_eq!(render_block(&[], false), NO_RELEVANT_CONTEXT);
    }

    #[test]
    fn render_bullets_joined_by_newline() {
        let entries = vec![
            ContextEntry::new("greeting", "Hello, visitor"),
            ContextEntry::new("farewell", "Goodbye"),
        ];
        assert_eq!(render_block(&entries, false), "- Hello, visitor\n- Goodbye");
    }
}
