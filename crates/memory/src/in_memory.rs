//! In-memory context store: lives for the lifetime of the process.

use async_trait::async_trait;
use persona_core::context::{ContextEntry, ContextStore, render_block};
use persona_core::error::MemoryError;
use std::cmp::Reverse;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Entries in insertion order plus a key index for upserts.
#[derive(Default)]
struct Entries {
    ordered: Vec<ContextEntry>,
    by_key: HashMap<String, usize>,
}

impl Entries {
    fn upsert(&mut self, key: &str, text: &str) {
        match self.by_key.get(key) {
            // Overwrites keep the first insertion position.
            Some(&idx) => self.ordered[idx].text = text.to_string(),
            None => {
                self.by_key.insert(key.to_string(), self.ordered.len());
                self.ordered.push(ContextEntry::new(key, text));
            }
        }
    }

    fn rank(&self, query: &str, limit: usize) -> Vec<ContextEntry> {
        let mut scored: Vec<(usize, &ContextEntry)> = self
            .ordered
            .iter()
            .map(|e| (overlap_score(&e.key, query), e))
            .collect();

        // sort_by_key is stable: equal scores stay in insertion order.
        scored.sort_by_key(|(score, _)| Reverse(*score));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, e)| e.clone())
            .collect()
    }
}

/// Count the query tokens contained (as substrings) in the key.
///
/// Both sides are lowercased; tokens are split on whitespace. A blank key
/// or blank query scores zero.
pub fn overlap_score(key: &str, query: &str) -> usize {
    if key.trim().is_empty() || query.trim().is_empty() {
        return 0;
    }

    let key = key.to_lowercase();
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|token| key.contains(token))
        .count()
}

/// A context store that keeps entries in memory behind a `RwLock`.
///
/// A single upsert takes the write lock once, so it is indivisible; a search
/// ranks and formats under one read guard, so it sees a consistent snapshot.
pub struct InMemoryContextStore {
    entries: RwLock<Entries>,
}

impl InMemoryContextStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
        }
    }
}

impl Default for InMemoryContextStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContextStore for InMemoryContextStore {
    fn name(&self) -> &str { "in_memory" }

    async fn upsert(&self, key: &str, text: &str) -> Result<(), MemoryError> {
        self.entries.write().await.upsert(key, text);
        debug!(key, "Upserted context entry");
        Ok(())
    }

    async fn rank(&self, query: &str, limit: usize) -> Result<Vec<ContextEntry>, MemoryError> {
        Ok(self.entries.read().await.rank(query, limit))
    }

    async fn get(&self, key: &str) -> Result<Option<ContextEntry>, MemoryError> {
        let entries = self.entries.read().await;
        Ok(entries.by_key.get(key).map(|&idx| entries.ordered[idx].clone()))
    }

    async fn len(&self) -> Result<usize, MemoryError> {
        Ok(self.entries.read().await.ordered.len())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<String, MemoryError> {
        let entries = self.entries.read().await;
        let selected = entries.rank(query, limit);
        Ok(render_block(&selected, entries.ordered.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::context::{NO_CONTEXT_AVAILABLE, NO_RELEVANT_CONTEXT};
    use std::sync::Arc;

    async fn seeded(pairs: &[(&str, &str)]) -> InMemoryContextStore {
        let store = InMemoryContextStore::new();
        for (key, text) in pairs {
            store.upsert(key, text).await.unwrap();
        }
        store
    }

    #[test]
    fn overlap_is_substring_containment() {
        assert_eq!(overlap_score("greeting", "greet"), 1);
        assert_eq!(overlap_score("Greeting Card", "GREETING card"), 2);
        assert_eq!(overlap_score("greeting", "hello"), 0);
        assert_eq!(overlap_score("", "hello"), 0);
        assert_eq!(overlap_score("greeting", "   "), 0);
        // Repeated whitespace does not produce empty tokens.
        assert_eq!(overlap_score("ab", "a  b"), 2);
    }

    #[tokio::test]
    async fn empty_store_returns_sentinel() {
        let store = InMemoryContextStore::new();
        assert_eq!(store.search("anything", 5).await.unwrap(), NO_CONTEXT_AVAILABLE);
        assert_eq!(store.search("", 0).await.unwrap(), NO_CONTEXT_AVAILABLE);
    }

    #[tokio::test]
    async fn zero_limit_returns_no_relevant_context() {
        let store = seeded(&[("greeting", "Hello, visitor")]).await;
        assert_eq!(store.search("greeting", 0).await.unwrap(), NO_RELEVANT_CONTEXT);
    }

    #[tokio::test]
    async fn search_formats_bullets() {
        let store = seeded(&[("greeting", "Hello, visitor")]).await;
        assert_eq!(store.search("hello", 5).await.unwrap(), "- Hello, visitor");
    }

    #[tokio::test]
    async fn ranks_by_score_then_insertion_order() {
        let store = seeded(&[
            ("weather today", "Sunny"),
            ("rust ownership", "Borrowing rules"),
            ("rust cargo", "Build tool"),
            ("rust async tokio", "Runtime"),
        ])
        .await;

        let ranked = store.rank("rust tokio", 10).await.unwrap();
        let keys: Vec<&str> = ranked.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["rust async tokio", "rust ownership", "rust cargo", "weather today"]
        );

        let scores: Vec<usize> = ranked.iter().map(|e| overlap_score(&e.key, "rust tokio")).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn respects_limit_and_keeps_zero_score_entries() {
        let store = seeded(&[("alpha", "A"), ("beta", "B"), ("gamma", "C")]).await;

        let ranked = store.rank("nothing matches", 2).await.unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].key, "alpha");
        assert_eq!(ranked[1].key, "beta");

        assert_eq!(store.search("nothing matches", 2).await.unwrap(), "- A\n- B");
    }

    #[tokio::test]
    async fn upsert_same_key_keeps_latest_only() {
        let store = seeded(&[("greeting", "Hello"), ("other", "x")]).await;
        store.upsert("greeting", "Hello again").await.unwrap();

        assert_eq!(store.len().await.unwrap(), 2);
        assert_eq!(
            store.get("greeting").await.unwrap(),
            Some(ContextEntry::new("greeting", "Hello again"))
        );

        // Still first: the overwrite kept its insertion slot.
        let ranked = store.rank("zzz", 2).await.unwrap();
        assert_eq!(ranked[0].text, "Hello again");
        assert_eq!(ranked[1].key, "other");
    }

    #[tokio::test]
    async fn concurrent_upserts_and_searches() {
        let store = Arc::new(InMemoryContextStore::new());
        let mut handles = Vec::new();

        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.upsert(&format!("key {}", i % 8), &format!("text {i}")).await.unwrap();
                store.search("key", 5).await.unwrap()
            }));
        }
        for handle in handles {
            let block = handle.await.unwrap();
            assert!(block.lines().all(|line| line.starts_with("- text ")));
        }

        assert_eq!(store.len().await.unwrap(), 8);
    }
}
