//! In-memory store for generated PDFs with automatic expiry (10 minutes).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

const TTL: Duration = Duration::from_secs(600);

#[derive(Clone, Default)]
pub struct TempStore {
    entries: Arc<Mutex<HashMap<String, Bytes>>>,
}

impl TempStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the bytes under a fresh token and schedules its expiry.
    pub fn store(&self, pdf_bytes: Vec<u8>) -> String {
        let token = Uuid::new_v4().simple().to_string();
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(token.clone(), Bytes::from(pdf_bytes));
        }
        let entries = Arc::clone(&self.entries);
        let expiring = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(TTL).await;
            if let Ok(mut entries) = entries.lock() {
                entries.remove(&expiring);
            }
            debug!(token = %expiring, "PDF export token expired");
        });
        token
    }

    /// Cheap clone; the payload itself is refcounted.
    pub fn retrieve(&self, token: &str) -> Option<Bytes> {
        self.entries.lock().ok().and_then(|entries| entries.get(token).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_retrieve() {
        let store = TempStore::new();
        let token = store.store(vec![1, 2, 3]);
        assert_eq!(token.len(), 32);
        assert_eq!(store.retrieve(&token), Some(Bytes::from_static(&[1, 2, 3])));
        assert_eq!(store.retrieve("missing"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let store = TempStore::new();
        let token = store.store(vec![42]);
        tokio::time::sleep(Duration::from_secs(599)).await;
        assert!(store.retrieve(&token).is_some());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(store.retrieve(&token).is_none());
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let store = TempStore::new();
        let a = store.store(vec![]);
        let b = store.store(vec![]);
        assert_ne!(a, b);
    }
}
