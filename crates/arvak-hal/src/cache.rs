//! Per-handle result cache.
//!
//! Entries are registered when a job is submitted and filled exactly once,
//! on the first observation of a completed status. Entries are never
//! evicted: a handle stays resolvable for the life of the cache.
//!
//! The cache is cheap to clone; clones share one store, so several backend
//! instances (or tasks) can resolve the same handles.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::HalResult;
use crate::job::JobHandle;
use crate::result::ExecutionResult;

/// A cache slot for one job handle.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// When the handle was first seen by the cache.
    pub registered_at: DateTime<Utc>,
    /// When the result was stored.
    pub completed_at: Option<DateTime<Utc>>,
    /// Decoded result, once available.
    pub result: Option<ExecutionResult>,
}

impl CacheEntry {
    fn pending() -> Self {
        Self {
            registered_at: Utc::now(),
            completed_at: None,
            result: None,
        }
    }

    fn store(&mut self, result: ExecutionResult) {
        self.completed_at = Some(Utc::now());
        self.result = Some(result);
    }
}

/// Shared map from job handle to decoded result.
#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    entries: Arc<Mutex<FxHashMap<JobHandle, CacheEntry>>>,
}

impl ResultCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty slot for `handle` if none exists.
    pub async fn register(&self, handle: &JobHandle) {
        let mut entries = self.entries.lock().await;
        entries
            .entry(handle.clone())
            .or_insert_with(CacheEntry::pending);
    }

    /// Register `handle` with a result that is already known.
    ///
    /// An existing populated entry is left untouched.
    pub async fn register_completed(&self, handle: &JobHandle, result: ExecutionResult) {
        let mut entries = self.entries.lock().await;
        let entry = entries
            .entry(handle.clone())
            .or_insert_with(CacheEntry::pending);
        if entry.result.is_none() {
            entry.store(result);
        }
    }

    /// The stored result for `handle`, if it has been populated.
    pub async fn get(&self, handle: &JobHandle) -> Option<ExecutionResult> {
        let entries = self.entries.lock().await;
        entries.get(handle).and_then(|e| e.result.clone())
    }

    /// Whether `handle` has a populated result.
    pub async fn is_populated(&self, handle: &JobHandle) -> bool {
        let entries = self.entries.lock().await;
        entries.get(handle).is_some_and(|e| e.result.is_some())
    }

    /// Snapshot of the slot for `handle`.
    pub async fn entry(&self, handle: &JobHandle) -> Option<CacheEntry> {
        let entries = self.entries.lock().await;
        entries.get(handle).cloned()
    }

    /// Return the stored result, or run `decode` and store its output.
    ///
    /// The check and the store happen under one lock, so `decode` runs at
    /// most once per handle even when several callers race. A failing
    /// `decode` stores nothing.
    pub async fn populate_with<F>(&self, handle: &JobHandle, decode: F) -> HalResult<ExecutionResult>
    where
        F: FnOnce() -> HalResult<ExecutionResult>,
    {
        let mut entries = self.entries.lock().await;
        let entry = entries
            .entry(handle.clone())
            .or_insert_with(CacheEntry::pending);
        if let Some(ref result) = entry.result {
            return Ok(result.clone());
        }

        let result = decode()?;
        debug!("Cached result for job {}", handle);
        entry.store(result.clone());
        Ok(result)
    }

    /// Number of registered handles.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether no handle has been registered.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HalError;
    use crate::outcome::Outcome;
    use crate::result::Counts;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn handle(id: &str) -> JobHandle {
        JobHandle::new(id, 4, vec![0], None)
    }

    fn result(shots: u32) -> ExecutionResult {
        ExecutionResult::new(
            Counts::from_pairs([(Outcome::zeros(1), u64::from(shots))]),
            shots,
        )
    }

    #[tokio::test]
    async fn test_register_creates_empty_slot() {
        let cache = ResultCache::new();
        cache.register(&handle("a")).await;
        assert_eq!(cache.len().await, 1);
        assert!(!cache.is_populated(&handle("a")).await);
        assert!(cache.get(&handle("a")).await.is_none());
        assert!(cache.entry(&handle("a")).await.unwrap().completed_at.is_none());
    }

    #[tokio::test]
    async fn test_populate_runs_decode_once() {
        let cache = ResultCache::new();
        let calls = AtomicUsize::new(0);
        let h = handle("a");

        for _ in 0..3 {
            let r = cache
                .populate_with(&h, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(result(4))
                })
                .await
                .unwrap();
            assert_eq!(r.shots, 4);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.entry(&h).await.unwrap().completed_at.is_some());
    }

    #[tokio::test]
    async fn test_failed_decode_stores_nothing() {
        let cache = ResultCache::new();
        let h = handle("a");
        let err = cache
            .populate_with(&h, || Err(HalError::Decode("bad".into())))
            .await;
        assert!(matches!(err, Err(HalError::Decode(_))));
        assert!(!cache.is_populated(&h).await);

        cache.populate_with(&h, || Ok(result(4))).await.unwrap();
        assert!(cache.is_populated(&h).await);
    }

    #[tokio::test]
    async fn test_register_completed_does_not_overwrite() {
        let cache = ResultCache::new();
        let h = handle("a");
        cache.register_completed(&h, result(4)).await;
        cache.register_completed(&h, result(9)).await;
        assert_eq!(cache.get(&h).await.unwrap().shots, 4);
    }

    #[tokio::test]
    async fn test_clones_share_store() {
        let cache = ResultCache::new();
        let other = cache.clone();
        cache.register_completed(&handle("a"), result(4)).await;
        assert!(other.is_populated(&handle("a")).await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_populate_decodes_once() {
        let cache = ResultCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let h = handle("race");

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            let calls = calls.clone();
            let h = h.clone();
            tasks.push(tokio::spawn(async move {
                cache
                    .populate_with(&h, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(result(4))
                    })
                    .await
            }));
        }
        for t in tasks {
            assert!(t.await.unwrap().is_ok());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
