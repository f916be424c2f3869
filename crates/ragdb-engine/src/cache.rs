//! Bounded query-result cache keyed by `(namespace, raw query text, k)`.
//!
//! Eviction is by insertion order (FIFO), not access recency: O(1),
//! deterministic, and good enough for the repeated-question workload this
//! fronts. Keys are on the raw query text, so differently phrased but
//! equivalent queries are cache-distinct. Entries are never updated in
//! place; after eviction an identical query is a fresh miss.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use ragdb_core::types::{CacheStats, QueryResult};

pub struct QueryCache {
    inner: Mutex<CacheInner>,
    max_size: usize,
    enabled: AtomicBool,
}

struct CacheInner {
    entries: HashMap<String, Vec<QueryResult>>,
    order: VecDeque<String>,
}

impl QueryCache {
    pub fn new(max_size: usize, enabled: bool) -> Self {
        Self {
            inner: Mutex::new(CacheInner { entries: HashMap::new(), order: VecDeque::new() }),
            max_size,
            enabled: AtomicBool::new(enabled),
        }
    }

    fn key(namespace: &str, query_text: &str, k: usize) -> String {
        let material = format!("{}\u{1f}{}\u{1f}{}", namespace, query_text, k);
        blake3::hash(material.as_bytes()).to_hex().to_string()
    }

    pub fn get(&self, namespace: &str, query_text: &str, k: usize) -> Option<Vec<QueryResult>> {
        if !self.enabled() {
            return None;
        }
        let inner = self.lock();
        inner.entries.get(&Self::key(namespace, query_text, k)).cloned()
    }

    pub fn put(&self, namespace: &str, query_text: &str, k: usize, results: Vec<QueryResult>) {
        if !self.enabled() || self.max_size == 0 {
            return;
        }
        let key = Self::key(namespace, query_text, k);
        let mut inner = self.lock();
        if inner.entries.contains_key(&key) {
            return;
        }
        if inner.entries.len() >= self.max_size {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
            }
        }
        inner.order.push_back(key.clone());
        inner.entries.insert(key, results);
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            size: inner.entries.len(),
            max_size: self.max_size,
            enabled: self.enabled(),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
