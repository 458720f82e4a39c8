//! Time-bounded result cache keyed by (symbol, interval)

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::AnalysisResult;

pub struct ResultCache {
    ttl: Duration,
    entries: Mutex<HashMap<(String, String), (Instant, AnalysisResult)>>,
}

impl ResultCache {
    /// `None` when `ttl` is zero (caching disabled)
    pub fn new(ttl: Duration) -> Option<Self> {
        if ttl.is_zero() {
            return None;
        }
        Some(Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        })
    }

    pub async fn get(&self, symbol: &str, interval: &str) -> Option<AnalysisResult> {
        let mut entries = self.entries.lock().await;
        let key = (symbol.to_string(), interval.to_string());

        let (stored_at, result) = entries.get(&key)?;
        if stored_at.elapsed() < self.ttl {
            return Some(result.clone());
        }
        entries.remove(&key);
        None
    }

    pub async fn insert(&self, symbol: &str, interval: &str, result: AnalysisResult) {
        let mut entries = self.entries.lock().await;
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < self.ttl);
        entries.insert(
            (symbol.to_string(), interval.to_string()),
            (Instant::now(), result),
        );
    }

    pub async fn entry_count(&self) -> usize {
        self.entries.lock().await.len()
    }
}
