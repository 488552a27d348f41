//! Process-wide TTL key-value cache (spec §4.3).
//!
//! A single [`InMemoryCache`] instance is shared by the Web Fetcher (memoizing
//! HTTP responses) and the Command Executor (memoizing `dotnet --list-sdks`
//! style results). Values are stored as [`serde_json::Value`] so unrelated
//! callers can share one map without a common value type; `get_as`/`put_as`
//! are thin (de)serializing wrappers for convenience.

mod key;
mod metrics;

pub use key::{command_key, minimise_env};
pub use metrics::CacheMetrics;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};
use tracing::debug;

struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

/// A process-wide TTL cache. `ttl_ms == 0` means "do not cache" (spec §4.3).
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    metrics: CacheMetrics,
    /// Scales every TTL passed to `put`; a user-facing knob (spec §4.3
    /// `timeToLiveMultiplier`).
    ttl_multiplier: f64,
    /// `alias root -> real root`, used when a symlinked `dotnet` resolves to
    /// a canonical binary so lookups under the alias hit entries stored
    /// under the real root (spec §4.3 "Alias").
    command_aliases: Mutex<HashMap<String, String>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            metrics: CacheMetrics::default(),
            ttl_multiplier: 1.0,
            command_aliases: Mutex::new(HashMap::new()),
        }
    }

    /// Make `get_command`/`put_command` calls whose root is `alias_root`
    /// behave as if they used `real_root` instead.
    pub fn alias_command_as_another_command_root(&self, alias_root: impl Into<String>, real_root: impl Into<String>) {
        self.command_aliases
            .lock()
            .unwrap()
            .insert(alias_root.into(), real_root.into());
    }

    fn resolve_command_root<'a>(&self, root: &'a str) -> String {
        self.command_aliases
            .lock()
            .unwrap()
            .get(root)
            .cloned()
            .unwrap_or_else(|| root.to_string())
    }

    /// Construct an isolated instance for tests, avoiding pollution of the
    /// process-wide singleton (Design Notes §9).
    pub fn new_for_test() -> Self {
        Self::new()
    }

    /// The shared, process-wide instance.
    pub fn global() -> &'static InMemoryCache {
        static INSTANCE: OnceLock<InMemoryCache> = OnceLock::new();
        INSTANCE.get_or_init(InMemoryCache::new)
    }

    pub fn with_ttl_multiplier(mut self, multiplier: f64) -> Self {
        self.ttl_multiplier = multiplier;
        self
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    fn scaled_ttl(&self, ttl_ms: u64) -> Option<Duration> {
        if ttl_ms == 0 {
            return None;
        }
        let scaled = (ttl_ms as f64 * self.ttl_multiplier).max(0.0) as u64;
        Some(Duration::from_millis(scaled))
    }

    /// Store a raw JSON value under `key`. `ttl_ms == 0` skips caching.
    pub fn put(&self, key: impl Into<String>, value: Value, ttl_ms: u64) {
        let key = key.into();
        let Some(ttl) = self.scaled_ttl(ttl_ms) else {
            debug!(cache.key = %key, "skipping cache put: ttl_ms == 0");
            return;
        };
        let expires_at = Instant::now() + ttl;
        debug!(cache.key = %key, ttl_ms, "cache put");
        self.metrics.record_put();
        self.entries.lock().unwrap().insert(
            key,
            Entry {
                value,
                expires_at: Some(expires_at),
            },
        );
    }

    /// Store a value that never expires on its own (still removable via
    /// `invalidate`).
    pub fn put_forever(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        self.metrics.record_put();
        self.entries.lock().unwrap().insert(
            key,
            Entry {
                value,
                expires_at: None,
            },
        );
    }

    /// Fetch a raw JSON value, evicting it first if it has expired.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) => {
                if let Some(expires_at) = entry.expires_at {
                    if Instant::now() >= expires_at {
                        entries.remove(key);
                        self.metrics.record_miss();
                        debug!(cache.key = %key, "cache entry expired");
                        return None;
                    }
                }
                self.metrics.record_hit();
                Some(entry.value.clone())
            }
            None => {
                self.metrics.record_miss();
                None
            }
        }
    }

    /// Typed convenience wrapper over [`Self::put`].
    pub fn put_typed<T: Serialize>(&self, key: impl Into<String>, value: &T, ttl_ms: u64) {
        if let Ok(json) = serde_json::to_value(value) {
            self.put(key, json, ttl_ms);
        }
    }

    /// Typed convenience wrapper over [`Self::get`].
    pub fn get_typed<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| serde_json::from_value(v).ok())
    }

    /// Command-flavoured put: key is `command_key(root, args, options)`.
    pub fn put_command(&self, root: &str, args: &[String], options: &Value, value: Value, ttl_ms: u64) {
        let root = self.resolve_command_root(root);
        let key = command_key(&root, args, &minimise_env(options.clone()));
        self.put(key, value, ttl_ms);
    }

    /// Command-flavoured get, mirroring [`Self::put_command`]'s key.
    pub fn get_command(&self, root: &str, args: &[String], options: &Value) -> Option<Value> {
        let root = self.resolve_command_root(root);
        let key = command_key(&root, args, &minimise_env(options.clone()));
        self.get(&key)
    }

    /// Drop every entry.
    pub fn invalidate(&self) {
        self.metrics.record_clear();
        debug!("cache cleared");
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;

    #[test]
    fn ttl_zero_never_caches() {
        let cache = InMemoryCache::new_for_test();
        cache.put("k", json!("v"), 0);
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn entry_expires_after_ttl() {
        let cache = InMemoryCache::new_for_test();
        cache.put("k", json!("v"), 20);
        assert_eq!(cache.get("k"), Some(json!("v")));
        sleep(Duration::from_millis(60));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn invalidate_clears_everything() {
        let cache = InMemoryCache::new_for_test();
        cache.put("a", json!(1), 10_000);
        cache.put("b", json!(2), 10_000);
        cache.invalidate();
        assert!(cache.is_empty());
    }

    #[test]
    fn ttl_multiplier_scales_duration() {
        let cache = InMemoryCache::new_for_test().with_ttl_multiplier(10.0);
        cache.put("k", json!("v"), 10);
        sleep(Duration::from_millis(50));
        // scaled ttl is 100ms, so it should still be present at 50ms
        assert_eq!(cache.get("k"), Some(json!("v")));
    }

    #[test]
    fn command_memoization_roundtrips() {
        let cache = InMemoryCache::new_for_test();
        let options = json!({"env": {"HOME": "/root"}, "ttlMs": 1000});
        cache.put_command("dotnet", &["--list-sdks".into()], &options, json!(["7.0.100"]), 5_000);
        let hit = cache.get_command("dotnet", &["--list-sdks".into()], &options);
        assert_eq!(hit, Some(json!(["7.0.100"])));
    }

    #[test]
    fn alias_redirects_command_root() {
        let cache = InMemoryCache::new_for_test();
        let options = json!({});
        cache.put_command("/usr/share/dotnet/dotnet", &["--list-sdks".into()], &options, json!(["7.0.100"]), 5_000);
        cache.alias_command_as_another_command_root("/usr/local/bin/dotnet", "/usr/share/dotnet/dotnet");
        let hit = cache.get_command("/usr/local/bin/dotnet", &["--list-sdks".into()], &options);
        assert_eq!(hit, Some(json!(["7.0.100"])));
    }

    #[test]
    fn metrics_track_hits_and_misses() {
        let cache = InMemoryCache::new_for_test();
        cache.put("k", json!(1), 10_000);
        let _ = cache.get("k");
        let _ = cache.get("missing");
        assert_eq!(cache.metrics().hits(), 1);
        assert_eq!(cache.metrics().misses(), 1);
        assert_eq!(cache.metrics().puts(), 1);
    }
}
