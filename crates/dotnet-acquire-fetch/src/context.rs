use std::collections::HashMap;
use std::time::Duration;

/// Per-call context: timeout, optional explicit proxy, optional
/// cancellation signal (spec §4.2, §5).
#[derive(Debug, Clone, Default)]
pub struct FetchContext {
    pub timeout_sec: u64,
    pub proxy_url: Option<String>,
    pub cancellation: Option<tokio_util::sync::CancellationToken>,
}

impl FetchContext {
    pub fn with_timeout_sec(mut self, timeout_sec: u64) -> Self {
        self.timeout_sec = timeout_sec;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_sec.max(1) * 1000)
    }
}

/// Per-call options layered on top of [`FetchContext`] for `get`/`get_cached`.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub env: HashMap<String, String>,
    /// A per-call TTL override; stripped from the cache key (spec §4.2).
    pub ttl_ms: Option<u64>,
}

impl FetchOptions {
    /// Build the cache-key JSON view: env minimised to its key set, `ttl_ms`
    /// excluded entirely.
    pub fn cache_key_json(&self) -> serde_json::Value {
        let env_keys: Vec<&String> = self.env.keys().collect();
        serde_json::json!({ "env": env_keys })
    }
}
