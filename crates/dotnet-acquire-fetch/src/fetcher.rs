use crate::context::{FetchContext, FetchOptions};
use crate::error::{FetchError, Result};
use crate::events::{FetchEvents, TracingFetchEvents};
use crate::proxy::resolve_proxy;
use backon::{ExponentialBuilder, Retryable};
use dotnet_acquire_cache::InMemoryCache;
use futures_util::StreamExt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("dotnet-acquire/", env!("CARGO_PKG_VERSION"));
const MAX_ATTEMPTS: usize = 4;
const ONLINE_PROBE_HOST: &str = "www.microsoft.com:443";

/// Process-wide singleton for GET and streaming download (spec §4.2).
pub struct WebFetcher {
    primary: std::result::Result<reqwest::Client, String>,
    alt_notified: AtomicBool,
    cache: &'static InMemoryCache,
    events: Arc<dyn FetchEvents>,
}

impl WebFetcher {
    pub fn new() -> Self {
        Self::with_events(Arc::new(TracingFetchEvents))
    }

    pub fn with_events(events: Arc<dyn FetchEvents>) -> Self {
        let primary = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| e.to_string());
        Self {
            primary,
            alt_notified: AtomicBool::new(false),
            cache: InMemoryCache::global(),
            events,
        }
    }

    /// Construct an isolated instance for tests (Design Notes §9).
    pub fn new_for_test() -> Self {
        Self::with_events(Arc::new(TracingFetchEvents))
    }

    pub fn global() -> &'static WebFetcher {
        static INSTANCE: std::sync::OnceLock<WebFetcher> = std::sync::OnceLock::new();
        INSTANCE.get_or_init(WebFetcher::new)
    }

    fn base_client(&self) -> reqwest::Client {
        match &self.primary {
            Ok(client) => client.clone(),
            Err(reason) => {
                if !self.alt_notified.swap(true, Ordering::SeqCst) {
                    self.events.using_alt_client(reason);
                }
                // Fallback client: a minimal builder, on the assumption
                // whatever option tripped up the primary build (e.g. a
                // custom TLS backend) isn't requested here.
                reqwest::Client::builder()
                    .user_agent(USER_AGENT)
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new())
            }
        }
    }

    fn client_for_call(&self, ctx: &FetchContext) -> reqwest::Client {
        let proxy = resolve_proxy(ctx.proxy_url.as_deref(), self.events.as_ref());
        match proxy {
            Some(p) => reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .proxy(p)
                .build()
                .unwrap_or_else(|_| self.base_client()),
            None => self.base_client(),
        }
    }

    /// GET `url`, retrying with exponential backoff up to [`MAX_ATTEMPTS`].
    pub async fn get(&self, url: &str, ctx: &FetchContext) -> Result<String> {
        let client = self.client_for_call(ctx);
        let timeout = ctx.timeout();

        let attempt = || async {
            self.single_attempt(&client, url, timeout).await
        };

        attempt
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(1))
                    .with_max_times(MAX_ATTEMPTS),
            )
            .await
    }

    async fn single_attempt(&self, client: &reqwest::Client, url: &str, timeout: Duration) -> Result<String> {
        let request = client.get(url).send();
        let response = match tokio::time::timeout(timeout, request).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(source)) => {
                return Err(FetchError::WebRequestFailed {
                    url: url.to_string(),
                    source,
                })
            }
            Err(_) => {
                let offline = !self.is_online(1).await;
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                    offline,
                });
            }
        };

        response
            .error_for_status()
            .map_err(|source| FetchError::WebRequestFailed {
                url: url.to_string(),
                source,
            })?
            .text()
            .await
            .map_err(|source| FetchError::WebRequestFailed {
                url: url.to_string(),
                source,
            })
    }

    /// Same as [`Self::get`], memoized by (url, normalised options) for
    /// `ttl_ms` (spec §4.2).
    pub async fn get_cached(&self, url: &str, ctx: &FetchContext, options: &FetchOptions, ttl_ms: u64) -> Result<String> {
        let key = format!("{url}{}", options.cache_key_json());
        if let Some(cached) = self.cache.get_typed::<String>(&key) {
            debug!(url, "serving cached response");
            return Ok(cached);
        }
        let body = self.get(url, ctx).await?;
        self.cache.put_typed(key, &body, ttl_ms);
        Ok(body)
    }

    /// Stream `url`'s body to `dest`, which must not already exist.
    pub async fn download(&self, url: &str, dest: &Path, ctx: &FetchContext) -> Result<()> {
        let client = self.client_for_call(ctx);
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::WebRequestFailed {
                url: url.to_string(),
                source,
            })?
            .error_for_status()
            .map_err(|source| FetchError::WebRequestFailed {
                url: url.to_string(),
                source,
            })?;

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dest)
            .await
            .map_err(|e| map_io_error(url, e))?;

        let mut stream = response.bytes_stream();
        use tokio::io::AsyncWriteExt;
        while let Some(chunk) = stream.next().await {
            if let Some(token) = &ctx.cancellation {
                if token.is_cancelled() {
                    let _ = tokio::fs::remove_file(dest).await;
                    return Err(FetchError::Cancelled);
                }
            }
            let chunk = chunk.map_err(|source| FetchError::WebRequestFailed {
                url: url.to_string(),
                source,
            })?;
            if let Err(e) = file.write_all(&chunk).await {
                let _ = tokio::fs::remove_file(dest).await;
                return Err(map_io_error(url, e));
            }
        }
        Ok(())
    }

    /// Resolve `www.microsoft.com` to determine whether the host appears
    /// online, capping the probe at `max(timeout_sec*10, 100)` ms. Posts
    /// `OfflineDetected` on any failure (spec §4.2 `isOnline`).
    pub async fn is_online(&self, timeout_sec: u64) -> bool {
        let cap_ms = (timeout_sec.saturating_mul(10)).max(100);
        let probe = tokio::net::lookup_host(ONLINE_PROBE_HOST);
        match tokio::time::timeout(Duration::from_millis(cap_ms), probe).await {
            Ok(Ok(mut addrs)) if addrs.next().is_some() => true,
            _ => {
                warn!("online probe failed");
                self.events.offline_detected();
                false
            }
        }
    }
}

fn map_io_error(url: &str, e: std::io::Error) -> FetchError {
    if e.raw_os_error() == Some(28) {
        // ENOSPC on Unix; Windows' equivalent (ERROR_DISK_FULL = 112) is
        // mapped the same way.
        FetchError::DiskFull { url: url.to_string() }
    } else if e.raw_os_error() == Some(112) {
        FetchError::DiskFull { url: url.to_string() }
    } else {
        FetchError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

impl Default for WebFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_excludes_ttl_and_minimises_env() {
        let mut options = FetchOptions::default();
        options.env.insert("HOME".into(), "/root".into());
        options.ttl_ms = Some(5_000);
        let key = options.cache_key_json();
        assert!(key.get("env").is_some());
        assert!(options.cache_key_json().to_string().contains("HOME"));
        assert!(!key.to_string().contains("5000"));
    }
}
