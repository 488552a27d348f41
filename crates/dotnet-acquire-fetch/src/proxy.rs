use crate::events::FetchEvents;
use reqwest::Proxy;

/// Resolve a proxy for this call: an explicit `proxy_url` wins; otherwise
/// auto-discover from the system's HTTPS, then HTTP, proxy environment
/// variables. Any discovery error is suppressed and the call proceeds
/// without a proxy (spec §4.2).
pub fn resolve_proxy(explicit: Option<&str>, events: &dyn FetchEvents) -> Option<Proxy> {
    if let Some(url) = explicit {
        return match Proxy::all(url) {
            Ok(p) => Some(p),
            Err(e) => {
                events.suppressed_error("explicit proxy", &e.to_string());
                None
            }
        };
    }

    for var in ["HTTPS_PROXY", "https_proxy", "HTTP_PROXY", "http_proxy"] {
        if let Ok(url) = std::env::var(var) {
            if url.is_empty() {
                continue;
            }
            match Proxy::all(&url) {
                Ok(p) => return Some(p),
                Err(e) => {
                    events.suppressed_error(&format!("system proxy ({var})"), &e.to_string());
                    continue;
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TracingFetchEvents;

    #[test]
    fn explicit_proxy_wins() {
        let events = TracingFetchEvents;
        let proxy = resolve_proxy(Some("http://127.0.0.1:8080"), &events);
        assert!(proxy.is_some());
    }

    #[test]
    fn invalid_explicit_proxy_is_suppressed_to_none() {
        let events = TracingFetchEvents;
        let proxy = resolve_proxy(Some("not a url"), &events);
        assert!(proxy.is_none());
    }
}
