use moka::future::Cache;
use std::time::Duration;

pub const DEFAULT_TTL_SECS: u64 = 60 * 60 * 2; // 2 hours
const MAX_CACHE_ENTRIES: u64 = 10_000;

/// Upstream response bodies keyed by request identity (path + query, no credentials).
pub type ResponseCache = Cache<String, String>;

pub fn response_cache(ttl: Duration) -> ResponseCache {
    build(ttl, MAX_CACHE_ENTRIES)
}

fn build(ttl: Duration, capacity: u64) -> ResponseCache {
    Cache::builder()
        .max_capacity(capacity)
        .time_to_live(ttl)
        .build()
}
