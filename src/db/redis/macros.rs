/// A macro to simplify read-through caching using Redis.
///
/// Looks the key up in the cache and returns the hit. On a miss it awaits the
/// provided future, queues the value for a background write and returns it.
/// Lookup failures count as misses, so a Redis outage only costs latency.
///
/// # Arguments
/// * `$cache`: The cache instance to use. It must have `get_from_cache` and
///   `set_in_background` methods.
/// * `$key`: The key to use for caching the value.
/// * `$ttl`: The time-to-live (TTL) for the cached value in seconds.
/// * `$block`: The future computing the value on a miss.
///
/// # Example
/// ```rust,ignore
/// let location = cached!(self.cache, CacheKey::Geocode(address.to_string()), TTL, async move {
///     self.call_geocode_api(address).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => Ok(cached),
            lookup => {
                if let Err(e) = lookup {
                    tracing::warn!(error = %e, key = %key, "Cache lookup failed, treating as miss");
                }
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
