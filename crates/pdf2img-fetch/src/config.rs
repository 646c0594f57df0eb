use std::time::Duration;

/// Tunables for [`crate::RangeLoader`] (spec.md §4.4).
#[derive(Debug, Clone)]
pub struct RangeLoaderConfig {
    /// Coalesced logical chunk size used when a caller doesn't specify a
    /// narrower range.
    pub chunk_size: usize,
    /// A requested range is split into sub-requests of at most this size
    /// and issued in parallel to reduce tail latency.
    pub small_chunk_size: usize,
    /// Speculative leading range fetched eagerly to overlap with
    /// connection setup.
    pub initial_prefetch: usize,
    /// Per-sub-request timeout.
    pub request_timeout: Duration,
    /// Ceiling on the whole `fetch_range` call, across all retries.
    pub overall_timeout: Duration,
}

impl Default for RangeLoaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1024 * 1024,
            small_chunk_size: 256 * 1024,
            initial_prefetch: 10 * 1024,
            request_timeout: Duration::from_secs(10),
            overall_timeout: Duration::from_secs(60),
        }
    }
}
