use std::sync::atomic::{AtomicU64, Ordering};

/// Observability counters for a single [`crate::RangeLoader`] instance
/// (spec.md §4.4 `stats()`).
#[derive(Default)]
pub struct LoaderStats {
    request_count: AtomicU64,
    total_bytes: AtomicU64,
    total_request_ms: AtomicU64,
}

impl LoaderStats {
    pub fn record(&self, bytes: u64, elapsed_ms: u64) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.total_bytes.fetch_add(bytes, Ordering::Relaxed);
        self.total_request_ms.fetch_add(elapsed_ms, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RangeLoaderStats {
        let request_count = self.request_count.load(Ordering::Relaxed);
        let total_bytes = self.total_bytes.load(Ordering::Relaxed);
        let total_ms = self.total_request_ms.load(Ordering::Relaxed);
        let avg_request_ms = if request_count == 0 {
            0.0
        } else {
            total_ms as f64 / request_count as f64
        };
        RangeLoaderStats {
            request_count,
            total_bytes,
            avg_request_ms,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RangeLoaderStats {
    pub request_count: u64,
    pub total_bytes: u64,
    pub avg_request_ms: f64,
}
