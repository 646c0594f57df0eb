use crate::options::ImageFormat;
use crate::page::PageResult;

#[derive(Debug, Clone, Default)]
pub struct StreamStats {
    pub request_count: u64,
    pub total_bytes: u64,
    pub avg_request_ms: f64,
}

/// Aggregate outcome of a convert request (spec.md §3). `pages` is
/// always strictly sorted ascending by `page_num` with no duplicates.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    pub num_pages_total: usize,
    pub num_rendered: usize,
    pub format: ImageFormat,
    pub pages: Vec<PageResult>,
    pub total_ms: u64,
    pub render_ms: u64,
    pub encode_ms: u64,
    pub stream_stats: Option<StreamStats>,
    pub worker_count: usize,
}

impl ConvertResult {
    /// Checked per spec.md §8 invariant 3: ascending, no duplicates.
    pub fn pages_are_sorted_and_unique(&self) -> bool {
        self.pages
            .windows(2)
            .all(|w| w[0].page_num < w[1].page_num)
    }
}
