use crate::page::{EncodedImage, RenderedPage};
use pdf2img_types::error::ConvertOutcome;
use pdf2img_types::{PdfInput, RenderOptions};

/// Contract for the native PDF engine + image codec (spec.md §4.3). Every
/// method is synchronous and potentially CPU-heavy; callers are expected
/// to run them inside `tokio::task::spawn_blocking` rather than calling
/// them directly on an async executor thread.
pub trait Rasterizer: Send + Sync {
    /// Render one page to raw RGBA8888 pixels, scaled per the contract's
    /// `s = min(target_width / native_width, max_scale)` rule.
    fn render_page(
        &self,
        input: &PdfInput,
        page_num: usize,
        options: &RenderOptions,
    ) -> ConvertOutcome<RenderedPage>;

    /// Encode a previously rendered page into `options.format`.
    fn encode(&self, page: &RenderedPage, options: &RenderOptions) -> ConvertOutcome<EncodedImage>;

    /// Total page count of the document. Used by the dispatcher's `All`
    /// and `FirstN` plans once the first batch has run; also exposed
    /// directly for `getPageCount` parity checks (spec.md §8).
    fn page_count(&self, input: &PdfInput) -> ConvertOutcome<usize>;

    /// Whether the underlying engine initialized successfully. Once
    /// false, every subsequent task fails with `RendererUnavailable`
    /// (spec.md §4.3 step 1).
    fn is_available(&self) -> bool;
}
