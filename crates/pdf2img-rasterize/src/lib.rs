//! The Rasterizer contract (spec.md §4.3, §9): an abstract interface over
//! a native PDF engine plus an image codec, with a production
//! (`pdfium-render`-backed) implementation and a dependency-free test
//! double selectable at startup, so the dispatcher and worker pool never
//! have to know which one is wired in.

pub mod codec;
pub mod page;
pub mod rasterizer;

#[cfg(feature = "pdf")]
pub mod pdfium;

#[cfg(not(feature = "pdf"))]
pub mod fallback;

pub use page::{EncodedImage, RenderedPage};
pub use rasterizer::Rasterizer;

/// Enum-dispatch wrapper around the concrete Rasterizer, mirroring
/// `riptide-core::pdf::processor::AnyPdfProcessor`: sidesteps
/// object-safety friction from mixing trait objects with `Send + Sync`
/// bounds across feature-gated impls, while still giving callers one
/// concrete, clonable type to hold.
#[derive(Clone)]
pub enum AnyRasterizer {
    #[cfg(feature = "pdf")]
    Pdfium(pdfium::PdfiumRasterizer),
    #[cfg(not(feature = "pdf"))]
    Fallback(fallback::FallbackRasterizer),
}

impl Rasterizer for AnyRasterizer {
    fn render_page(
        &self,
        input: &pdf2img_types::PdfInput,
        page_num: usize,
        options: &pdf2img_types::RenderOptions,
    ) -> pdf2img_types::error::ConvertOutcome<RenderedPage> {
        match self {
            #[cfg(feature = "pdf")]
            AnyRasterizer::Pdfium(r) => r.render_page(input, page_num, options),
            #[cfg(not(feature = "pdf"))]
            AnyRasterizer::Fallback(r) => r.render_page(input, page_num, options),
        }
    }

    fn encode(
        &self,
        page: &RenderedPage,
        options: &pdf2img_types::RenderOptions,
    ) -> pdf2img_types::error::ConvertOutcome<EncodedImage> {
        match self {
            #[cfg(feature = "pdf")]
            AnyRasterizer::Pdfium(r) => r.encode(page, options),
            #[cfg(not(feature = "pdf"))]
            AnyRasterizer::Fallback(r) => r.encode(page, options),
        }
    }

    fn page_count(&self, input: &pdf2img_types::PdfInput) -> pdf2img_types::error::ConvertOutcome<usize> {
        match self {
            #[cfg(feature = "pdf")]
            AnyRasterizer::Pdfium(r) => r.page_count(input),
            #[cfg(not(feature = "pdf"))]
            AnyRasterizer::Fallback(r) => r.page_count(input),
        }
    }

    fn is_available(&self) -> bool {
        match self {
            #[cfg(feature = "pdf")]
            AnyRasterizer::Pdfium(r) => r.is_available(),
            #[cfg(not(feature = "pdf"))]
            AnyRasterizer::Fallback(r) => r.is_available(),
        }
    }
}

#[cfg(feature = "pdf")]
pub fn create_rasterizer() -> AnyRasterizer {
    AnyRasterizer::Pdfium(pdfium::PdfiumRasterizer::new())
}

#[cfg(not(feature = "pdf"))]
pub fn create_rasterizer() -> AnyRasterizer {
    AnyRasterizer::Fallback(fallback::FallbackRasterizer::new())
}
