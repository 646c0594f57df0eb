//! Dependency-free Rasterizer used when the `pdf` feature is off, or as a
//! deterministic test double. Mirrors
//! `riptide-core::pdf::processor::DefaultPdfProcessor`: always available,
//! produces plausible-shaped output, never touches the native engine.
//!
//! Page geometry and content are synthetic — a flat-colored RGBA buffer
//! whose dimensions follow the same target-width/max-scale formula the
//! production Rasterizer uses, so callers exercising the Dispatcher and
//! WorkerPool against this double still see scale/size behavior matching
//! the real engine.

use crate::page::{EncodedImage, RenderedPage};
use crate::rasterizer::Rasterizer;
use pdf2img_types::error::ConvertOutcome;
use pdf2img_types::{ConvertError, ImageFormat, PdfInput, RenderOptions};
use std::time::Instant;

/// Assumed native page size for inputs this double can't actually parse
/// (US Letter at 72 dpi point size, the same default pdfium reports for
/// a typical PDF page).
const NATIVE_WIDTH: f32 = 612.0;
const NATIVE_HEIGHT: f32 = 792.0;

#[derive(Clone, Default)]
pub struct FallbackRasterizer;

impl FallbackRasterizer {
    pub fn new() -> Self {
        Self
    }

    fn bytes_for(&self, input: &PdfInput) -> ConvertOutcome<Vec<u8>> {
        match input {
            PdfInput::BytesOwned(b) => Ok(b.as_ref().clone()),
            PdfInput::LocalPath(path) => std::fs::read(path)
                .map_err(|e| ConvertError::not_found(format!("{path}: {e}"))),
            PdfInput::Url(_) => Err(ConvertError::invalid_input(
                "FallbackRasterizer requires materialized bytes; URL inputs must be resolved by the RangeLoader first",
            )),
        }
    }
}

impl Rasterizer for FallbackRasterizer {
    fn render_page(
        &self,
        input: &PdfInput,
        page_num: usize,
        options: &RenderOptions,
    ) -> ConvertOutcome<RenderedPage> {
        let start = Instant::now();
        let bytes = self.bytes_for(input)?;
        if bytes.is_empty() {
            return Err(ConvertError::malformed("empty PDF buffer"));
        }
        if !bytes.starts_with(b"%PDF-") {
            return Err(ConvertError::malformed("missing %PDF- header"));
        }
        let total = self.page_count(input)?;
        if page_num == 0 || page_num > total {
            return Err(ConvertError::invalid_input(format!(
                "page {page_num} out of range (document has {total} pages)"
            )));
        }

        let scale = options.scale_for(NATIVE_WIDTH);
        let width = (NATIVE_WIDTH * scale).round().max(1.0) as u32;
        let height = (NATIVE_HEIGHT * scale).round().max(1.0) as u32;

        // Deterministic per-page fill so successive renders of the same
        // page are byte-identical (spec.md §8 round-trip property).
        let shade = (page_num % 256) as u8;
        let mut raw_rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            raw_rgba.extend_from_slice(&[shade, shade, shade, 255]);
        }

        Ok(RenderedPage {
            raw_rgba,
            width,
            height,
            native_width: NATIVE_WIDTH,
            native_height: NATIVE_HEIGHT,
            render_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn encode(&self, page: &RenderedPage, options: &RenderOptions) -> ConvertOutcome<EncodedImage> {
        let start = Instant::now();
        let bytes = match options.format {
            ImageFormat::Png => {
                crate::codec::encode_png(&page.raw_rgba, page.width, page.height, options.png_compression)
            }
            ImageFormat::Webp => {
                crate::codec::encode_webp(&page.raw_rgba, page.width, page.height, options.quality)
            }
            ImageFormat::Jpeg => {
                crate::codec::encode_jpeg(&page.raw_rgba, page.width, page.height, options.quality)
            }
        }
        .map_err(ConvertError::encode_failed)?;
        Ok(EncodedImage {
            bytes,
            encode_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn page_count(&self, input: &PdfInput) -> ConvertOutcome<usize> {
        let bytes = self.bytes_for(input)?;
        if bytes.is_empty() {
            return Err(ConvertError::malformed("empty PDF buffer"));
        }
        if !bytes.starts_with(b"%PDF-") {
            return Err(ConvertError::malformed("missing %PDF- header"));
        }
        // Crude page-count heuristic good enough for a test double: count
        // `/Type /Page` object markers, minimum 1.
        let count = bytes
            .windows(b"/Type/Page".len())
            .filter(|w| *w == b"/Type/Page")
            .count()
            .max(1);
        Ok(count)
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pdf(pages: usize) -> PdfInput {
        let mut body = String::from("%PDF-1.4\n");
        for _ in 0..pages {
            body.push_str("/Type/Page\n");
        }
        PdfInput::BytesOwned(std::sync::Arc::new(body.into_bytes()))
    }

    #[test]
    fn page_count_reflects_markers() {
        let r = FallbackRasterizer::new();
        assert_eq!(r.page_count(&sample_pdf(3)).unwrap(), 3);
    }

    #[test]
    fn empty_buffer_is_malformed() {
        let r = FallbackRasterizer::new();
        let input = PdfInput::BytesOwned(std::sync::Arc::new(Vec::new()));
        let err = r.render_page(&input, 1, &RenderOptions::default()).unwrap_err();
        assert_eq!(err.kind, pdf2img_types::ErrorKind::Malformed);
    }

    #[test]
    fn scale_is_capped_by_max_scale() {
        let r = FallbackRasterizer::new();
        let input = sample_pdf(1);
        let mut opts = RenderOptions::default();
        opts.target_width = 10_000;
        opts.max_scale = 4.0;
        let page = r.render_page(&input, 1, &opts).unwrap();
        assert_eq!(page.width, (NATIVE_WIDTH * 4.0).round() as u32);
    }

    #[test]
    fn render_is_deterministic_for_same_page() {
        let r = FallbackRasterizer::new();
        let input = sample_pdf(2);
        let opts = RenderOptions::default();
        let a = r.render_page(&input, 1, &opts).unwrap();
        let b = r.render_page(&input, 1, &opts).unwrap();
        assert_eq!(a.raw_rgba, b.raw_rgba);
    }
}
