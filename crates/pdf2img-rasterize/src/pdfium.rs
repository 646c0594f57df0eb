//! Production Rasterizer backed by `pdfium-render`. Lazily binds the
//! native pdfium library on first use and caches the binding for the
//! lifetime of the process, mirroring
//! `riptide-core::pdf::processor::PdfiumProcessor::initialize_pdfium`.

use crate::page::{EncodedImage, RenderedPage};
use crate::rasterizer::Rasterizer;
use pdf2img_types::error::ConvertOutcome;
use pdf2img_types::{ConvertError, ImageFormat, PdfInput, RenderOptions};
use pdfium_render::prelude::*;
use std::io::Read;
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::{error, warn};

fn shared_pdfium() -> ConvertOutcome<&'static Pdfium> {
    static PDFIUM: OnceLock<Option<Pdfium>> = OnceLock::new();
    let slot = PDFIUM.get_or_init(|| {
        Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map(Pdfium::new)
            .map_err(|e| {
                error!(error = %e, "failed to bind pdfium native library");
            })
            .ok()
    });
    slot.as_ref()
        .ok_or_else(|| ConvertError::renderer_unavailable("pdfium native library unavailable"))
}

#[derive(Clone)]
pub struct PdfiumRasterizer {
    available: Arc<std::sync::atomic::AtomicBool>,
}

impl PdfiumRasterizer {
    pub fn new() -> Self {
        Self {
            available: Arc::new(std::sync::atomic::AtomicBool::new(true)),
        }
    }

    fn load_bytes(&self, input: &PdfInput) -> ConvertOutcome<Vec<u8>> {
        match input {
            PdfInput::BytesOwned(bytes) => Ok(bytes.as_ref().clone()),
            PdfInput::LocalPath(path) => {
                let mut file = std::fs::File::open(path)
                    .map_err(|e| ConvertError::not_found(format!("{path}: {e}")))?;
                let mut buf = Vec::new();
                file.read_to_end(&mut buf)
                    .map_err(|e| ConvertError::malformed(format!("failed reading {path}: {e}")))?;
                Ok(buf)
            }
            PdfInput::Url(_) => Err(ConvertError::invalid_input(
                "PdfiumRasterizer requires materialized bytes; URL inputs must be resolved by the RangeLoader first",
            )),
        }
    }

    fn open_document<'a>(
        &self,
        pdfium: &'a Pdfium,
        bytes: &'a [u8],
    ) -> ConvertOutcome<PdfDocument<'a>> {
        if bytes.is_empty() {
            return Err(ConvertError::malformed("empty PDF buffer"));
        }
        pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| ConvertError::malformed(format!("invalid PDF: {e}")))
    }
}

impl Default for PdfiumRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn render_page(
        &self,
        input: &PdfInput,
        page_num: usize,
        options: &RenderOptions,
    ) -> ConvertOutcome<RenderedPage> {
        let start = Instant::now();
        let pdfium = match shared_pdfium() {
            Ok(p) => p,
            Err(e) => {
                self.available.store(false, std::sync::atomic::Ordering::Relaxed);
                return Err(e);
            }
        };
        let bytes = self.load_bytes(input)?;
        let document = self.open_document(pdfium, &bytes)?;
        let pages = document.pages();
        if page_num == 0 || page_num > pages.len() as usize {
            return Err(ConvertError::invalid_input(format!(
                "page {page_num} out of range (document has {} pages)",
                pages.len()
            )));
        }
        let page = pages
            .get((page_num - 1) as u16)
            .map_err(|e| ConvertError::page_render_failed(format!("page {page_num}: {e}")))?;

        let native_width = page.width().value;
        let native_height = page.height().value;
        let scale = options.scale_for(native_width);
        let target_w = (native_width * scale).round().max(1.0) as i32;
        let target_h = (native_height * scale).round().max(1.0) as i32;

        let render_config = PdfRenderConfig::new()
            .set_target_width(target_w)
            .set_maximum_height(target_h);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| ConvertError::page_render_failed(format!("render page {page_num}: {e}")))?;

        let raw_rgba = bitmap.as_rgba_bytes();
        let width = bitmap.width() as u32;
        let height = bitmap.height() as u32;

        Ok(RenderedPage {
            raw_rgba,
            width,
            height,
            native_width,
            native_height,
            render_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn encode(&self, page: &RenderedPage, options: &RenderOptions) -> ConvertOutcome<EncodedImage> {
        let start = Instant::now();
        let bytes = match options.format {
            ImageFormat::Png => encode_png(page, options)?,
            ImageFormat::Webp => encode_webp(page, options)?,
            ImageFormat::Jpeg => encode_jpeg(page, options)?,
        };
        Ok(EncodedImage {
            bytes,
            encode_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn page_count(&self, input: &PdfInput) -> ConvertOutcome<usize> {
        let pdfium = shared_pdfium()?;
        let bytes = self.load_bytes(input)?;
        let document = self.open_document(pdfium, &bytes)?;
        Ok(document.pages().len() as usize)
    }

    fn is_available(&self) -> bool {
        self.available.load(std::sync::atomic::Ordering::Relaxed) && shared_pdfium().is_ok()
    }
}

fn encode_png(page: &RenderedPage, options: &RenderOptions) -> ConvertOutcome<Vec<u8>> {
    crate::codec::encode_png(&page.raw_rgba, page.width, page.height, options.png_compression)
        .map_err(|e| ConvertError::encode_failed(format!("png encode: {e}")))
}

fn encode_webp(page: &RenderedPage, options: &RenderOptions) -> ConvertOutcome<Vec<u8>> {
    crate::codec::encode_webp(&page.raw_rgba, page.width, page.height, options.quality)
        .map_err(|e| ConvertError::encode_failed(format!("webp encode: {e}")))
}

fn encode_jpeg(page: &RenderedPage, options: &RenderOptions) -> ConvertOutcome<Vec<u8>> {
    crate::codec::encode_jpeg(&page.raw_rgba, page.width, page.height, options.quality)
        .map_err(|e| ConvertError::encode_failed(format!("jpeg encode: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdfium_rasterizer_starts_available() {
        let r = PdfiumRasterizer::new();
        assert!(r.available.load(std::sync::atomic::Ordering::Relaxed));
    }
}
