//! Thin wrapper around the `image` and `webp` crates, shared by both the
//! pdfium-backed Rasterizer and the dependency-free fallback so that
//! magic-byte and quality-vs-size behavior (spec.md §8 end-to-end
//! scenarios) is identical regardless of which engine produced the
//! pixels. Grounded on `riptide-streaming`'s use of the `image` crate for
//! raster encode/decode.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageEncoder, RgbaImage};

pub fn encode_png(rgba: &[u8], width: u32, height: u32, compression: u8) -> Result<Vec<u8>, String> {
    let image = RgbaImage::from_raw(width, height, rgba.to_vec())
        .ok_or_else(|| "rgba buffer does not match width/height".to_string())?;
    let compression_type = if compression <= 2 {
        CompressionType::Fast
    } else if compression >= 7 {
        CompressionType::Best
    } else {
        CompressionType::Default
    };
    let mut out = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut out, compression_type, FilterType::Adaptive);
    encoder
        .write_image(&image, width, height, image::ExtendedColorType::Rgba8)
        .map_err(|e| e.to_string())?;
    Ok(out)
}

pub fn encode_jpeg(rgba: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, String> {
    let image = RgbaImage::from_raw(width, height, rgba.to_vec())
        .ok_or_else(|| "rgba buffer does not match width/height".to_string())?;
    let rgb = image::DynamicImage::ImageRgba8(image).to_rgb8();
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality.max(1));
    encoder
        .write_image(&rgb, width, height, image::ExtendedColorType::Rgb8)
        .map_err(|e| e.to_string())?;
    Ok(out)
}

pub fn encode_webp(rgba: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, String> {
    let encoder = webp::Encoder::from_rgba(rgba, width, height);
    let encoded = encoder.encode(quality as f32);
    Ok(encoded.to_vec())
}
