use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Webp,
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Webp => "webp",
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    pub fn parse(s: &str) -> Option<ImageFormat> {
        match s.to_ascii_lowercase().as_str() {
            "webp" => Some(ImageFormat::Webp),
            "png" => Some(ImageFormat::Png),
            "jpeg" | "jpg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }
}

/// Immutable per-request rendering/encoding knobs (spec.md §3).
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub target_width: u32,
    pub max_scale: f32,
    pub format: ImageFormat,
    pub quality: u8,
    pub png_compression: u8,
    pub webp_effort: u8,
    pub fast: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            target_width: 1280,
            max_scale: 4.0,
            format: ImageFormat::Webp,
            quality: 80,
            png_compression: 6,
            webp_effort: 4,
            fast: false,
        }
    }
}

impl RenderOptions {
    /// Scale factor applied to a page of the given native width, per the
    /// Rasterizer contract in spec.md §4.3: `s = min(target_width /
    /// native_width, max_scale)`.
    pub fn scale_for(&self, native_width: f32) -> f32 {
        (self.target_width as f32 / native_width).min(self.max_scale)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.target_width == 0 {
            return Err("target_width must be > 0".into());
        }
        if self.quality > 100 {
            return Err("quality must be 0..=100".into());
        }
        if self.png_compression > 9 {
            return Err("png_compression must be 0..=9".into());
        }
        if self.webp_effort > 6 {
            return Err("webp_effort must be 0..=6".into());
        }
        Ok(())
    }
}
