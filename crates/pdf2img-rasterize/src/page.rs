/// Raw RGBA8888 pixels produced by a single page render, row-major, plus
/// the native page dimensions the scale factor was computed from.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub raw_rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub native_width: f32,
    pub native_height: f32,
    pub render_ms: u64,
}

#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub encode_ms: u64,
}
