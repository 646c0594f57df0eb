use crate::error::ErrorKind;
use serde::Serialize;

/// Where the encoded bytes for a page landed, chosen by the service
/// endpoint's sink policy — the Dispatcher never picks this itself.
#[derive(Debug, Clone)]
pub enum PageOutput {
    Bytes(Vec<u8>),
    FilePath(String),
    SinkKey(String),
}

impl PageOutput {
    pub fn byte_len(&self) -> Option<usize> {
        match self {
            PageOutput::Bytes(b) => Some(b.len()),
            _ => None,
        }
    }
}

/// Per-page outcome (spec.md §3).
#[derive(Debug, Clone)]
pub struct PageResult {
    pub page_num: usize,
    pub width: u32,
    pub height: u32,
    pub success: bool,
    pub output: Option<PageOutput>,
    pub size_bytes: u64,
    pub render_ms: u64,
    pub encode_ms: u64,
    pub error_kind: Option<ErrorKind>,
    pub error_message: Option<String>,
}

impl PageResult {
    pub fn success(
        page_num: usize,
        width: u32,
        height: u32,
        output: PageOutput,
        size_bytes: u64,
        render_ms: u64,
        encode_ms: u64,
    ) -> Self {
        Self {
            page_num,
            width,
            height,
            success: true,
            output: Some(output),
            size_bytes,
            render_ms,
            encode_ms,
            error_kind: None,
            error_message: None,
        }
    }

    pub fn failure(page_num: usize, kind: ErrorKind, message: impl Into<String>, render_ms: u64) -> Self {
        Self {
            page_num,
            width: 0,
            height: 0,
            success: false,
            output: None,
            size_bytes: 0,
            render_ms,
            encode_ms: 0,
            error_kind: Some(kind),
            error_message: Some(message.into()),
        }
    }
}

/// Wire-friendly projection of a [`PageResult`] used by the HTTP layer;
/// kept separate so the core types don't need `serde` on `PageOutput`'s
/// byte payloads (which are base64-encoded only at the edge).
#[derive(Debug, Serialize)]
pub struct PageResultDto {
    pub page_num: usize,
    pub width: u32,
    pub height: u32,
    pub success: bool,
    pub size_bytes: u64,
    pub render_ms: u64,
    pub encode_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<&PageResult> for PageResultDto {
    fn from(p: &PageResult) -> Self {
        Self {
            page_num: p.page_num,
            width: p.width,
            height: p.height,
            success: p.success,
            size_bytes: p.size_bytes,
            render_ms: p.render_ms,
            encode_ms: p.encode_ms,
            error_kind: p.error_kind.map(|k| k.to_string()),
            error_message: p.error_message.clone(),
        }
    }
}
