use serde::Serialize;
use std::fmt;

/// Stable, user-observable error taxonomy (spec.md §7).
///
/// Kept separate from [`ConvertError`] so that transport layers (HTTP
/// status mapping, JSON bodies) can match on it without pattern-matching
/// a `thiserror` enum that may grow variant payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    FetchFailed,
    RangeFetchFailed,
    Malformed,
    RendererUnavailable,
    PageRenderFailed,
    EncodeFailed,
    Overloaded,
    QueueFull,
    Cancelled,
    Timeout,
    Unsupported,
}

impl ErrorKind {
    /// HTTP status this kind surfaces as, per spec.md §7. `Cancelled` has
    /// no canonical status; callers drop the connection rather than
    /// respond, so this returns `None`.
    pub fn http_status(self) -> Option<u16> {
        use ErrorKind::*;
        match self {
            InvalidInput | NotFound | Unsupported => Some(400),
            FetchFailed | RangeFetchFailed => Some(502),
            Malformed | RendererUnavailable => Some(500),
            PageRenderFailed | EncodeFailed => Some(200),
            Overloaded | QueueFull => Some(503),
            Cancelled => None,
            Timeout => Some(408),
        }
    }

    /// Whether this kind degrades to a per-page failure rather than
    /// failing the whole request (spec.md §7 policy).
    pub fn is_per_page(self) -> bool {
        matches!(self, ErrorKind::PageRenderFailed | ErrorKind::EncodeFailed)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::NotFound => "not_found",
            ErrorKind::FetchFailed => "fetch_failed",
            ErrorKind::RangeFetchFailed => "range_fetch_failed",
            ErrorKind::Malformed => "malformed",
            ErrorKind::RendererUnavailable => "renderer_unavailable",
            ErrorKind::PageRenderFailed => "page_render_failed",
            ErrorKind::EncodeFailed => "encode_failed",
            ErrorKind::Overloaded => "overloaded",
            ErrorKind::QueueFull => "queue_full",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

/// Top-level error type shared by every crate in the workspace.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ConvertError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ConvertError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn fetch_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FetchFailed, message)
    }

    pub fn range_fetch_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RangeFetchFailed, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Malformed, message)
    }

    pub fn renderer_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RendererUnavailable, message)
    }

    pub fn page_render_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PageRenderFailed, message)
    }

    pub fn encode_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EncodeFailed, message)
    }

    pub fn overloaded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Overloaded, message)
    }

    pub fn queue_full(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::QueueFull, message)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "operation cancelled")
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unsupported, message)
    }
}

pub type ConvertOutcome<T> = Result<T, ConvertError>;
