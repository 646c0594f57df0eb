use std::sync::Arc;

/// Where a PDF comes from. Immutable for the lifetime of the request that
/// produced it; workers never mutate the referenced bytes or path.
#[derive(Debug, Clone)]
pub enum PdfInput {
    LocalPath(String),
    Url(String),
    /// Already-resident bytes, shared (not copied) across workers.
    BytesOwned(Arc<Vec<u8>>),
}

impl PdfInput {
    pub fn is_url(&self) -> bool {
        matches!(self, PdfInput::Url(_))
    }

    /// Short label for logging/tracing fields; never includes the full
    /// path or URL so request logs don't leak local filesystem layout.
    pub fn kind_label(&self) -> &'static str {
        match self {
            PdfInput::LocalPath(_) => "local_path",
            PdfInput::Url(_) => "url",
            PdfInput::BytesOwned(_) => "bytes",
        }
    }
}
