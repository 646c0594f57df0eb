use crate::input::PdfInput;
use crate::options::RenderOptions;
use std::sync::Arc;

/// Unit of work handed to a worker: one page of one document.
#[derive(Debug, Clone)]
pub struct Task {
    pub input: Arc<PdfInput>,
    pub page_num: usize,
    pub options: RenderOptions,
}

impl Task {
    pub fn new(input: Arc<PdfInput>, page_num: usize, options: RenderOptions) -> Self {
        Self {
            input,
            page_num,
            options,
        }
    }
}
