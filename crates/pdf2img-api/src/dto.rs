//! Request/response JSON shapes (spec.md §6). Kept separate from the
//! core types (`pdf2img_types`) so the wire format can evolve (field
//! renames, optional knobs) without touching the types every other
//! crate shares, mirroring `riptide-api::handlers::pdf::PdfProcessRequest`.

use pdf2img_types::{ConvertResult, ImageFormat, PageOutput, PageSelector, RenderOptions};
use serde::{Deserialize, Serialize};

fn default_quality() -> u8 {
    80
}

fn default_target_width() -> u32 {
    1280
}

/// `POST /pdf2img` request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    pub url: Option<String>,
    pub global_pad_id: Option<String>,
    /// `"all"`, an array of 1-based page numbers, or absent/null (both
    /// treated as `FirstN(6)` per the Dispatcher's default selector).
    #[serde(default)]
    pub pages: Option<serde_json::Value>,
    #[serde(default = "default_target_width")]
    pub target_width: u32,
    #[serde(default)]
    pub format: Option<ImageFormat>,
    #[serde(default = "default_quality")]
    pub quality: u8,
}

#[derive(Debug)]
pub enum DtoError {
    MissingUrl,
    InvalidUrl,
    MissingGlobalPadId,
    InvalidPages,
}

impl DtoError {
    pub fn message(&self) -> &'static str {
        match self {
            DtoError::MissingUrl => "URL is required",
            DtoError::InvalidUrl => "Invalid URL format",
            DtoError::MissingGlobalPadId => "globalPadId is required",
            DtoError::InvalidPages => "pages must be an Array or String as \"all\"",
        }
    }
}

impl ConvertRequest {
    /// Validates the request body per spec.md §6's exact rejection
    /// messages and turns it into the core types the Dispatcher expects.
    pub fn into_parts(self) -> Result<(String, String, PageSelector, RenderOptions), DtoError> {
        let url = self.url.ok_or(DtoError::MissingUrl)?;
        if url::Url::parse(&url).is_err() {
            return Err(DtoError::InvalidUrl);
        }
        let global_pad_id = self.global_pad_id.ok_or(DtoError::MissingGlobalPadId)?;

        let selector = match self.pages {
            None => PageSelector::default(),
            Some(serde_json::Value::Null) => PageSelector::default(),
            Some(serde_json::Value::String(s)) if s.eq_ignore_ascii_case("all") => PageSelector::All,
            Some(serde_json::Value::Array(items)) => {
                let mut raw = Vec::with_capacity(items.len());
                for item in items {
                    match item.as_i64() {
                        Some(n) => raw.push(n),
                        None => return Err(DtoError::InvalidPages),
                    }
                }
                PageSelector::normalize(raw)
            }
            _ => return Err(DtoError::InvalidPages),
        };

        let mut options = RenderOptions {
            target_width: self.target_width,
            quality: self.quality,
            ..RenderOptions::default()
        };
        if let Some(format) = self.format {
            options.format = format;
        }

        Ok((url, global_pad_id, selector, options))
    }
}

/// Wire projection of a single rendered page, per the `data[]` entries
/// of spec.md §6's success response. The active sink policy determines
/// which of `output_path` / `cos_key` / `buffer` is populated.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub page_num: usize,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cos_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Generic success envelope: `{ code, message, data }` (spec.md §6).
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub code: u16,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 200,
            message: "ok".to_string(),
            data,
        }
    }
}

/// Converts a core [`ConvertResult`] into the wire page list, base64
/// encoding in-memory buffers at the edge only — core types never carry
/// a `serde`-facing byte encoding.
pub fn convert_result_to_pages(result: &ConvertResult) -> Vec<PageResponse> {
    result
        .pages
        .iter()
        .map(|p| {
            if !p.success {
                return PageResponse {
                    page_num: p.page_num,
                    width: 0,
                    height: 0,
                    output_path: None,
                    cos_key: None,
                    buffer: None,
                    error: p.error_message.clone(),
                };
            }
            let (output_path, cos_key, buffer) = match &p.output {
                Some(PageOutput::FilePath(path)) => (Some(path.clone()), None, None),
                Some(PageOutput::SinkKey(key)) => (None, Some(key.clone()), None),
                Some(PageOutput::Bytes(bytes)) => {
                    use base64::prelude::*;
                    (None, None, Some(BASE64_STANDARD.encode(bytes)))
                }
                None => (None, None, None),
            };
            PageResponse {
                page_num: p.page_num,
                width: p.width,
                height: p.height,
                output_path,
                cos_key,
                buffer,
                error: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_url_is_rejected() {
        let req = ConvertRequest {
            url: None,
            global_pad_id: Some("pad".to_string()),
            pages: None,
            target_width: 1280,
            format: None,
            quality: 80,
        };
        assert!(matches!(req.into_parts(), Err(DtoError::MissingUrl)));
    }

    #[test]
    fn malformed_url_is_rejected() {
        let req = ConvertRequest {
            url: Some("not a url".to_string()),
            global_pad_id: Some("pad".to_string()),
            pages: None,
            target_width: 1280,
            format: None,
            quality: 80,
        };
        assert!(matches!(req.into_parts(), Err(DtoError::InvalidUrl)));
    }

    #[test]
    fn pages_all_string_resolves_to_all_selector() {
        let req = ConvertRequest {
            url: Some("https://example.com/doc.pdf".to_string()),
            global_pad_id: Some("pad".to_string()),
            pages: Some(serde_json::json!("all")),
            target_width: 1280,
            format: None,
            quality: 80,
        };
        let (_, _, selector, _) = req.into_parts().unwrap();
        assert_eq!(selector, PageSelector::All);
    }

    #[test]
    fn pages_wrong_type_is_rejected() {
        let req = ConvertRequest {
            url: Some("https://example.com/doc.pdf".to_string()),
            global_pad_id: Some("pad".to_string()),
            pages: Some(serde_json::json!(42)),
            target_width: 1280,
            format: None,
            quality: 80,
        };
        assert!(matches!(req.into_parts(), Err(DtoError::InvalidPages)));
    }
}
