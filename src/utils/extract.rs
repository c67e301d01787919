use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::utils::media::{FileKind, MediaFile};

/// Pulls readable text out of an uploaded document.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// PDFs yield their text layer, images go through OCR.
    async fn extract(&self, file: &MediaFile) -> Result<String, AppError>;
}

/// [`TextExtractor`] backed by the OCR.space parse API
pub struct OcrSpaceExtractor {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrResponse {
    #[serde(default)]
    parsed_results: Vec<ParsedResult>,
    #[serde(default)]
    is_errored_on_processing: bool,
    #[serde(default)]
    error_message: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    parsed_text: String,
}

impl OcrSpaceExtractor {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
        }
    }
}

fn filetype_hint(file: &MediaFile) -> String {
    match file.kind {
        FileKind::Pdf => "PDF".to_string(),
        FileKind::Image => file.extension().to_ascii_uppercase(),
    }
}

fn collect_text(response: OcrResponse) -> Result<String, AppError> {
    if response.is_errored_on_processing {
        let message = match &response.error_message {
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("; "),
            _ => "unknown OCR failure".to_string(),
        };
        return Err(AppError::Upstream(format!("Text extraction failed: {}", message)));
    }

    let text = response
        .parsed_results
        .iter()
        .map(|r| r.parsed_text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(text)
}

#[async_trait]
impl TextExtractor for OcrSpaceExtractor {
    async fn extract(&self, file: &MediaFile) -> Result<String, AppError> {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| AppError::ValidationError(format!("Invalid content type: {}", e)))?;

        let mut form = Form::new()
            .part("file", part)
            .text("language", "eng")
            .text("filetype", filetype_hint(file))
            .text("scale", "true");
        if file.kind == FileKind::Image {
            // Engine 2 handles photographed certificates noticeably better.
            form = form.text("OCREngine", "2");
        }

        let response = self
            .client
            .post(&self.api_url)
            .header("apikey", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("OCR request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!("OCR service returned {}", status)));
        }

        let parsed: OcrResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("OCR response unreadable: {}", e)))?;

        collect_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use serde_json::json;

    #[test]
    fn pages_are_joined() {
        let response: OcrResponse = serde_json::from_value(json!({
            "ParsedResults": [
                { "ParsedText": " Certificate of Completion \r\n" },
                { "ParsedText": "   " },
                { "ParsedText": "Awarded to Ada" }
            ],
            "IsErroredOnProcessing": false
        }))
        .unwrap();

        assert_eq!(
            collect_text(response).unwrap(),
            "Certificate of Completion\nAwarded to Ada"
        );
    }

    #[test]
    fn processing_errors_become_upstream_failures() {
        let response: OcrResponse = serde_json::from_value(json!({
            "IsErroredOnProcessing": true,
            "ErrorMessage": ["File failed validation", "Unsupported type"]
        }))
        .unwrap();

        match collect_text(response) {
            Err(AppError::Upstream(msg)) => {
                assert!(msg.contains("File failed validation; Unsupported type"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn filetype_hint_tracks_kind() {
        let file = MediaFile {
            file_name: "cert.jpeg".to_string(),
            content_type: "image/jpeg".to_string(),
            kind: FileKind::Image,
            bytes: Bytes::new(),
        };
        assert_eq!(filetype_hint(&file), "JPG");

        let pdf = MediaFile {
            kind: FileKind::Pdf,
            content_type: "application/pdf".to_string(),
            ..file
        };
        assert_eq!(filetype_hint(&pdf), "PDF");
    }
}
