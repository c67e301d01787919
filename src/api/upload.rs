//! Multipart form reading shared by the upload handlers.

use std::borrow::Cow;
use std::collections::HashMap;

use axum::extract::Multipart;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::errors::AppError;
use crate::models::app_state::AppState;
use crate::utils::media::{FileKind, MediaFile, delete_best_effort};

/// Name of the part carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

/// A parsed multipart upload: at most one file plus text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    file: Option<MediaFile>,
    fields: HashMap<String, String>,
}

fn field_error(field: &'static str, code: &'static str, message: &'static str) -> AppError {
    let mut errors = ValidationErrors::new();
    errors.add(field, ValidationError::new(code).with_message(Cow::from(message)));
    AppError::Validation(errors)
}

/// Delete the file an upload replaces, if it is one of the caller's own.
///
/// URLs the caller does not own are logged and left alone.
pub async fn discard_previous(state: &AppState, user_id: Uuid, url: Option<&str>) -> Result<(), AppError> {
    let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
        return Ok(());
    };

    if !state.store.owns_media(user_id, url).await? {
        tracing::warn!("User {} asked to replace media {} they do not own, skipping delete", user_id, url);
        return Ok(());
    }

    delete_best_effort(state.media.as_ref(), Some(url)).await;
    Ok(())
}

impl UploadForm {
    /// Drain a multipart body.
    ///
    /// The file part must be non-empty and an image or PDF. Unknown text
    /// fields are kept and simply never read.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            tracing::warn!("Error reading multipart field: {}", e);
            AppError::ValidationError(format!("Invalid multipart data: {}", e))
        })? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == FILE_FIELD {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::ValidationError(format!("Invalid multipart data: {}", e))
                })?;

                if bytes.is_empty() {
                    return Err(field_error(FILE_FIELD, "empty", "must not be empty"));
                }
                let kind = FileKind::detect(content_type.as_deref(), &file_name).ok_or_else(|| {
                    field_error(FILE_FIELD, "file_kind", "must be an image or a PDF")
                })?;

                form.file = Some(MediaFile {
                    file_name,
                    content_type: content_type
                        .unwrap_or_else(|| "application/octet-stream".to_string()),
                    kind,
                    bytes,
                });
            } else {
                let value = field.text().await.map_err(|e| {
                    AppError::ValidationError(format!("Invalid multipart data: {}", e))
                })?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// The uploaded file, or a validation error naming the missing part.
    pub fn take_file(&mut self) -> Result<MediaFile, AppError> {
        self.file
            .take()
            .ok_or_else(|| field_error(FILE_FIELD, "required", "a file is required"))
    }

    /// Text field value, empty string when absent.
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// Optional text field; blanks count as absent.
    pub fn optional(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}
