use async_trait::async_trait;
use axum::body::Bytes;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use utoipa::ToSchema;

use crate::errors::AppError;

const CLOUDINARY_API: &str = "https://api.cloudinary.com/v1_1";

pub const CERTIFICATIONS_FOLDER: &str = "folio/certifications";
pub const DIPLOMAS_FOLDER: &str = "folio/diplomas";
pub const AVATARS_FOLDER: &str = "folio/avatars";

/// Kind of an uploaded document, derived from its content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Pdf,
}

impl FileKind {
    /// Classify by content type, falling back to the file extension when the
    /// client sent none or a generic one.
    pub fn detect(content_type: Option<&str>, file_name: &str) -> Option<Self> {
        match content_type.map(|ct| ct.trim().to_ascii_lowercase()) {
            Some(ct) if ct == "application/pdf" => return Some(FileKind::Pdf),
            Some(ct) if ct.starts_with("image/") => return Some(FileKind::Image),
            Some(ct) if ct != "application/octet-stream" => return None,
            _ => {}
        }

        let extension = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(FileKind::Pdf),
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" | "tif" | "tiff" => {
                Some(FileKind::Image)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Pdf => "pdf",
        }
    }
}

/// A file received from a multipart upload
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: String,
    pub kind: FileKind,
    pub bytes: Bytes,
}

impl MediaFile {
    /// File extension to use when storing this file under a generated name.
    pub fn extension(&self) -> String {
        let from_type = match self.content_type.as_str() {
            "application/pdf" => Some("pdf"),
            "image/png" => Some("png"),
            "image/jpeg" => Some("jpg"),
            "image/gif" => Some("gif"),
            "image/webp" => Some("webp"),
            _ => None,
        };

        from_type
            .map(str::to_string)
            .or_else(|| {
                self.file_name
                    .rsplit_once('.')
                    .map(|(_, ext)| ext.to_ascii_lowercase())
                    .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            })
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// Result of storing a file on the media host
#[derive(Debug, Clone)]
pub struct UploadedMedia {
    pub url: String,
    pub public_id: String,
}

/// External object storage for uploaded media.
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, file: &MediaFile, folder: &str) -> Result<UploadedMedia, AppError>;

    /// Remove a previously uploaded file by the URL returned from `upload`.
    async fn delete(&self, url: &str) -> Result<(), AppError>;
}

/// Delete a replaced file without letting a failure reach the caller.
///
/// A failure here leaves an orphaned remote asset; it is logged with its URL.
pub async fn delete_best_effort(media: &dyn MediaHost, url: Option<&str>) {
    let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
        return;
    };

    if let Err(e) = media.delete(url).await {
        tracing::warn!("Failed to delete previous media {}: {}", url, e);
    }
}

/// [`MediaHost`] backed by the Cloudinary upload API
pub struct CloudinaryHost {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryDestroyResponse {
    result: String,
}

impl CloudinaryHost {
    pub fn new(cloud_name: String, api_key: String, api_secret: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            cloud_name,
            api_key,
            api_secret,
        }
    }

    fn sign(&self, params: &[(&str, &str)]) -> String {
        sign_params(params, &self.api_secret)
    }
}

/// Cloudinary request signature: SHA-1 over the sorted `key=value` pairs
/// joined by `&`, followed by the API secret.
fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    hex::encode(Sha1::digest(format!("{}{}", to_sign, api_secret).as_bytes()))
}

/// Recover `(resource_type, public_id)` from a Cloudinary delivery URL such as
/// `https://res.cloudinary.com/demo/image/upload/v1712/folio/diplomas/abc.pdf`.
fn public_id_from_url(url: &str) -> Option<(String, String)> {
    let (prefix, rest) = url.split_once("/upload/")?;
    let resource_type = prefix.rsplit('/').next()?.to_string();

    let rest = rest.split(['?', '#']).next()?;
    let rest = match rest.split_once('/') {
        Some((version, tail))
            if version.len() > 1
                && version.starts_with('v')
                && version[1..].chars().all(|c| c.is_ascii_digit()) =>
        {
            tail
        }
        _ => rest,
    };

    let public_id = match rest.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') => stem,
        _ => rest,
    };

    if resource_type.is_empty() || public_id.is_empty() {
        return None;
    }
    Some((resource_type, public_id.to_string()))
}

fn upstream(context: &str, e: impl std::fmt::Display) -> AppError {
    AppError::Upstream(format!("{}: {}", context, e))
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    async fn upload(&self, file: &MediaFile, folder: &str) -> Result<UploadedMedia, AppError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("folder", folder), ("timestamp", &timestamp)]);

        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| AppError::ValidationError(format!("Invalid content type: {}", e)))?;

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("signature", signature);

        let response = self
            .client
            .post(format!("{}/{}/auto/upload", CLOUDINARY_API, self.cloud_name))
            .multipart(form)
            .send()
            .await
            .map_err(|e| upstream("Cloudinary upload request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(upstream("Cloudinary upload rejected", format!("{} {}", status, body)));
        }

        let uploaded: CloudinaryUploadResponse = response
            .json()
            .await
            .map_err(|e| upstream("Cloudinary upload response unreadable", e))?;

        tracing::info!("Uploaded {} to {}", file.file_name, uploaded.secure_url);

        Ok(UploadedMedia {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }

    async fn delete(&self, url: &str) -> Result<(), AppError> {
        let (resource_type, public_id) = public_id_from_url(url)
            .ok_or_else(|| upstream("Not a Cloudinary URL", url))?;

        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("public_id", &public_id), ("timestamp", &timestamp)]);

        let form = Form::new()
            .text("public_id", public_id.clone())
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);

        let response = self
            .client
            .post(format!(
                "{}/{}/{}/destroy",
                CLOUDINARY_API, self.cloud_name, resource_type
            ))
            .multipart(form)
            .send()
            .await
            .map_err(|e| upstream("Cloudinary destroy request failed", e))?;

        let destroyed: CloudinaryDestroyResponse = response
            .json()
            .await
            .map_err(|e| upstream("Cloudinary destroy response unreadable", e))?;

        if destroyed.result != "ok" {
            return Err(upstream("Cloudinary destroy refused", destroyed.result));
        }

        tracing::info!("Deleted media {}", public_id);
        Ok(())
    }
}
