use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Certification {
    pub id: Uuid,
    pub details_id: Uuid,
    pub title: String,
    pub institution: String,
    pub date_awarded: NaiveDate,
    /// Text pulled out of the uploaded document
    pub extracted_text: Option<String>,
    pub description: Option<String>,
    pub file_url: Option<String>,
    pub file_kind: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CertificationFields {
    pub title: String,
    pub institution: String,
    pub date_awarded: NaiveDate,
    pub description: Option<String>,
}

/// Stored file for a certification
#[derive(Debug, Clone, PartialEq)]
pub struct CertificationFile {
    pub file_url: String,
    pub file_kind: String,
    pub extracted_text: Option<String>,
}

/// Certification metadata. Sent as multipart fields alongside `file` on
/// upload and as JSON on update.
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(default)]
pub struct CertificationRequest {
    #[validate(length(max = 200), custom(function = "crate::utils::validation::non_blank"))]
    #[schema(example = "Certified Engine Operator")]
    pub title: String,

    #[validate(length(max = 200), custom(function = "crate::utils::validation::non_blank"))]
    #[schema(example = "Royal Society")]
    pub institution: String,

    /// `YYYY-MM-DD`
    #[validate(custom(function = "crate::utils::validation::calendar_date"))]
    #[schema(example = "1843-10-01")]
    pub date_awarded: String,

    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

/// Multipart body for a certification upload
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct CertificationUpload {
    /// Image or PDF
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    pub title: String,
    pub institution: String,
    /// `YYYY-MM-DD`
    pub date_awarded: String,
    pub description: Option<String>,
    /// File to delete from the media host once replaced
    pub previous_file_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CertificationListResponse {
    pub certifications: Vec<Certification>,
    pub count: usize,
}
