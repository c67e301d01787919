use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Diploma {
    pub id: Uuid,
    pub details_id: Uuid,
    pub degree: String,
    pub field_of_study: String,
    pub institution: String,
    pub date_awarded: NaiveDate,
    pub file_url: String,
    /// `image` or `pdf`
    pub file_kind: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiplomaFields {
    pub degree: String,
    pub field_of_study: String,
    pub institution: String,
    pub date_awarded: NaiveDate,
}

/// Diploma metadata. Multipart fields on upload, JSON on update.
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(default)]
pub struct DiplomaRequest {
    #[validate(length(max = 200), custom(function = "crate::utils::validation::non_blank"))]
    #[schema(example = "BSc")]
    pub degree: String,

    #[validate(length(max = 200), custom(function = "crate::utils::validation::non_blank"))]
    #[schema(example = "Mathematics")]
    pub field_of_study: String,

    #[validate(length(max = 200), custom(function = "crate::utils::validation::non_blank"))]
    #[schema(example = "University of London")]
    pub institution: String,

    /// `YYYY-MM-DD`
    #[validate(custom(function = "crate::utils::validation::calendar_date"))]
    #[schema(example = "1835-06-30")]
    pub date_awarded: String,
}

/// Multipart body for a diploma upload
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct DiplomaUpload {
    /// Image or PDF
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    pub degree: String,
    pub field_of_study: String,
    pub institution: String,
    /// `YYYY-MM-DD`
    pub date_awarded: String,
    /// File to delete from the media host once replaced
    pub previous_file_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiplomaListResponse {
    pub diplomas: Vec<Diploma>,
    pub count: usize,
}
