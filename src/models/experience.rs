use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Experience entry, owned directly by a user
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Experience {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company: String,
    pub role: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    /// `None` while the position is current
    pub end_date: Option<NaiveDate>,
    /// Included in the public profile when true
    pub visible: bool,
    pub created_at: DateTime<Utc>,
}

/// Cleaned experience columns
#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceFields {
    pub company: String,
    pub role: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// `None` keeps the stored flag on update; new entries default to visible
    pub visible: Option<bool>,
}

/// Create or fully update an experience entry
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(default)]
pub struct ExperienceRequest {
    #[validate(length(max = 200), custom(function = "crate::utils::validation::non_blank"))]
    #[schema(example = "Analytical Engines Ltd")]
    pub company: String,

    #[validate(length(max = 200), custom(function = "crate::utils::validation::non_blank"))]
    #[schema(example = "Programmer")]
    pub role: String,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    /// `YYYY-MM-DD`
    #[validate(custom(function = "crate::utils::validation::calendar_date"))]
    #[schema(example = "1842-09-01")]
    pub start_date: String,

    /// `YYYY-MM-DD`, omitted for a current position
    #[validate(custom(function = "crate::utils::validation::calendar_date"))]
    #[schema(example = "1843-07-01")]
    pub end_date: Option<String>,

    /// Defaults to visible on create; omitted on update keeps the current flag
    pub visible: Option<bool>,
}

/// Toggle public visibility only
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct VisibilityRequest {
    pub visible: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExperienceListResponse {
    pub experience: Vec<Experience>,
    pub count: usize,
}
