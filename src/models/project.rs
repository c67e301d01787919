use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Project {
    pub id: Uuid,
    pub details_id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectFields {
    pub title: String,
    pub content: Option<String>,
    pub url: String,
}

/// Create or fully update a project
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(default)]
pub struct ProjectRequest {
    #[validate(length(max = 200), custom(function = "crate::utils::validation::non_blank"))]
    #[schema(example = "Note G")]
    pub title: String,

    #[validate(length(max = 5000))]
    pub content: Option<String>,

    #[validate(url)]
    #[schema(example = "https://github.com/ada/note-g")]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProjectListResponse {
    pub projects: Vec<Project>,
    pub count: usize,
}
