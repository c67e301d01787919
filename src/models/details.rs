use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Profile details, at most one per user
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Details {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    /// Avatar reference
    pub image: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Painting {
    pub id: Uuid,
    pub details_id: Uuid,
    pub title: String,
    pub content: String,
    pub position: i32,
}

/// Cleaned details columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailsFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub image: Option<String>,
}

/// Cleaned painting to store
#[derive(Debug, Clone, PartialEq)]
pub struct PaintingFields {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(default)]
pub struct PaintingInput {
    #[validate(length(max = 200), custom(function = "crate::utils::validation::non_blank"))]
    #[schema(example = "Starry Harbour")]
    pub title: String,

    #[validate(custom(function = "crate::utils::validation::non_blank"))]
    #[schema(example = "Oil on canvas, 2021.")]
    pub content: String,
}

/// Create or replace the caller's details.
///
/// `paintings` is the complete desired set; anything not listed is removed.
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct SaveDetailsRequest {
    #[validate(length(max = 100))]
    #[schema(example = "Ada")]
    pub first_name: Option<String>,

    #[validate(length(max = 100))]
    #[schema(example = "Lovelace")]
    pub last_name: Option<String>,

    #[validate(length(max = 5000))]
    pub bio: Option<String>,

    #[validate(length(max = 30))]
    #[schema(example = "+441234567890")]
    pub phone: Option<String>,

    #[schema(example = "https://res.cloudinary.com/demo/image/upload/v1/folio/avatars/ada.png")]
    pub image: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub paintings: Vec<PaintingInput>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DetailsResponse {
    pub details: Details,
    pub paintings: Vec<Painting>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaintingsResponse {
    pub paintings: Vec<Painting>,
}
