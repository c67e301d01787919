use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{
    certification::Certification,
    details::{Details, Painting},
    diploma::Diploma,
    experience::Experience,
    project::Project,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
}

/// Unauthenticated view of a user's profile
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicProfile {
    pub user: PublicUser,
    pub details: Details,
    pub paintings: Vec<Painting>,
    pub projects: Vec<Project>,
    pub certifications: Vec<Certification>,
    pub diplomas: Vec<Diploma>,
    /// Visible entries only, newest start date first
    pub experience: Vec<Experience>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VisitsResponse {
    pub user_id: Uuid,
    pub visits: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvatarResponse {
    pub image_url: String,
}
