//! Persistence ports.
//!
//! Every mutation of a profile row takes the caller's user id and filters on
//! it together with the row id. A row owned by someone else therefore looks
//! exactly like a missing row (`None` / `false`).

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    certification::{Certification, CertificationFields, CertificationFile},
    details::{Details, DetailsFields, Painting, PaintingFields},
    diploma::{Diploma, DiplomaFields},
    experience::{Experience, ExperienceFields},
    project::{Project, ProjectFields},
    user::{NewUser, ResetToken, User},
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

/// Users and password reset tokens.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Fails with [`AppError::DuplicateEmail`] when the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<(), AppError>;

    async fn insert_reset_token(&self, token: &ResetToken) -> Result<(), AppError>;

    async fn find_reset_token(&self, token: &str) -> Result<Option<ResetToken>, AppError>;

    /// Returns whether a token was removed.
    async fn delete_reset_token(&self, token: &str) -> Result<bool, AppError>;
}

/// Details and the collections hanging off a profile.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_details(&self, user_id: Uuid) -> Result<Option<Details>, AppError>;

    /// Insert or overwrite the details row keyed on `user_id`.
    async fn upsert_details(&self, user_id: Uuid, fields: &DetailsFields) -> Result<Details, AppError>;

    /// Details id for `user_id`, creating an empty record when none exists.
    async fn ensure_details(&self, user_id: Uuid) -> Result<Uuid, AppError>;

    /// Delete every painting of `details_id` and insert `paintings` in order.
    async fn replace_paintings(
        &self,
        details_id: Uuid,
        paintings: &[PaintingFields],
    ) -> Result<Vec<Painting>, AppError>;

    async fn list_paintings(&self, user_id: Uuid) -> Result<Vec<Painting>, AppError>;

    /// Newest start date first; `visible_only` restricts to public entries.
    async fn list_experience(&self, user_id: Uuid, visible_only: bool) -> Result<Vec<Experience>, AppError>;

    async fn insert_experience(&self, user_id: Uuid, fields: &ExperienceFields) -> Result<Experience, AppError>;

    async fn update_experience(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: &ExperienceFields,
    ) -> Result<Option<Experience>, AppError>;

    async fn set_experience_visibility(
        &self,
        user_id: Uuid,
        id: Uuid,
        visible: bool,
    ) -> Result<Option<Experience>, AppError>;

    async fn delete_experience(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError>;

    /// Oldest first.
    async fn list_projects(&self, user_id: Uuid) -> Result<Vec<Project>, AppError>;

    async fn insert_project(&self, details_id: Uuid, fields: &ProjectFields) -> Result<Project, AppError>;

    async fn update_project(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: &ProjectFields,
    ) -> Result<Option<Project>, AppError>;

    async fn delete_project(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError>;

    /// Newest award first.
    async fn list_certifications(&self, user_id: Uuid) -> Result<Vec<Certification>, AppError>;

    async fn insert_certification(
        &self,
        details_id: Uuid,
        fields: &CertificationFields,
        file: &CertificationFile,
    ) -> Result<Certification, AppError>;

    async fn update_certification(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: &CertificationFields,
    ) -> Result<Option<Certification>, AppError>;

    /// Returns the removed row so its file can be cleaned up.
    async fn delete_certification(&self, user_id: Uuid, id: Uuid) -> Result<Option<Certification>, AppError>;

    /// Newest award first.
    async fn list_diplomas(&self, user_id: Uuid) -> Result<Vec<Diploma>, AppError>;

    async fn insert_diploma(
        &self,
        details_id: Uuid,
        fields: &DiplomaFields,
        file_url: &str,
        file_kind: &str,
    ) -> Result<Diploma, AppError>;

    async fn update_diploma(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: &DiplomaFields,
    ) -> Result<Option<Diploma>, AppError>;

    /// Returns the removed row so its file can be cleaned up.
    async fn delete_diploma(&self, user_id: Uuid, id: Uuid) -> Result<Option<Diploma>, AppError>;

    /// Whether `url` is a file the user's own avatar, certifications or
    /// diplomas point at.
    async fn owns_media(&self, user_id: Uuid, url: &str) -> Result<bool, AppError>;
}

/// Everything the handlers need from storage.
#[async_trait]
pub trait Store: UserStore + ProfileStore {
    /// Round trip to the backing database.
    async fn ping(&self) -> Result<(), AppError>;
}
