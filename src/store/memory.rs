//! In-memory stores backing the handler tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{ProfileStore, Store, UserStore};
use crate::errors::AppError;
use crate::models::{
    certification::{Certification, CertificationFields, CertificationFile},
    details::{Details, DetailsFields, Painting, PaintingFields},
    diploma::{Diploma, DiplomaFields},
    experience::{Experience, ExperienceFields},
    project::{Project, ProjectFields},
    user::{NewUser, ResetToken, User},
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    reset_tokens: Vec<ResetToken>,
    details: Vec<Details>,
    paintings: Vec<Painting>,
    experience: Vec<Experience>,
    projects: Vec<Project>,
    certifications: Vec<Certification>,
    diplomas: Vec<Diploma>,
}

impl Tables {
    fn details_id_of(&self, user_id: Uuid) -> Option<Uuid> {
        self.details.iter().find(|d| d.user_id == user_id).map(|d| d.id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn reset_token_count(&self) -> usize {
        self.tables.lock().await.reset_tokens.len()
    }

    pub async fn painting_count(&self) -> usize {
        self.tables.lock().await.paintings.len()
    }

    /// Move a token's expiry into the past.
    pub async fn expire_reset_token(&self, token: &str) {
        let mut tables = self.tables.lock().await;
        if let Some(t) = tables.reset_tokens.iter_mut().find(|t| t.token == token) {
            t.expires_at = Utc::now() - chrono::Duration::minutes(1);
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::DuplicateEmail);
        }

        let user = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            gender: user.gender,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(AppError::NotFound)?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn insert_reset_token(&self, token: &ResetToken) -> Result<(), AppError> {
        self.tables.lock().await.reset_tokens.push(token.clone());
        Ok(())
    }

    async fn find_reset_token(&self, token: &str) -> Result<Option<ResetToken>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.reset_tokens.iter().find(|t| t.token == token).cloned())
    }

    async fn delete_reset_token(&self, token: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        let before = tables.reset_tokens.len();
        tables.reset_tokens.retain(|t| t.token != token);
        Ok(tables.reset_tokens.len() < before)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_details(&self, user_id: Uuid) -> Result<Option<Details>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.details.iter().find(|d| d.user_id == user_id).cloned())
    }

    async fn upsert_details(&self, user_id: Uuid, fields: &DetailsFields) -> Result<Details, AppError> {
        let mut tables = self.tables.lock().await;
        let existing = tables.details.iter().position(|d| d.user_id == user_id);
        let index = match existing {
            Some(index) => index,
            None => {
                tables.details.push(Details {
                    id: Uuid::new_v4(),
                    user_id,
                    first_name: None,
                    last_name: None,
                    bio: None,
                    phone: None,
                    image: None,
                    updated_at: Utc::now(),
                });
                tables.details.len() - 1
            }
        };

        let details = &mut tables.details[index];
        details.first_name = fields.first_name.clone();
        details.last_name = fields.last_name.clone();
        details.bio = fields.bio.clone();
        details.phone = fields.phone.clone();
        details.image = fields.image.clone();
        details.updated_at = Utc::now();
        Ok(details.clone())
    }

    async fn ensure_details(&self, user_id: Uuid) -> Result<Uuid, AppError> {
        let mut tables = self.tables.lock().await;
        if let Some(id) = tables.details_id_of(user_id) {
            return Ok(id);
        }

        let id = Uuid::new_v4();
        tables.details.push(Details {
            id,
            user_id,
            first_name: None,
            last_name: None,
            bio: None,
            phone: None,
            image: None,
            updated_at: Utc::now(),
        });
        Ok(id)
    }

    async fn replace_paintings(
        &self,
        details_id: Uuid,
        paintings: &[PaintingFields],
    ) -> Result<Vec<Painting>, AppError> {
        let mut tables = self.tables.lock().await;
        tables.paintings.retain(|p| p.details_id != details_id);

        let saved: Vec<Painting> = paintings
            .iter()
            .enumerate()
            .map(|(position, p)| Painting {
                id: Uuid::new_v4(),
                details_id,
                title: p.title.clone(),
                content: p.content.clone(),
                position: position as i32,
            })
            .collect();
        tables.paintings.extend(saved.iter().cloned());
        Ok(saved)
    }

    async fn list_paintings(&self, user_id: Uuid) -> Result<Vec<Painting>, AppError> {
        let tables = self.tables.lock().await;
        let Some(details_id) = tables.details_id_of(user_id) else {
            return Ok(Vec::new());
        };
        let mut paintings: Vec<Painting> = tables
            .paintings
            .iter()
            .filter(|p| p.details_id == details_id)
            .cloned()
            .collect();
        paintings.sort_by_key(|p| p.position);
        Ok(paintings)
    }

    async fn list_experience(&self, user_id: Uuid, visible_only: bool) -> Result<Vec<Experience>, AppError> {
        let tables = self.tables.lock().await;
        let mut experience: Vec<Experience> = tables
            .experience
            .iter()
            .filter(|e| e.user_id == user_id && (e.visible || !visible_only))
            .cloned()
            .collect();
        experience.sort_by(|a, b| {
            b.start_date
                .cmp(&a.start_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(experience)
    }

    async fn insert_experience(&self, user_id: Uuid, fields: &ExperienceFields) -> Result<Experience, AppError> {
        let experience = Experience {
            id: Uuid::new_v4(),
            user_id,
            company: fields.company.clone(),
            role: fields.role.clone(),
            description: fields.description.clone(),
            start_date: fields.start_date,
            end_date: fields.end_date,
            visible: fields.visible.unwrap_or(true),
            created_at: Utc::now(),
        };
        self.tables.lock().await.experience.push(experience.clone());
        Ok(experience)
    }

    async fn update_experience(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: &ExperienceFields,
    ) -> Result<Option<Experience>, AppError> {
        let mut tables = self.tables.lock().await;
        let Some(row) = tables
            .experience
            .iter_mut()
            .find(|e| e.id == id && e.user_id == user_id)
        else {
            return Ok(None);
        };

        row.company = fields.company.clone();
        row.role = fields.role.clone();
        row.description = fields.description.clone();
        row.start_date = fields.start_date;
        row.end_date = fields.end_date;
        if let Some(visible) = fields.visible {
            row.visible = visible;
        }
        Ok(Some(row.clone()))
    }

    async fn set_experience_visibility(
        &self,
        user_id: Uuid,
        id: Uuid,
        visible: bool,
    ) -> Result<Option<Experience>, AppError> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .experience
            .iter_mut()
            .find(|e| e.id == id && e.user_id == user_id)
            .map(|row| {
                row.visible = visible;
                row.clone()
            }))
    }

    async fn delete_experience(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        let before = tables.experience.len();
        tables
            .experience
            .retain(|e| !(e.id == id && e.user_id == user_id));
        Ok(tables.experience.len() < before)
    }

    async fn list_projects(&self, user_id: Uuid) -> Result<Vec<Project>, AppError> {
        let tables = self.tables.lock().await;
        let details_id = tables.details_id_of(user_id);
        Ok(tables
            .projects
            .iter()
            .filter(|p| Some(p.details_id) == details_id)
            .cloned()
            .collect())
    }

    async fn insert_project(&self, details_id: Uuid, fields: &ProjectFields) -> Result<Project, AppError> {
        let project = Project {
            id: Uuid::new_v4(),
            details_id,
            title: fields.title.clone(),
            content: fields.content.clone(),
            url: fields.url.clone(),
            created_at: Utc::now(),
        };
        self.tables.lock().await.projects.push(project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: &ProjectFields,
    ) -> Result<Option<Project>, AppError> {
        let mut tables = self.tables.lock().await;
        let details_id = tables.details_id_of(user_id);
        Ok(tables
            .projects
            .iter_mut()
            .find(|p| p.id == id && Some(p.details_id) == details_id)
            .map(|row| {
                row.title = fields.title.clone();
                row.content = fields.content.clone();
                row.url = fields.url.clone();
                row.clone()
            }))
    }

    async fn delete_project(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        let details_id = tables.details_id_of(user_id);
        let before = tables.projects.len();
        tables
            .projects
            .retain(|p| !(p.id == id && Some(p.details_id) == details_id));
        Ok(tables.projects.len() < before)
    }

    async fn list_certifications(&self, user_id: Uuid) -> Result<Vec<Certification>, AppError> {
        let tables = self.tables.lock().await;
        let details_id = tables.details_id_of(user_id);
        let mut certifications: Vec<Certification> = tables
            .certifications
            .iter()
            .filter(|c| Some(c.details_id) == details_id)
            .cloned()
            .collect();
        certifications.sort_by(|a, b| b.date_awarded.cmp(&a.date_awarded));
        Ok(certifications)
    }

    async fn insert_certification(
        &self,
        details_id: Uuid,
        fields: &CertificationFields,
        file: &CertificationFile,
    ) -> Result<Certification, AppError> {
        let certification = Certification {
            id: Uuid::new_v4(),
            details_id,
            title: fields.title.clone(),
            institution: fields.institution.clone(),
            date_awarded: fields.date_awarded,
            extracted_text: file.extracted_text.clone(),
            description: fields.description.clone(),
            file_url: Some(file.file_url.clone()),
            file_kind: Some(file.file_kind.clone()),
            created_at: Utc::now(),
        };
        self.tables
            .lock()
            .await
            .certifications
            .push(certification.clone());
        Ok(certification)
    }

    async fn update_certification(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: &CertificationFields,
    ) -> Result<Option<Certification>, AppError> {
        let mut tables = self.tables.lock().await;
        let details_id = tables.details_id_of(user_id);
        Ok(tables
            .certifications
            .iter_mut()
            .find(|c| c.id == id && Some(c.details_id) == details_id)
            .map(|row| {
                row.title = fields.title.clone();
                row.institution = fields.institution.clone();
                row.date_awarded = fields.date_awarded;
                row.description = fields.description.clone();
                row.clone()
            }))
    }

    async fn delete_certification(&self, user_id: Uuid, id: Uuid) -> Result<Option<Certification>, AppError> {
        let mut tables = self.tables.lock().await;
        let details_id = tables.details_id_of(user_id);
        let position = tables
            .certifications
            .iter()
            .position(|c| c.id == id && Some(c.details_id) == details_id);
        Ok(position.map(|i| tables.certifications.remove(i)))
    }

    async fn list_diplomas(&self, user_id: Uuid) -> Result<Vec<Diploma>, AppError> {
        let tables = self.tables.lock().await;
        let details_id = tables.details_id_of(user_id);
        let mut diplomas: Vec<Diploma> = tables
            .diplomas
            .iter()
            .filter(|d| Some(d.details_id) == details_id)
            .cloned()
            .collect();
        diplomas.sort_by(|a, b| b.date_awarded.cmp(&a.date_awarded));
        Ok(diplomas)
    }

    async fn insert_diploma(
        &self,
        details_id: Uuid,
        fields: &DiplomaFields,
        file_url: &str,
        file_kind: &str,
    ) -> Result<Diploma, AppError> {
        let diploma = Diploma {
            id: Uuid::new_v4(),
            details_id,
            degree: fields.degree.clone(),
            field_of_study: fields.field_of_study.clone(),
            institution: fields.institution.clone(),
            date_awarded: fields.date_awarded,
            file_url: file_url.to_string(),
            file_kind: file_kind.to_string(),
            created_at: Utc::now(),
        };
        self.tables.lock().await.diplomas.push(diploma.clone());
        Ok(diploma)
    }

    async fn update_diploma(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: &DiplomaFields,
    ) -> Result<Option<Diploma>, AppError> {
        let mut tables = self.tables.lock().await;
        let details_id = tables.details_id_of(user_id);
        Ok(tables
            .diplomas
            .iter_mut()
            .find(|d| d.id == id && Some(d.details_id) == details_id)
            .map(|row| {
                row.degree = fields.degree.clone();
                row.field_of_study = fields.field_of_study.clone();
                row.institution = fields.institution.clone();
                row.date_awarded = fields.date_awarded;
                row.clone()
            }))
    }

    async fn delete_diploma(&self, user_id: Uuid, id: Uuid) -> Result<Option<Diploma>, AppError> {
        let mut tables = self.tables.lock().await;
        let details_id = tables.details_id_of(user_id);
        let position = tables
            .diplomas
            .iter()
            .position(|d| d.id == id && Some(d.details_id) == details_id);
        Ok(position.map(|i| tables.diplomas.remove(i)))
    }

    async fn owns_media(&self, user_id: Uuid, url: &str) -> Result<bool, AppError> {
        let tables = self.tables.lock().await;
        let Some(details) = tables.details.iter().find(|d| d.user_id == user_id) else {
            return Ok(false);
        };

        Ok(details.image.as_deref() == Some(url)
            || tables
                .certifications
                .iter()
                .any(|c| c.details_id == details.id && c.file_url.as_deref() == Some(url))
            || tables
                .diplomas
                .iter()
                .any(|d| d.details_id == details.id && d.file_url == url))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
