//! PostgreSQL implementation of the stores.

use async_trait::async_trait;
use sqlx::PgPool;
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

const USER_COLUMNS: &str = "id, email, password_hash, name, gender, created_at";
const DETAILS_COLUMNS: &str = "id, user_id, first_name, last_name, bio, phone, image, updated_at";
const EXPERIENCE_COLUMNS: &str =
    "id, user_id, company, role, description, start_date, end_date, visible, created_at";
const PROJECT_COLUMNS: &str = "id, details_id, title, content, url, created_at";
const CERTIFICATION_COLUMNS: &str = "id, details_id, title, institution, date_awarded, \
     extracted_text, description, file_url, file_kind, created_at";
const DIPLOMA_COLUMNS: &str = "id, details_id, degree, field_of_study, institution, \
     date_awarded, file_url, file_kind, created_at";

/// Restricts a details child to rows of the caller's profile.
const OWNED_BY_USER: &str = "details_id IN (SELECT id FROM details WHERE user_id = $2)";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        let inserted = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, password_hash, name, gender)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.gender)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn insert_reset_token(&self, token: &ResetToken) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&token.token)
        .bind(token.user_id)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_reset_token(&self, token: &str) -> Result<Option<ResetToken>, AppError> {
        let token = sqlx::query_as::<_, ResetToken>(
            "SELECT token, user_id, expires_at FROM password_reset_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    async fn delete_reset_token(&self, token: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn find_details(&self, user_id: Uuid) -> Result<Option<Details>, AppError> {
        let details = sqlx::query_as::<_, Details>(&format!(
            "SELECT {DETAILS_COLUMNS} FROM details WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(details)
    }

    async fn upsert_details(&self, user_id: Uuid, fields: &DetailsFields) -> Result<Details, AppError> {
        let details = sqlx::query_as::<_, Details>(&format!(
            r#"
            INSERT INTO details (id, user_id, first_name, last_name, bio, phone, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                bio = EXCLUDED.bio,
                phone = EXCLUDED.phone,
                image = EXCLUDED.image,
                updated_at = NOW()
            RETURNING {DETAILS_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.bio)
        .bind(&fields.phone)
        .bind(&fields.image)
        .fetch_one(&self.pool)
        .await?;

        Ok(details)
    }

    async fn ensure_details(&self, user_id: Uuid) -> Result<Uuid, AppError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO details (id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn replace_paintings(
        &self,
        details_id: Uuid,
        paintings: &[PaintingFields],
    ) -> Result<Vec<Painting>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM paintings WHERE details_id = $1")
            .bind(details_id)
            .execute(&mut *tx)
            .await?;

        let mut saved = Vec::with_capacity(paintings.len());
        for (position, painting) in paintings.iter().enumerate() {
            let row = sqlx::query_as::<_, Painting>(
                r#"
                INSERT INTO paintings (id, details_id, title, content, position)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, details_id, title, content, position
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(details_id)
            .bind(&painting.title)
            .bind(&painting.content)
            .bind(position as i32)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(row);
        }

        tx.commit().await?;
        Ok(saved)
    }

    async fn list_paintings(&self, user_id: Uuid) -> Result<Vec<Painting>, AppError> {
        let paintings = sqlx::query_as::<_, Painting>(
            r#"
            SELECT p.id, p.details_id, p.title, p.content, p.position
            FROM paintings p
            INNER JOIN details d ON d.id = p.details_id
            WHERE d.user_id = $1
            ORDER BY p.position ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(paintings)
    }

    async fn list_experience(&self, user_id: Uuid, visible_only: bool) -> Result<Vec<Experience>, AppError> {
        let experience = sqlx::query_as::<_, Experience>(&format!(
            r#"
            SELECT {EXPERIENCE_COLUMNS}
            FROM experience
            WHERE user_id = $1 AND (visible OR NOT $2)
            ORDER BY start_date DESC, created_at DESC
            "#
        ))
        .bind(user_id)
        .bind(visible_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(experience)
    }

    async fn insert_experience(&self, user_id: Uuid, fields: &ExperienceFields) -> Result<Experience, AppError> {
        let experience = sqlx::query_as::<_, Experience>(&format!(
            r#"
            INSERT INTO experience (id, user_id, company, role, description, start_date, end_date, visible)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {EXPERIENCE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&fields.company)
        .bind(&fields.role)
        .bind(&fields.description)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.visible.unwrap_or(true))
        .fetch_one(&self.pool)
        .await?;

        Ok(experience)
    }

    async fn update_experience(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: &ExperienceFields,
    ) -> Result<Option<Experience>, AppError> {
        let experience = sqlx::query_as::<_, Experience>(&format!(
            r#"
            UPDATE experience
            SET company = $3, role = $4, description = $5, start_date = $6, end_date = $7, visible = COALESCE($8, visible)
            WHERE id = $1 AND user_id = $2
            RETURNING {EXPERIENCE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&fields.company)
        .bind(&fields.role)
        .bind(&fields.description)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.visible)
        .fetch_optional(&self.pool)
        .await?;

        Ok(experience)
    }

    async fn set_experience_visibility(
        &self,
        user_id: Uuid,
        id: Uuid,
        visible: bool,
    ) -> Result<Option<Experience>, AppError> {
        let experience = sqlx::query_as::<_, Experience>(&format!(
            r#"
            UPDATE experience SET visible = $3
            WHERE id = $1 AND user_id = $2
            RETURNING {EXPERIENCE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(visible)
        .fetch_optional(&self.pool)
        .await?;

        Ok(experience)
    }

    async fn delete_experience(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM experience WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_projects(&self, user_id: Uuid) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(&format!(
            r#"
            SELECT {PROJECT_COLUMNS} FROM projects
            WHERE details_id IN (SELECT id FROM details WHERE user_id = $1)
            ORDER BY created_at ASC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    async fn insert_project(&self, details_id: Uuid, fields: &ProjectFields) -> Result<Project, AppError> {
        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (id, details_id, title, content, url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(details_id)
        .bind(&fields.title)
        .bind(&fields.content)
        .bind(&fields.url)
        .fetch_one(&self.pool)
        .await?;

        Ok(project)
    }

    async fn update_project(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: &ProjectFields,
    ) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            UPDATE projects SET title = $3, content = $4, url = $5
            WHERE id = $1 AND {OWNED_BY_USER}
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&fields.title)
        .bind(&fields.content)
        .bind(&fields.url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    async fn delete_project(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(&format!("DELETE FROM projects WHERE id = $1 AND {OWNED_BY_USER}"))
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_certifications(&self, user_id: Uuid) -> Result<Vec<Certification>, AppError> {
        let certifications = sqlx::query_as::<_, Certification>(&format!(
            r#"
            SELECT {CERTIFICATION_COLUMNS} FROM certifications
            WHERE details_id IN (SELECT id FROM details WHERE user_id = $1)
            ORDER BY date_awarded DESC, created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(certifications)
    }

    async fn insert_certification(
        &self,
        details_id: Uuid,
        fields: &CertificationFields,
        file: &CertificationFile,
    ) -> Result<Certification, AppError> {
        let certification = sqlx::query_as::<_, Certification>(&format!(
            r#"
            INSERT INTO certifications
                (id, details_id, title, institution, date_awarded, extracted_text, description, file_url, file_kind)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {CERTIFICATION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(details_id)
        .bind(&fields.title)
        .bind(&fields.institution)
        .bind(fields.date_awarded)
        .bind(&file.extracted_text)
        .bind(&fields.description)
        .bind(&file.file_url)
        .bind(&file.file_kind)
        .fetch_one(&self.pool)
        .await?;

        Ok(certification)
    }

    async fn update_certification(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: &CertificationFields,
    ) -> Result<Option<Certification>, AppError> {
        let certification = sqlx::query_as::<_, Certification>(&format!(
            r#"
            UPDATE certifications
            SET title = $3, institution = $4, date_awarded = $5, description = $6
            WHERE id = $1 AND {OWNED_BY_USER}
            RETURNING {CERTIFICATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&fields.title)
        .bind(&fields.institution)
        .bind(fields.date_awarded)
        .bind(&fields.description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(certification)
    }

    async fn delete_certification(&self, user_id: Uuid, id: Uuid) -> Result<Option<Certification>, AppError> {
        let certification = sqlx::query_as::<_, Certification>(&format!(
            "DELETE FROM certifications WHERE id = $1 AND {OWNED_BY_USER} RETURNING {CERTIFICATION_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(certification)
    }

    async fn list_diplomas(&self, user_id: Uuid) -> Result<Vec<Diploma>, AppError> {
        let diplomas = sqlx::query_as::<_, Diploma>(&format!(
            r#"
            SELECT {DIPLOMA_COLUMNS} FROM diplomas
            WHERE details_id IN (SELECT id FROM details WHERE user_id = $1)
            ORDER BY date_awarded DESC, created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(diplomas)
    }

    async fn insert_diploma(
        &self,
        details_id: Uuid,
        fields: &DiplomaFields,
        file_url: &str,
        file_kind: &str,
    ) -> Result<Diploma, AppError> {
        let diploma = sqlx::query_as::<_, Diploma>(&format!(
            r#"
            INSERT INTO diplomas
                (id, details_id, degree, field_of_study, institution, date_awarded, file_url, file_kind)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {DIPLOMA_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(details_id)
        .bind(&fields.degree)
        .bind(&fields.field_of_study)
        .bind(&fields.institution)
        .bind(fields.date_awarded)
        .bind(file_url)
        .bind(file_kind)
        .fetch_one(&self.pool)
        .await?;

        Ok(diploma)
    }

    async fn update_diploma(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: &DiplomaFields,
    ) -> Result<Option<Diploma>, AppError> {
        let diploma = sqlx::query_as::<_, Diploma>(&format!(
            r#"
            UPDATE diplomas
            SET degree = $3, field_of_study = $4, institution = $5, date_awarded = $6
            WHERE id = $1 AND {OWNED_BY_USER}
            RETURNING {DIPLOMA_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&fields.degree)
        .bind(&fields.field_of_study)
        .bind(&fields.institution)
        .bind(fields.date_awarded)
        .fetch_optional(&self.pool)
        .await?;

        Ok(diploma)
    }

    async fn delete_diploma(&self, user_id: Uuid, id: Uuid) -> Result<Option<Diploma>, AppError> {
        let diploma = sqlx::query_as::<_, Diploma>(&format!(
            "DELETE FROM diplomas WHERE id = $1 AND {OWNED_BY_USER} RETURNING {DIPLOMA_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(diploma)
    }

    async fn owns_media(&self, user_id: Uuid, url: &str) -> Result<bool, AppError> {
        let owned = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM details d
                WHERE d.user_id = $1
                  AND (
                    d.image = $2
                    OR EXISTS (SELECT 1 FROM certifications c WHERE c.details_id = d.id AND c.file_url = $2)
                    OR EXISTS (SELECT 1 FROM diplomas p WHERE p.details_id = d.id AND p.file_url = $2)
                  )
            )
            "#,
        )
        .bind(user_id)
        .bind(url)
        .fetch_one(&self.pool)
        .await?;

        Ok(owned)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1 as health_check")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
