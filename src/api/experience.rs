use std::borrow::Cow;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    api::extract::{AppJson, AppPath},
    errors::AppError,
    models::{
        app_state::AppState,
        experience::{
            Experience, ExperienceFields, ExperienceListResponse, ExperienceRequest,
            VisibilityRequest,
        },
        user::AuthUser,
    },
    utils::validation::{clean, clean_opt, parse_date},
};

/// Validate a request and turn it into storable columns.
fn to_fields(payload: &ExperienceRequest) -> Result<ExperienceFields, AppError> {
    payload.validate()?;

    let start_date = parse_date("start_date", &payload.start_date)?;
    let end_date = payload
        .end_date
        .as_deref()
        .map(|d| parse_date("end_date", d))
        .transpose()?;

    if end_date.is_some_and(|end| end < start_date) {
        let mut errors = ValidationErrors::new();
        errors.add(
            "end_date",
            ValidationError::new("range")
                .with_message(Cow::from("must not be before start_date")),
        );
        return Err(AppError::Validation(errors));
    }

    Ok(ExperienceFields {
        company: clean(&payload.company),
        role: clean(&payload.role),
        description: clean_opt(payload.description.as_deref()),
        start_date,
        end_date,
        visible: payload.visible,
    })
}

/// List the caller's experience, newest start date first
#[utoipa::path(
    get,
    path = "/api/v1/experience",
    responses(
        (status = 200, description = "All experience entries, hidden ones included", body = ExperienceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Experience",
    security(("bearer" = []))
)]
pub async fn list_experience(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ExperienceListResponse>, AppError> {
    let experience = state.store.list_experience(user.id, false).await?;
    let count = experience.len();

    Ok(Json(ExperienceListResponse { experience, count }))
}

/// Add an experience entry
#[utoipa::path(
    post,
    path = "/api/v1/experience",
    request_body = ExperienceRequest,
    responses(
        (status = 201, description = "Experience created", body = Experience),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Experience",
    security(("bearer" = []))
)]
pub async fn create_experience(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(payload): AppJson<ExperienceRequest>,
) -> Result<(StatusCode, Json<Experience>), AppError> {
    let fields = to_fields(&payload)?;
    let experience = state.store.insert_experience(user.id, &fields).await?;

    tracing::info!("User {} added experience {}", user.id, experience.id);

    Ok((StatusCode::CREATED, Json(experience)))
}

/// Replace an experience entry
#[utoipa::path(
    put,
    path = "/api/v1/experience/{id}",
    params(
        ("id" = Uuid, Path, description = "Experience ID")
    ),
    request_body = ExperienceRequest,
    responses(
        (status = 200, description = "Experience updated", body = Experience),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Experience not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Experience",
    security(("bearer" = []))
)]
pub async fn update_experience(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<ExperienceRequest>,
) -> Result<Json<Experience>, AppError> {
    let fields = to_fields(&payload)?;
    let experience = state
        .store
        .update_experience(user.id, id, &fields)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(experience))
}

/// Show or hide an experience entry on the public profile
#[utoipa::path(
    patch,
    path = "/api/v1/experience/{id}/visibility",
    params(
        ("id" = Uuid, Path, description = "Experience ID")
    ),
    request_body = VisibilityRequest,
    responses(
        (status = 200, description = "Visibility updated", body = Experience),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Experience not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Experience",
    security(("bearer" = []))
)]
pub async fn set_visibility(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<VisibilityRequest>,
) -> Result<Json<Experience>, AppError> {
    let experience = state
        .store
        .set_experience_visibility(user.id, id, payload.visible)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(experience))
}

/// Delete an experience entry
#[utoipa::path(
    delete,
    path = "/api/v1/experience/{id}",
    params(
        ("id" = Uuid, Path, description = "Experience ID")
    ),
    responses(
        (status = 204, description = "Experience deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Experience not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Experience",
    security(("bearer" = []))
)]
pub async fn delete_experience(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_experience(user.id, id).await? {
        return Err(AppError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}
