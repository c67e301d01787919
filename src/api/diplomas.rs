use axum::{
    Extension, Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::{
        extract::{AppJson, AppPath},
        upload::{UploadForm, discard_previous},
    },
    errors::AppError,
    models::{
        app_state::AppState,
        diploma::{Diploma, DiplomaFields, DiplomaListResponse, DiplomaRequest, DiplomaUpload},
        user::AuthUser,
    },
    utils::{
        media::{DIPLOMAS_FOLDER, delete_best_effort},
        validation::{clean, parse_date},
    },
};

fn to_fields(payload: &DiplomaRequest) -> Result<DiplomaFields, AppError> {
    payload.validate()?;

    Ok(DiplomaFields {
        degree: clean(&payload.degree),
        field_of_study: clean(&payload.field_of_study),
        institution: clean(&payload.institution),
        date_awarded: parse_date("date_awarded", &payload.date_awarded)?,
    })
}

/// List the caller's diplomas
#[utoipa::path(
    get,
    path = "/api/v1/diplomas",
    responses(
        (status = 200, description = "Diplomas, newest award first", body = DiplomaListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Diplomas",
    security(("bearer" = []))
)]
pub async fn list_diplomas(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DiplomaListResponse>, AppError> {
    let diplomas = state.store.list_diplomas(user.id).await?;
    let count = diplomas.len();

    Ok(Json(DiplomaListResponse { diplomas, count }))
}

/// Upload a diploma scan
#[utoipa::path(
    post,
    path = "/api/v1/diplomas",
    request_body(content = DiplomaUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Diploma created", body = Diploma),
        (status = 400, description = "Invalid metadata or file"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Media host failure")
    ),
    tag = "Diplomas",
    security(("bearer" = []))
)]
pub async fn upload_diploma(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Diploma>), AppError> {
    let mut form = UploadForm::read(multipart).await?;

    let fields = to_fields(&DiplomaRequest {
        degree: form.text("degree"),
        field_of_study: form.text("field_of_study"),
        institution: form.text("institution"),
        date_awarded: form.text("date_awarded"),
    })?;
    let file = form.take_file()?;

    discard_previous(&state, user.id, form.optional("previous_file_url").as_deref()).await?;

    let uploaded = state.media.upload(&file, DIPLOMAS_FOLDER).await?;

    let details_id = state.store.ensure_details(user.id).await?;
    let diploma = state
        .store
        .insert_diploma(details_id, &fields, &uploaded.url, file.kind.as_str())
        .await?;

    tracing::info!("User {} uploaded diploma {}", user.id, diploma.id);

    Ok((StatusCode::CREATED, Json(diploma)))
}

/// Update diploma metadata
#[utoipa::path(
    put,
    path = "/api/v1/diplomas/{id}",
    params(
        ("id" = Uuid, Path, description = "Diploma ID")
    ),
    request_body = DiplomaRequest,
    responses(
        (status = 200, description = "Diploma updated", body = Diploma),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Diploma not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Diplomas",
    security(("bearer" = []))
)]
pub async fn update_diploma(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<DiplomaRequest>,
) -> Result<Json<Diploma>, AppError> {
    let fields = to_fields(&payload)?;
    let diploma = state
        .store
        .update_diploma(user.id, id, &fields)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(diploma))
}

/// Delete a diploma and, best effort, its stored file
#[utoipa::path(
    delete,
    path = "/api/v1/diplomas/{id}",
    params(
        ("id" = Uuid, Path, description = "Diploma ID")
    ),
    responses(
        (status = 204, description = "Diploma deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Diploma not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Diplomas",
    security(("bearer" = []))
)]
pub async fn delete_diploma(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    let removed = state
        .store
        .delete_diploma(user.id, id)
        .await?
        .ok_or(AppError::NotFound)?;

    delete_best_effort(state.media.as_ref(), Some(removed.file_url.as_str())).await;

    Ok(StatusCode::NO_CONTENT)
}
