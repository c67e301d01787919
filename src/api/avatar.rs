use std::borrow::Cow;

use axum::{
    Extension, Json,
    extract::{Multipart, State},
};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    api::upload::{FILE_FIELD, UploadForm},
    errors::AppError,
    models::{app_state::AppState, public::AvatarResponse, user::AuthUser},
    utils::media::{AVATARS_FOLDER, FileKind, MediaFile},
};

/// Public path the uploads directory is served under.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Multipart body for an avatar upload
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct AvatarUpload {
    /// Image file
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Upload an avatar image
///
/// Stored on local disk in development, on the media host everywhere else.
#[utoipa::path(
    post,
    path = "/api/v1/avatar",
    request_body(content = AvatarUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Avatar stored", body = AvatarResponse),
        (status = 400, description = "Missing file or not an image"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Storage failure")
    ),
    tag = "Media",
    security(("bearer" = []))
)]
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<Json<AvatarResponse>, AppError> {
    let file = UploadForm::read(multipart).await?.take_file()?;

    if file.kind != FileKind::Image {
        let mut errors = ValidationErrors::new();
        errors.add(
            FILE_FIELD,
            ValidationError::new("file_kind").with_message(Cow::from("must be an image")),
        );
        return Err(AppError::Validation(errors));
    }

    let image_url = if state.config.is_development() {
        save_locally(&state, &file).await?
    } else {
        state.media.upload(&file, AVATARS_FOLDER).await?.url
    };

    tracing::info!("User {} uploaded avatar {}", user.id, image_url);

    Ok(Json(AvatarResponse { image_url }))
}

async fn save_locally(state: &AppState, file: &MediaFile) -> Result<String, AppError> {
    let dir = &state.config.uploads_dir;
    let name = format!("{}.{}", Uuid::new_v4(), file.extension());

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create uploads dir: {}", e)))?;
    tokio::fs::write(dir.join(&name), &file.bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to write upload: {}", e)))?;

    Ok(format!("{}/{}", UPLOADS_ROUTE, name))
}
