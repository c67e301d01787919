use axum::{Extension, Json, extract::State};
use validator::Validate;

use crate::{
    api::extract::AppJson,
    errors::AppError,
    models::{
        app_state::AppState,
        details::{DetailsFields, DetailsResponse, PaintingFields, PaintingsResponse, SaveDetailsRequest},
        user::AuthUser,
    },
    utils::validation::{clean, clean_opt},
};

/// Get the caller's details with their paintings
#[utoipa::path(
    get,
    path = "/api/v1/details",
    responses(
        (status = 200, description = "Details and paintings", body = DetailsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No details saved yet"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Details",
    security(("bearer" = []))
)]
pub async fn get_details(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DetailsResponse>, AppError> {
    let details = state
        .store
        .find_details(user.id)
        .await?
        .ok_or(AppError::NotFound)?;
    let paintings = state.store.list_paintings(user.id).await?;

    Ok(Json(DetailsResponse { details, paintings }))
}

/// Create or replace the caller's details
///
/// The submitted paintings become the complete set.
#[utoipa::path(
    put,
    path = "/api/v1/details",
    request_body = SaveDetailsRequest,
    responses(
        (status = 200, description = "Details saved", body = DetailsResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Details",
    security(("bearer" = []))
)]
pub async fn save_details(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(payload): AppJson<SaveDetailsRequest>,
) -> Result<Json<DetailsResponse>, AppError> {
    payload.validate()?;

    let fields = DetailsFields {
        first_name: clean_opt(payload.first_name.as_deref()),
        last_name: clean_opt(payload.last_name.as_deref()),
        bio: clean_opt(payload.bio.as_deref()),
        phone: clean_opt(payload.phone.as_deref()),
        image: clean_opt(payload.image.as_deref()),
    };
    let paintings: Vec<PaintingFields> = payload
        .paintings
        .iter()
        .map(|p| PaintingFields {
            title: clean(&p.title),
            content: clean(&p.content),
        })
        .collect();

    let details = state.store.upsert_details(user.id, &fields).await?;
    let paintings = state.store.replace_paintings(details.id, &paintings).await?;

    tracing::info!(
        "Saved details for user {} with {} paintings",
        user.id,
        paintings.len()
    );

    Ok(Json(DetailsResponse { details, paintings }))
}

/// List the caller's paintings in display order
#[utoipa::path(
    get,
    path = "/api/v1/paintings",
    responses(
        (status = 200, description = "Paintings", body = PaintingsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Details",
    security(("bearer" = []))
)]
pub async fn list_paintings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<PaintingsResponse>, AppError> {
    let paintings = state.store.list_paintings(user.id).await?;
    Ok(Json(PaintingsResponse { paintings }))
}
