use axum::{Json, extract::State};
use uuid::Uuid;

use crate::{
    api::extract::AppPath,
    errors::AppError,
    models::{
        app_state::AppState,
        public::{PublicProfile, PublicUser, VisitsResponse},
    },
};

/// Public profile of a user
///
/// Hidden experience entries are left out.
#[utoipa::path(
    get,
    path = "/api/v1/public/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Public profile", body = PublicProfile),
        (status = 404, description = "No such user or no profile details"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Public"
)]
pub async fn get_public_profile(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<Json<PublicProfile>, AppError> {
    let user = state
        .store
        .find_user_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let details = state
        .store
        .find_details(user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let paintings = state.store.list_paintings(user_id).await?;
    let projects = state.store.list_projects(user_id).await?;
    let certifications = state.store.list_certifications(user_id).await?;
    let diplomas = state.store.list_diplomas(user_id).await?;
    let experience = state.store.list_experience(user_id, true).await?;

    Ok(Json(PublicProfile {
        user: PublicUser {
            id: user.id,
            name: user.name,
        },
        details,
        paintings,
        projects,
        certifications,
        diplomas,
        experience,
    }))
}

/// Count a view of a public profile
#[utoipa::path(
    post,
    path = "/api/v1/public/{user_id}/visits",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Visit counted", body = VisitsResponse),
        (status = 404, description = "No such user"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Public"
)]
pub async fn record_visit(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<Json<VisitsResponse>, AppError> {
    // Only real profiles take a slot in the bounded counter
    state
        .store
        .find_user_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let visits = state.visits.record(user_id).await;

    Ok(Json(VisitsResponse { user_id, visits }))
}

/// Current view count of a public profile
#[utoipa::path(
    get,
    path = "/api/v1/public/{user_id}/visits",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Visits since process start", body = VisitsResponse),
        (status = 404, description = "Malformed user id")
    ),
    tag = "Public"
)]
pub async fn get_visits(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<Json<VisitsResponse>, AppError> {
    let visits = state.visits.get(user_id).await;

    Ok(Json(VisitsResponse { user_id, visits }))
}
