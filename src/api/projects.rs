use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::extract::{AppJson, AppPath},
    errors::AppError,
    models::{
        app_state::AppState,
        project::{Project, ProjectFields, ProjectListResponse, ProjectRequest},
        user::AuthUser,
    },
    utils::validation::{clean, clean_opt},
};

fn to_fields(payload: &ProjectRequest) -> Result<ProjectFields, AppError> {
    payload.validate()?;

    Ok(ProjectFields {
        title: clean(&payload.title),
        content: clean_opt(payload.content.as_deref()),
        url: clean(&payload.url),
    })
}

/// List the caller's projects
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    responses(
        (status = 200, description = "Projects, oldest first", body = ProjectListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Projects",
    security(("bearer" = []))
)]
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProjectListResponse>, AppError> {
    let projects = state.store.list_projects(user.id).await?;
    let count = projects.len();

    Ok(Json(ProjectListResponse { projects, count }))
}

/// Add a project
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = ProjectRequest,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Projects",
    security(("bearer" = []))
)]
pub async fn create_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(payload): AppJson<ProjectRequest>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    let fields = to_fields(&payload)?;

    let details_id = state.store.ensure_details(user.id).await?;
    let project = state.store.insert_project(details_id, &fields).await?;

    tracing::info!("User {} added project {}", user.id, project.id);

    Ok((StatusCode::CREATED, Json(project)))
}

/// Replace a project
#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}",
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    request_body = ProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = Project),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Projects",
    security(("bearer" = []))
)]
pub async fn update_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<ProjectRequest>,
) -> Result<Json<Project>, AppError> {
    let fields = to_fields(&payload)?;
    let project = state
        .store
        .update_project(user.id, id, &fields)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(project))
}

/// Delete a project
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Projects",
    security(("bearer" = []))
)]
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_project(user.id, id).await? {
        return Err(AppError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}
