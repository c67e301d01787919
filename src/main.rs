mod api;
mod config;
mod errors;
mod middleware;
mod models;
mod routes;
mod store;
mod utils;
mod visits;

#[cfg(test)]
mod test_support;

use shuttle_axum::ShuttleAxum;
use shuttle_runtime::{CustomError, SecretStore};
use sqlx::postgres::PgPoolOptions;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::config::Config;
use crate::models::app_state::AppState;

/// Registers the bearer JWT scheme the protected paths refer to.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::auth::forgot_password,
        crate::api::auth::reset_password,
        crate::api::auth::me,
        crate::api::details::get_details,
        crate::api::details::save_details,
        crate::api::details::list_paintings,
        crate::api::experience::list_experience,
        crate::api::experience::create_experience,
        crate::api::experience::update_experience,
        crate::api::experience::set_visibility,
        crate::api::experience::delete_experience,
        crate::api::projects::list_projects,
        crate::api::projects::create_project,
        crate::api::projects::update_project,
        crate::api::projects::delete_project,
        crate::api::certifications::list_certifications,
        crate::api::certifications::upload_certification,
        crate::api::certifications::update_certification,
        crate::api::certifications::delete_certification,
        crate::api::diplomas::list_diplomas,
        crate::api::diplomas::upload_diploma,
        crate::api::diplomas::update_diploma,
        crate::api::diplomas::delete_diploma,
        crate::api::avatar::upload_avatar,
        crate::api::public::get_public_profile,
        crate::api::public::record_visit,
        crate::api::public::get_visits,
    ),
    components(
        schemas(
            crate::models::user::RegisterRequest,
            crate::models::user::RegisterResponse,
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            crate::models::user::ForgotPasswordRequest,
            crate::models::user::ResetPasswordRequest,
            crate::models::user::MessageResponse,
            crate::models::user::AuthUser,
            crate::models::details::Details,
            crate::models::details::Painting,
            crate::models::details::PaintingInput,
            crate::models::details::SaveDetailsRequest,
            crate::models::details::DetailsResponse,
            crate::models::details::PaintingsResponse,
            crate::models::experience::Experience,
            crate::models::experience::ExperienceRequest,
            crate::models::experience::VisibilityRequest,
            crate::models::experience::ExperienceListResponse,
            crate::models::project::Project,
            crate::models::project::ProjectRequest,
            crate::models::project::ProjectListResponse,
            crate::models::certification::Certification,
            crate::models::certification::CertificationRequest,
            crate::models::certification::CertificationUpload,
            crate::models::certification::CertificationListResponse,
            crate::models::diploma::Diploma,
            crate::models::diploma::DiplomaRequest,
            crate::models::diploma::DiplomaUpload,
            crate::models::diploma::DiplomaListResponse,
            crate::models::public::PublicUser,
            crate::models::public::PublicProfile,
            crate::models::public::VisitsResponse,
            crate::models::public::AvatarResponse,
            crate::api::avatar::AvatarUpload,
            crate::utils::media::FileKind,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Authentication", description = "Registration, login and password reset"),
        (name = "Details", description = "Profile details and paintings"),
        (name = "Experience", description = "Work history with public visibility"),
        (name = "Projects", description = "Portfolio projects"),
        (name = "Certifications", description = "Certificates with extracted text"),
        (name = "Diplomas", description = "Diploma scans"),
        (name = "Media", description = "Avatar uploads"),
        (name = "Public", description = "Unauthenticated profile view and visit counts")
    ),
    info(
        title = "Folio API",
        version = "0.1.0",
        description = "Personal portfolio API",
        contact(
            name = "Folio Team",
            email = "support@folio.dev"
        )
    )
)]
pub struct ApiDoc;

#[shuttle_runtime::main]
async fn main(
    #[shuttle_shared_db::Postgres] conn_str: String,
    #[shuttle_runtime::Secrets] secrets: SecretStore,
) -> ShuttleAxum {
    let config = Config::from_lookup(|key| secrets.get(key)).map_err(CustomError::new)?;

    let db = PgPoolOptions::new()
        .max_connections(5)
        .connect(&conn_str)
        .await
        .map_err(CustomError::new)?;

    sqlx::migrate!()
        .run(&db)
        .await
        .map_err(CustomError::new)?;

    tracing::info!(
        "Starting Folio in {:?} mode",
        config.environment
    );

    let state = AppState::new(db, config);

    Ok(routes::app(state).into())
}
