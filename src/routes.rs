use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{Method, header},
    middleware,
    routing::{get, patch, post, put},
};
use serde_json::{Value, json};
use tower_http::{
    LatencyUnit,
    cors::{Any, CorsLayer},
    sensitive_headers::SetSensitiveHeadersLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    ApiDoc,
    api::{
        auth, avatar, certifications, details, diplomas, experience, projects, public,
    },
    middleware::auth::auth_middleware,
    models::app_state::AppState,
};

/// Upper bound on request bodies for the authenticated API, uploads included.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    // Test database connection
    match state.store.ping().await {
        Ok(()) => Json(json!({
            "status": "healthy",
            "database": "connected"
        })),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Json(json!({
                "status": "unhealthy",
                "database": "disconnected"
            }))
        }
    }
}

/// Routes that require a bearer credential.
fn protected(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/me", get(auth::me))
        // Details and paintings
        .route(
            "/api/v1/details",
            get(details::get_details).put(details::save_details),
        )
        .route("/api/v1/paintings", get(details::list_paintings))
        // Experience
        .route(
            "/api/v1/experience",
            get(experience::list_experience).post(experience::create_experience),
        )
        .route(
            "/api/v1/experience/{id}",
            put(experience::update_experience).delete(experience::delete_experience),
        )
        .route(
            "/api/v1/experience/{id}/visibility",
            patch(experience::set_visibility),
        )
        // Projects
        .route(
            "/api/v1/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/api/v1/projects/{id}",
            put(projects::update_project).delete(projects::delete_project),
        )
        // Documents
        .route(
            "/api/v1/certifications",
            get(certifications::list_certifications).post(certifications::upload_certification),
        )
        .route(
            "/api/v1/certifications/{id}",
            put(certifications::update_certification)
                .delete(certifications::delete_certification),
        )
        .route(
            "/api/v1/diplomas",
            get(diplomas::list_diplomas).post(diplomas::upload_diploma),
        )
        .route(
            "/api/v1/diplomas/{id}",
            put(diplomas::update_diploma).delete(diplomas::delete_diploma),
        )
        .route("/api/v1/avatar", post(avatar::upload_avatar))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.uploads_dir);

    Router::new()
        .route("/api/health", get(health_check))
        // Authentication routes
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/forgot-password", post(auth::forgot_password))
        .route("/api/v1/auth/reset-password", post(auth::reset_password))
        // Public profile routes
        .route("/api/v1/public/{user_id}", get(public::get_public_profile))
        .route(
            "/api/v1/public/{user_id}/visits",
            get(public::get_visits).post(public::record_visit),
        )
        .merge(protected(state.clone()))
        // Swagger UI
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .nest_service(avatar::UPLOADS_ROUTE, uploads)
        .with_state(state)
        // Remove sensitive headers from trace
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().latency_unit(LatencyUnit::Micros)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers(Any),
        )
}
