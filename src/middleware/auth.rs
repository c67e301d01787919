use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{app_state::AppState, user::AuthUser},
    utils::jwt::verify_token,
};

/// Extract and verify the bearer credential from the Authorization header.
///
/// A missing header is reported separately from a header that does not
/// verify; both are 401s.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Get Authorization header
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AppError::MissingCredential)?
        .to_str()
        .map_err(|_| AppError::InvalidCredential)?;

    // Extract token
    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::InvalidCredential)?;

    let claims = verify_token(token, &state.config.jwt_secret)?;

    // Parse user_id from claims.sub
    let id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidCredential)?;

    // Add the caller's identity to request extensions
    req.extensions_mut().insert(AuthUser {
        id,
        email: claims.email,
    });

    Ok(next.run(req).await)
}
