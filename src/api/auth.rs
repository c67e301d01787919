use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::{Duration, Utc};
use rand::RngCore;
use validator::Validate;

use crate::{
    api::extract::AppJson,
    errors::AppError,
    models::{
        app_state::AppState,
        user::{
            AuthUser, ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse,
            NewUser, RegisterRequest, RegisterResponse, ResetPasswordRequest, ResetToken,
            normalize_email,
        },
    },
    utils::{
        jwt::generate_token,
        password::{check_password_policy, hash_password, verify_password},
        validation::{clean, clean_opt},
    },
};

pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account exists for that email, a password reset link has been sent.";

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = RegisterResponse),
        (status = 400, description = "Invalid input, weak password or email already registered"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    // Validate input
    payload.validate()?;
    check_password_policy(&payload.password)?;

    let email = normalize_email(&payload.email);

    // Check if email already exists
    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::DuplicateEmail);
    }

    // Hash password
    let password_hash = hash_password(&payload.password)?;

    // Insert user; the unique index still guards a racing registration
    let user = state
        .store
        .insert_user(NewUser {
            email,
            password_hash,
            name: clean(&payload.name),
            gender: clean_opt(payload.gender.as_deref()),
        })
        .await?;

    tracing::info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.id,
            email: user.email,
            name: user.name,
            message: "Registration successful! You can now log in.".to_string(),
        }),
    ))
}

/// User login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    // Validate input
    payload.validate()?;

    // Unknown email and wrong password are indistinguishable to the caller
    let user = state
        .store
        .find_user_by_email(&normalize_email(&payload.email))
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let expiry_hours = state.config.jwt_expiry_hours;
    let token = generate_token(user.id, &user.email, &state.config.jwt_secret, expiry_hours)?;

    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: expiry_hours * 3600, // Convert to seconds
    }))
}

/// Request a password reset link
#[utoipa::path(
    post,
    path = "/api/v1/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Generic acknowledgement, sent whether or not the account exists", body = MessageResponse),
        (status = 400, description = "Invalid input"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Authentication"
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;

    let email = normalize_email(&payload.email);

    if let Some(user) = state.store.find_user_by_email(&email).await? {
        let reset = ResetToken {
            token: generate_reset_token(),
            user_id: user.id,
            expires_at: Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
        };
        state.store.insert_reset_token(&reset).await?;

        // The response must look the same either way, so a mail failure
        // is only logged.
        let link = state.config.reset_link(&reset.token);
        if let Err(e) = state.mailer.send_password_reset(&user.email, &link).await {
            tracing::error!("Could not deliver reset link for user {}: {}", user.id, e);
        }
    } else {
        tracing::info!("Password reset requested for unknown email");
    }

    Ok(Json(MessageResponse {
        message: FORGOT_PASSWORD_MESSAGE.to_string(),
    }))
}

/// Complete a password reset
#[utoipa::path(
    post,
    path = "/api/v1/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Invalid or expired token, or weak password"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Authentication"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;

    let reset = state
        .store
        .find_reset_token(payload.token.trim())
        .await?
        .filter(|t| !t.is_expired(Utc::now()))
        .ok_or(AppError::TokenInvalidOrExpired)?;

    check_password_policy(&payload.password)?;
    let password_hash = hash_password(&payload.password)?;

    state
        .store
        .update_password(reset.user_id, &password_hash)
        .await?;

    // Single use
    state.store.delete_reset_token(&reset.token).await?;

    tracing::info!("Password reset completed for user {}", reset.user_id);

    Ok(Json(MessageResponse {
        message: "Password has been reset. You can now log in.".to_string(),
    }))
}

/// Identity carried by the caller's credential
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Credential is valid", body = AuthUser),
        (status = 401, description = "Missing or invalid credential")
    ),
    tag = "Authentication",
    security(("bearer" = []))
)]
pub async fn me(Extension(user): Extension<AuthUser>) -> Json<AuthUser> {
    Json(user)
}

fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
