use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// User from database
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub gender: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row to insert for a new account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub gender: Option<String>,
}

/// Pending password reset
#[derive(Debug, Clone, FromRow)]
pub struct ResetToken {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl ResetToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Identity asserted by a verified credential
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Register a new user account
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(default)]
pub struct RegisterRequest {
    /// Valid email address; surrounding whitespace and case are ignored
    #[validate(custom(function = "crate::utils::validation::email_address"))]
    #[schema(example = "ada@example.com")]
    pub email: String,

    /// At least 8 characters with one digit and one symbol
    #[schema(example = "Secure123!")]
    pub password: String,

    /// Display name
    #[validate(length(min = 1, max = 100), custom(function = "crate::utils::validation::non_blank"))]
    #[schema(example = "Ada Lovelace")]
    pub name: String,

    #[validate(length(max = 50))]
    #[schema(example = "female")]
    pub gender: Option<String>,
}

/// Successful registration response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub message: String,
}

/// Login with email and password
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    #[schema(example = "ada@example.com")]
    pub email: String,

    #[validate(length(min = 1))]
    #[schema(example = "Secure123!")]
    pub password: String,
}

/// Successful login response with JWT token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// JWT access token
    pub access_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// Ask for a password reset link
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(default)]
pub struct ForgotPasswordRequest {
    #[validate(length(min = 1))]
    #[schema(example = "ada@example.com")]
    pub email: String,
}

/// Complete a password reset
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(default)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,

    /// New password, same policy as registration
    #[schema(example = "Secure456!")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Normalize an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
