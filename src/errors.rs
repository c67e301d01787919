use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::utils::password::PASSWORD_POLICY;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    // Database errors
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Authentication errors
    #[error("authorization credential missing")]
    MissingCredential,
    #[error("invalid or expired credential")]
    InvalidCredential,
    #[error("invalid email or password")]
    InvalidCredentials,

    // Validation errors
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("{0}")]
    ValidationError(String),
    #[error("password does not satisfy the policy")]
    WeakPassword,

    // Account errors
    #[error("email already registered")]
    DuplicateEmail,
    #[error("reset token is invalid or has expired")]
    TokenInvalidOrExpired,

    #[error("not found")]
    NotFound,

    // Media host, mail or OCR failures
    #[error("upstream failure: {0}")]
    Upstream(String),

    // Internal errors
    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Serialize)]
struct FieldError {
    field: String,
    message: String,
}

fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields = Vec::new();
    collect_field_errors("", errors, &mut fields);
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// Flatten nested validation errors into dotted paths (`paintings[1].title`).
fn collect_field_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(issues) => {
                out.extend(issues.iter().map(|issue| FieldError {
                    field: path.clone(),
                    message: issue
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| issue.code.to_string()),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_errors(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

// Path parameters are ids; one that does not parse names no row.
impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::NotFound
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingCredential
            | AppError::InvalidCredential
            | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Validation(_)
            | AppError::ValidationError(_)
            | AppError::WeakPassword
            | AppError::DuplicateEmail
            | AppError::TokenInvalidOrExpired => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) | AppError::Upstream(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                json!({ "error": "Database error occurred" })
            }
            AppError::MissingCredential => json!({ "error": "Authorization credential missing" }),
            AppError::InvalidCredential => json!({ "error": "Invalid or expired credential" }),
            AppError::InvalidCredentials => json!({ "error": "Invalid email or password" }),
            AppError::Validation(errors) => json!({
                "error": "Validation failed",
                "fields": field_errors(&errors),
            }),
            AppError::ValidationError(msg) => json!({ "error": msg }),
            AppError::WeakPassword => json!({ "error": PASSWORD_POLICY }),
            AppError::DuplicateEmail => json!({ "error": "Email already registered" }),
            AppError::TokenInvalidOrExpired => {
                json!({ "error": "Reset token is invalid or has expired" })
            }
            AppError::NotFound => json!({ "error": "Not found" }),
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {}", msg);
                json!({ "error": "Upstream service failure" })
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                json!({ "error": "Internal server error" })
            }
        };

        (status, Json(body)).into_response()
    }
}
