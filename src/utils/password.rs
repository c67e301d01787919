use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::errors::AppError;

pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Symbols accepted by the password policy.
pub const PASSWORD_SYMBOLS: &str = r#"!@#$%^&*()_+-=[]{};':"\|,.<>/?~"#;

pub const PASSWORD_POLICY: &str =
    "Password must be at least 8 characters and contain at least one digit and one symbol";

/// Check a candidate password against the policy.
pub fn check_password_policy(password: &str) -> Result<(), AppError> {
    let long_enough = password.chars().count() >= PASSWORD_MIN_LENGTH;
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));

    if long_enough && has_digit && has_symbol {
        Ok(())
    } else {
        Err(AppError::WeakPassword)
    }
}

/// Hash a password with Argon2id and a fresh random salt
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalError(format!("Failed to hash password: {}", e)))
}

/// Compare a password against a stored PHC hash string
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| AppError::InternalError(format!("Stored hash is malformed: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
