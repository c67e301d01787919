//! Runtime configuration, read from the Shuttle secret store.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 1;
pub const DEFAULT_MAIL_FROM: &str = "Folio <onboarding@resend.dev>";
pub const DEFAULT_APP_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_OCR_API_URL: &str = "https://api.ocr.space/parse/image";
pub const DEFAULT_UPLOADS_DIR: &str = "public/uploads";
pub const DEFAULT_VISIT_COUNTER_CAPACITY: usize = 10_000;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required secret `{0}`")]
    Missing(&'static str),

    #[error("secret `{key}` has invalid value `{value}`")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// HMAC key shared by token issuance and verification.
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub resend_api_key: String,
    pub mail_from: String,
    /// Front-end origin; reset links point here.
    pub app_base_url: String,
    pub cloudinary: CloudinaryConfig,
    pub ocr_api_key: String,
    pub ocr_api_url: String,
    pub environment: Environment,
    /// Local avatar directory, only used in development.
    pub uploads_dir: PathBuf,
    pub visit_counter_capacity: usize,
}

impl Config {
    /// Build the configuration from a key lookup (the secret store in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let jwt_expiry_hours = parse_or(&get, "JWT_EXPIRY_HOURS", DEFAULT_JWT_EXPIRY_HOURS)?;
        if jwt_expiry_hours <= 0 {
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRY_HOURS",
                value: jwt_expiry_hours.to_string(),
            });
        }

        let environment = match get("APP_ENV") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "APP_ENV",
                value,
            })?,
            None => Environment::Production,
        };

        Ok(Self {
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiry_hours,
            resend_api_key: required("RESEND_API_KEY")?,
            mail_from: get("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
            app_base_url: get("APP_BASE_URL")
                .unwrap_or_else(|| DEFAULT_APP_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            cloudinary: CloudinaryConfig {
                cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
                api_key: required("CLOUDINARY_API_KEY")?,
                api_secret: required("CLOUDINARY_API_SECRET")?,
            },
            ocr_api_key: required("OCR_API_KEY")?,
            ocr_api_url: get("OCR_API_URL").unwrap_or_else(|| DEFAULT_OCR_API_URL.to_string()),
            environment,
            uploads_dir: get("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOADS_DIR)),
            visit_counter_capacity: parse_or(
                &get,
                "VISIT_COUNTER_CAPACITY",
                DEFAULT_VISIT_COUNTER_CAPACITY,
            )?,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Link embedded in password reset emails.
    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.app_base_url, token)
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            jwt_secret: "test-jwt-secret".to_string(),
            jwt_expiry_hours: DEFAULT_JWT_EXPIRY_HOURS,
            resend_api_key: "re_test".to_string(),
            mail_from: DEFAULT_MAIL_FROM.to_string(),
            app_base_url: "https://folio.test".to_string(),
            cloudinary: CloudinaryConfig {
                cloud_name: "demo".to_string(),
                api_key: "key".to_string(),
                api_secret: "secret".to_string(),
            },
            ocr_api_key: "ocr".to_string(),
            ocr_api_url: DEFAULT_OCR_API_URL.to_string(),
            environment: Environment::Production,
            uploads_dir: std::env::temp_dir().join(format!("folio-uploads-{}", uuid::Uuid::new_v4())),
            visit_counter_capacity: 100,
        }
    }
}
