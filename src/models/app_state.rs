use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::store::{Store, postgres::PgStore};
use crate::utils::{
    email::{Mailer, ResendMailer},
    extract::{OcrSpaceExtractor, TextExtractor},
    media::{CloudinaryHost, MediaHost},
};
use crate::visits::VisitCounter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
    pub mailer: Arc<dyn Mailer>,
    pub media: Arc<dyn MediaHost>,
    pub extractor: Arc<dyn TextExtractor>,
    pub visits: VisitCounter,
}

impl AppState {
    /// Wire the production collaborators from configuration.
    pub fn new(db: PgPool, config: Config) -> Self {
        let mailer = ResendMailer::new(&config.resend_api_key, config.mail_from.clone());
        let media = CloudinaryHost::new(
            config.cloudinary.cloud_name.clone(),
            config.cloudinary.api_key.clone(),
            config.cloudinary.api_secret.clone(),
        );
        let extractor =
            OcrSpaceExtractor::new(config.ocr_api_url.clone(), config.ocr_api_key.clone());

        Self {
            store: Arc::new(PgStore::new(db)),
            visits: VisitCounter::new(config.visit_counter_capacity),
            config: Arc::new(config),
            mailer: Arc::new(mailer),
            media: Arc::new(media),
            extractor: Arc::new(extractor),
        }
    }
}
