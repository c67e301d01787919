//! Shared fixtures for handler tests: an in-memory app with fake collaborators.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    config::Config,
    errors::AppError,
    models::app_state::AppState,
    routes,
    store::{UserStore, memory::MemoryStore},
    utils::{
        email::Mailer,
        extract::TextExtractor,
        media::{MediaFile, MediaHost, UploadedMedia},
    },
    visits::VisitCounter,
};

pub const TEST_PASSWORD: &str = "Secure123!";
const BOUNDARY: &str = "folio-test-boundary";

/// Captures reset links instead of sending mail.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
    fail_next: AtomicBool,
}

impl RecordingMailer {
    /// `(recipient, link)` pairs in send order.
    pub async fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_password_reset(&self, to_email: &str, reset_link: &str) -> Result<(), AppError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(AppError::Upstream("mail provider down".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to_email.to_string(), reset_link.to_string()));
        Ok(())
    }
}

/// Media host that remembers what it was asked to do.
#[derive(Default)]
pub struct FakeMediaHost {
    uploads: Mutex<Vec<(String, String)>>,
    deletes: Mutex<Vec<String>>,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
}

impl FakeMediaHost {
    pub fn url_for(&self, file_name: &str) -> String {
        format!("https://media.test/{}", file_name)
    }

    /// `(folder, file_name)` of every successful upload.
    pub async fn uploads(&self) -> Vec<(String, String)> {
        self.uploads.lock().unwrap().clone()
    }

    /// Every URL a delete was attempted for, failed or not.
    pub async fn delete_attempts(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn fail_uploads(&self) {
        self.fail_uploads.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl MediaHost for FakeMediaHost {
    async fn upload(&self, file: &MediaFile, folder: &str) -> Result<UploadedMedia, AppError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("media host down".to_string()));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((folder.to_string(), file.file_name.clone()));
        Ok(UploadedMedia {
            url: self.url_for(&file.file_name),
            public_id: format!("{}/{}", folder, file.file_name),
        })
    }

    async fn delete(&self, url: &str) -> Result<(), AppError> {
        self.deletes.lock().unwrap().push(url.to_string());
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("media host down".to_string()));
        }
        Ok(())
    }
}

/// Text extractor returning a canned string.
#[derive(Default)]
pub struct FakeExtractor {
    text: Mutex<String>,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl FakeExtractor {
    pub fn returns(&self, text: &str) {
        *self.text.lock().unwrap() = text.to_string();
    }

    pub fn fails(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub async fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextExtractor for FakeExtractor {
    async fn extract(&self, _file: &MediaFile) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("ocr down".to_string()));
        }
        Ok(self.text.lock().unwrap().clone())
    }
}

/// One part of a multipart request body.
pub struct Part {
    name: String,
    file: Option<(String, String)>,
    data: Vec<u8>,
}

impl Part {
    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            file: None,
            data: value.as_bytes().to_vec(),
        }
    }

    pub fn file(name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            file: Some((file_name.to_string(), content_type.to_string())),
            data: data.to_vec(),
        }
    }
}

fn multipart_body(parts: Vec<Part>) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match &part.file {
            Some((file_name, content_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        part.name, file_name, content_type
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// The full router over in-memory storage and fake collaborators.
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub media: Arc<FakeMediaHost>,
    pub extractor: Arc<FakeExtractor>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::for_tests())
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let media = Arc::new(FakeMediaHost::default());
        let extractor = Arc::new(FakeExtractor::default());

        let state = AppState {
            store: store.clone(),
            visits: VisitCounter::new(config.visit_counter_capacity),
            config: Arc::new(config),
            mailer: mailer.clone(),
            media: media.clone(),
            extractor: extractor.clone(),
        };

        Self {
            router: routes::app(state.clone()),
            state,
            store,
            mailer,
            media,
            extractor,
        }
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    fn parse(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap_or(Value::Null)
    }

    /// Send an optional JSON body, returning the status and parsed JSON
    /// (`Null` for empty or non-JSON bodies).
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let (status, bytes) = self.dispatch(request).await;
        (status, Self::parse(&bytes))
    }

    /// POST a multipart form.
    pub async fn send_multipart(
        &self,
        path: &str,
        token: Option<&str>,
        parts: Vec<Part>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder.body(Body::from(multipart_body(parts))).unwrap();

        let (status, bytes) = self.dispatch(request).await;
        (status, Self::parse(&bytes))
    }

    /// GET returning the raw body.
    pub async fn get_raw(&self, path: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        self.dispatch(request).await
    }

    pub async fn register(&self, email: &str, password: &str) {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(json!({ "email": email, "password": password, "name": "Test User" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    /// Log in and return the access token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Register a fresh account and return its token.
    pub async fn signed_in(&self, email: &str) -> String {
        self.register(email, TEST_PASSWORD).await;
        self.login(email, TEST_PASSWORD).await
    }

    pub async fn user_id_of(&self, email: &str) -> Uuid {
        self.store
            .find_user_by_email(email)
            .await
            .unwrap()
            .unwrap()
            .id
    }
}

/// Pull the token query parameter out of a reset link.
pub fn token_from_link(link: &str) -> String {
    link.split_once("token=").unwrap().1.to_string()
}
