use axum::{
    Extension, Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::{
        extract::{AppJson, AppPath},
        upload::{UploadForm, discard_previous},
    },
    errors::AppError,
    models::{
        app_state::AppState,
        certification::{
            Certification, CertificationFields, CertificationFile, CertificationListResponse,
            CertificationRequest, CertificationUpload,
        },
        user::AuthUser,
    },
    utils::{
        media::{CERTIFICATIONS_FOLDER, delete_best_effort},
        validation::{clean, clean_opt, parse_date},
    },
};

fn to_fields(payload: &CertificationRequest) -> Result<CertificationFields, AppError> {
    payload.validate()?;

    Ok(CertificationFields {
        title: clean(&payload.title),
        institution: clean(&payload.institution),
        date_awarded: parse_date("date_awarded", &payload.date_awarded)?,
        description: clean_opt(payload.description.as_deref()),
    })
}

/// List the caller's certifications
#[utoipa::path(
    get,
    path = "/api/v1/certifications",
    responses(
        (status = 200, description = "Certifications, newest award first", body = CertificationListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Certifications",
    security(("bearer" = []))
)]
pub async fn list_certifications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CertificationListResponse>, AppError> {
    let certifications = state.store.list_certifications(user.id).await?;
    let count = certifications.len();

    Ok(Json(CertificationListResponse {
        certifications,
        count,
    }))
}

/// Upload a certificate and record its metadata and extracted text
#[utoipa::path(
    post,
    path = "/api/v1/certifications",
    request_body(content = CertificationUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Certification created", body = Certification),
        (status = 400, description = "Invalid metadata or file"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Media host or text extraction failure")
    ),
    tag = "Certifications",
    security(("bearer" = []))
)]
pub async fn upload_certification(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Certification>), AppError> {
    let mut form = UploadForm::read(multipart).await?;

    let fields = to_fields(&CertificationRequest {
        title: form.text("title"),
        institution: form.text("institution"),
        date_awarded: form.text("date_awarded"),
        description: form.optional("description"),
    })?;
    let file = form.take_file()?;

    discard_previous(&state, user.id, form.optional("previous_file_url").as_deref()).await?;

    let text = state.extractor.extract(&file).await?;
    let uploaded = state.media.upload(&file, CERTIFICATIONS_FOLDER).await?;

    let details_id = state.store.ensure_details(user.id).await?;
    let certification = state
        .store
        .insert_certification(
            details_id,
            &fields,
            &CertificationFile {
                file_url: uploaded.url,
                file_kind: file.kind.as_str().to_string(),
                extracted_text: clean_opt(Some(&text)),
            },
        )
        .await?;

    tracing::info!(
        "User {} uploaded certification {} ({})",
        user.id,
        certification.id,
        uploaded.public_id
    );

    Ok((StatusCode::CREATED, Json(certification)))
}

/// Update certification metadata
#[utoipa::path(
    put,
    path = "/api/v1/certifications/{id}",
    params(
        ("id" = Uuid, Path, description = "Certification ID")
    ),
    request_body = CertificationRequest,
    responses(
        (status = 200, description = "Certification updated", body = Certification),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Certification not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Certifications",
    security(("bearer" = []))
)]
pub async fn update_certification(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<CertificationRequest>,
) -> Result<Json<Certification>, AppError> {
    let fields = to_fields(&payload)?;
    let certification = state
        .store
        .update_certification(user.id, id, &fields)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(certification))
}

/// Delete a certification and, best effort, its stored file
#[utoipa::path(
    delete,
    path = "/api/v1/certifications/{id}",
    params(
        ("id" = Uuid, Path, description = "Certification ID")
    ),
    responses(
        (status = 204, description = "Certification deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Certification not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Certifications",
    security(("bearer" = []))
)]
pub async fn delete_certification(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    let removed = state
        .store
        .delete_certification(user.id, id)
        .await?
        .ok_or(AppError::NotFound)?;

    delete_best_effort(state.media.as_ref(), removed.file_url.as_deref()).await;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::test_support::{Part, TestApp};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    fn metadata() -> Vec<Part> {
        vec![
            Part::text("title", "Certified Engine Operator"),
            Part::text("institution", "Royal Society"),
            Part::text("date_awarded", "2021-10-01"),
        ]
    }

    #[tokio::test]
    async fn upload_stores_file_and_extracted_text() {
        let app = TestApp::new();
        let token = app.signed_in("ada@example.com").await;
        app.extractor.returns("  Certificate of Merit  ");

        let mut parts = metadata();
        parts.push(Part::file("file", "cert.pdf", "application/pdf", b"%PDF-1.4"));

        let (status, body) = app
            .send_multipart("/api/v1/certifications", Some(&token), parts)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["extracted_text"], "Certificate of Merit");
        assert_eq!(body["file_kind"], "pdf");
        assert_eq!(body["date_awarded"], "2021-10-01");

        let uploads = app.media.uploads().await;
        assert_eq!(uploads, [("folio/certifications".to_string(), "cert.pdf".to_string())]);
        assert_eq!(body["file_url"], app.media.url_for("cert.pdf"));
    }

    #[tokio::test]
    async fn previous_file_delete_failure_does_not_block_upload() {
        let app = TestApp::new();
        let token = app.signed_in("ada@example.com").await;

        let mut parts = metadata();
        parts.push(Part::file("file", "old.png", "image/png", b"\x89PNG"));
        let (_, first) = app
            .send_multipart("/api/v1/certifications", Some(&token), parts)
            .await;
        let old_url = first["file_url"].as_str().unwrap().to_string();
        app.media.fail_deletes();

        let mut parts = metadata();
        parts.push(Part::text("previous_file_url", &old_url));
        parts.push(Part::file("file", "cert.png", "image/png", b"\x89PNG"));

        let (status, body) = app
            .send_multipart("/api/v1/certifications", Some(&token), parts)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["file_kind"], "image");
        assert_eq!(app.media.delete_attempts().await, [old_url]);
    }

    #[tokio::test]
    async fn previous_file_of_another_user_is_left_alone() {
        let app = TestApp::new();
        let owner = app.signed_in("owner@example.com").await;
        let intruder = app.signed_in("intruder@example.com").await;

        let mut parts = metadata();
        parts.push(Part::file("file", "owner.pdf", "application/pdf", b"%PDF"));
        let (_, owned) = app
            .send_multipart("/api/v1/certifications", Some(&owner), parts)
            .await;
        let owner_url = owned["file_url"].as_str().unwrap();

        let mut parts = metadata();
        parts.push(Part::text("previous_file_url", owner_url));
        parts.push(Part::file("file", "mine.pdf", "application/pdf", b"%PDF"));
        let (status, _) = app
            .send_multipart("/api/v1/certifications", Some(&intruder), parts)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(app.media.delete_attempts().await.is_empty());

        let (_, list) = app.send(Method::GET, "/api/v1/certifications", Some(&owner), None).await;
        assert_eq!(list["certifications"][0]["file_url"], owner_url);
    }

    #[tokio::test]
    async fn bad_metadata_or_file_is_rejected_before_upload() {
        let app = TestApp::new();
        let token = app.signed_in("ada@example.com").await;

        let parts = vec![
            Part::text("title", "Cert"),
            Part::text("institution", "Somewhere"),
            Part::text("date_awarded", "2021-13-01"),
            Part::file("file", "cert.pdf", "application/pdf", b"%PDF"),
        ];
        let (status, body) = app
            .send_multipart("/api/v1/certifications", Some(&token), parts)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"][0]["field"], "date_awarded");

        let (status, body) = app
            .send_multipart("/api/v1/certifications", Some(&token), metadata())
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"][0]["field"], "file");

        let mut parts = metadata();
        parts.push(Part::file("file", "notes.txt", "text/plain", b"hello"));
        let (status, _) = app
            .send_multipart("/api/v1/certifications", Some(&token), parts)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert!(app.media.uploads().await.is_empty());
    }

    #[tokio::test]
    async fn extraction_failure_is_upstream_and_uploads_nothing() {
        let app = TestApp::new();
        let token = app.signed_in("ada@example.com").await;
        app.extractor.fails();

        let mut parts = metadata();
        parts.push(Part::file("file", "cert.pdf", "application/pdf", b"%PDF"));
        let (status, body) = app
            .send_multipart("/api/v1/certifications", Some(&token), parts)
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Upstream service failure");
        assert!(app.media.uploads().await.is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_are_owner_scoped() {
        let app = TestApp::new();
        let owner = app.signed_in("owner@example.com").await;
        let intruder = app.signed_in("intruder@example.com").await;

        let mut parts = metadata();
        parts.push(Part::file("file", "cert.pdf", "application/pdf", b"%PDF"));
        let (_, created) = app
            .send_multipart("/api/v1/certifications", Some(&owner), parts)
            .await;
        let path = format!("/api/v1/certifications/{}", created["id"].as_str().unwrap());
        let update = json!({
            "title": "Renamed",
            "institution": "Royal Society",
            "date_awarded": "2021-10-02"
        });

        let (status, _) = app.send(Method::PUT, &path, Some(&intruder), Some(update.clone())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.send(Method::DELETE, &path, Some(&intruder), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, updated) = app.send(Method::PUT, &path, Some(&owner), Some(update)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Renamed");
        assert_eq!(updated["file_url"], created["file_url"]);

        let (status, _) = app.send(Method::DELETE, &path, Some(&owner), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(
            app.media.delete_attempts().await,
            [created["file_url"].as_str().unwrap().to_string()]
        );
    }
}
