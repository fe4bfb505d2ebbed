use super::{ok, success, Data, JsonResult, Success};
use crate::auth::AuthUser;
use crate::error::{codes, ApiError, ApiResult};
use crate::extract::{require_user, ClientIp, JsonBody};
use crate::media::images::{self, Folder, ALLOWED_IMAGE_TYPES, PDF, RESUME_KEY};
use crate::media::MediaError;
use crate::metrics::{record_rate_limited, record_upload};
use crate::state::AppState;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{error, info};

const MAX_KEY_LEN: usize = 500;

#[derive(Debug, Serialize)]
pub struct Uploaded {
    pub urls: BTreeMap<&'static str, String>,
    pub key: String,
}

#[derive(Default)]
struct UploadForm {
    file: Option<(Vec<u8>, String)>,
    folder: Option<String>,
    entity_id: Option<String>,
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::bad_request(codes::FILE_TOO_LARGE, "File size exceeds 10MB limit")
    } else {
        ApiError::bad_request(codes::VALIDATION_ERROR, err.body_text())
    }
}

async fn read_form(mut multipart: Multipart) -> ApiResult<UploadForm> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                form.file = Some((bytes.to_vec(), content_type));
            }
            Some("folder") => form.folder = Some(field.text().await.map_err(multipart_error)?),
            Some("entityId") => {
                let value = field.text().await.map_err(multipart_error)?;
                form.entity_id = Some(value.trim().to_string()).filter(|v| !v.is_empty());
            }
            _ => {}
        }
    }
    Ok(form)
}

fn store_error(err: MediaError) -> ApiError {
    error!("Upload storage failed: {}", err);
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        codes::UPLOAD_ERROR,
        "Failed to upload file",
    )
}

/// `POST /api/upload`: images become WebP variants, resumes are stored as-is.
pub async fn upload(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
    multipart: Multipart,
) -> JsonResult<Uploaded> {
    let limits = &state.config.limits;
    let decision = state.limiter.check(
        &format!("upload:{ip}"),
        limits.upload_requests,
        Duration::from_secs(limits.upload_window_secs),
    );
    if !decision.success {
        record_rate_limited("upload");
        return Err(ApiError::rate_limited("Rate limit exceeded. Try again later."));
    }

    let user = require_user(&state, &headers).await?;
    let form = read_form(multipart).await?;

    let Some((bytes, content_type)) = form.file else {
        return Err(ApiError::bad_request(codes::MISSING_FILE, "File is required"));
    };
    let folder: Folder = form
        .folder
        .as_deref()
        .and_then(|f| f.parse().ok())
        .ok_or_else(|| {
            ApiError::bad_request(
                codes::INVALID_FOLDER,
                format!("Invalid folder. Must be one of: {}", Folder::names()),
            )
        })?;
    if bytes.len() > limits.max_upload_bytes {
        return Err(ApiError::bad_request(
            codes::FILE_TOO_LARGE,
            "File size exceeds 10MB limit",
        ));
    }

    let size = bytes.len();
    if folder == Folder::Resume {
        if content_type != PDF {
            return Err(ApiError::bad_request(
                codes::INVALID_FILE_TYPE,
                "Resume must be a PDF file",
            ));
        }
        let url = state
            .media
            .put(RESUME_KEY, bytes, PDF)
            .await
            .map_err(store_error)?;
        record_upload(folder.as_str(), size);
        info!("{} uploaded a new resume", user.sub);
        return Ok(ok(Uploaded {
            urls: BTreeMap::from([("original", url)]),
            key: RESUME_KEY.to_string(),
        }));
    }

    if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
        return Err(ApiError::bad_request(
            codes::INVALID_FILE_TYPE,
            format!("Invalid file type. Allowed: {}", ALLOWED_IMAGE_TYPES.join(", ")),
        ));
    }
    if folder.requires_entity_id() && form.entity_id.is_none() {
        return Err(ApiError::bad_request(
            codes::MISSING_ENTITY_ID,
            format!("entityId is required for {folder} uploads"),
        ));
    }
    if let Some(entity_id) = form.entity_id.as_deref() {
        if !images::is_safe_segment(entity_id) {
            return Err(ApiError::bad_request(
                codes::VALIDATION_ERROR,
                "entityId may only contain letters, digits, '-' and '_'",
            ));
        }
    }

    let file_id = images::new_file_id();
    let entity_id = form.entity_id.clone();
    let processed = tokio::task::spawn_blocking(move || {
        images::process(&bytes, folder, entity_id.as_deref(), &file_id)
    })
    .await
    .map_err(ApiError::internal)?
    .map_err(|e| match e {
        MediaError::MissingEntityId(folder) => ApiError::bad_request(
            codes::MISSING_ENTITY_ID,
            format!("entityId is required for {folder} uploads"),
        ),
        other => ApiError::bad_request(codes::UPLOAD_ERROR, other.to_string()),
    })?;

    let puts = processed.variants.into_iter().map(|variant| {
        let media = state.media.clone();
        async move {
            let url = media
                .put(&variant.key, variant.bytes, variant.content_type)
                .await?;
            Ok::<_, MediaError>((variant.label, url))
        }
    });
    let urls = futures_util::future::try_join_all(puts)
        .await
        .map_err(store_error)?
        .into_iter()
        .collect();

    record_upload(folder.as_str(), size);
    info!("{} uploaded {} to {}", user.sub, processed.primary_key, folder);
    Ok(ok(Uploaded {
        urls,
        key: processed.primary_key,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteUploadInput {
    pub key: Option<String>,
}

/// `DELETE /api/upload`: removes every variant of the image behind `key`.
pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    JsonBody(input): JsonBody<DeleteUploadInput>,
) -> ApiResult<Json<Data<Success>>> {
    let key = input
        .key
        .filter(|k| !k.is_empty() && k.chars().count() <= MAX_KEY_LEN)
        .ok_or_else(|| ApiError::bad_request(codes::VALIDATION_ERROR, "Invalid request body"))?;
    if !Folder::owns_key(&key) {
        return Err(ApiError::bad_request(codes::INVALID_KEY, "Invalid key prefix"));
    }

    state.media.delete_variants(&key).await.map_err(|e| match e {
        MediaError::Key(_) => ApiError::bad_request(codes::INVALID_KEY, "Invalid key"),
        other => store_error(other),
    })?;
    Ok(success())
}
