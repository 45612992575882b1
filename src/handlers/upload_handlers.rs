//! `POST /upload`.
//!
//! Reads the multipart body field by field. The file part is buffered chunk
//! by chunk and abandoned as soon as it passes the size ceiling, so an
//! oversized upload is never held in memory in full.

use axum::{
    Json,
    extract::{
        Multipart, Query, State,
        multipart::{Field, MultipartError, MultipartRejection},
        rejection::QueryRejection,
    },
    http::{HeaderMap, StatusCode},
};
use bytes::BytesMut;
use serde::Deserialize;
use tracing::debug;

use crate::{
    errors::AppError,
    models::upload::{UploadRequest, UploadResponse, UploadedFile},
    services::auth::resolve_secret,
    state::AppState,
};

pub const FILE_FIELD: &str = "file";
pub const SECRET_FIELD: &str = "secret";
pub const SECRET_HEADER: &str = "x-upload-secret";

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    pub secret: Option<String>,
}

/// Parsed form fields before the secret sources are merged.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    secret: Option<String>,
}

pub async fn upload_file(
    State(state): State<AppState>,
    query: Result<Query<UploadQuery>, QueryRejection>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let form = match multipart {
        Ok(multipart) => read_form(multipart, state.config.max_file_size_bytes).await?,
        // Not a multipart body: there is no file, but the secret may still
        // come from the query or header and must be judged first.
        Err(rejection) => {
            debug!(%rejection, "upload body is not multipart");
            UploadForm::default()
        }
    };

    // An unparseable query string carries no usable secret; the body or
    // header may still supply one.
    let query_secret = match query {
        Ok(Query(query)) => query.secret,
        Err(rejection) => {
            debug!(%rejection, "ignoring unparseable upload query string");
            None
        }
    };

    let header_secret = headers
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let request = UploadRequest {
        file: form.file,
        secret: resolve_secret(form.secret, query_secret, header_secret),
    };

    let response = state.uploads.handle(request).await?;
    Ok(Json(response))
}

async fn read_form(mut multipart: Multipart, max_bytes: u64) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ingest_error(err, max_bytes))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FILE_FIELD if form.file.is_none() && field.file_name().is_some() => {
                form.file = Some(read_file(field, max_bytes).await?);
            }
            SECRET_FIELD if form.secret.as_deref().is_none_or(str::is_empty) => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| ingest_error(err, max_bytes))?;
                form.secret = Some(value);
            }
            _ => debug!(field = %name, "ignoring multipart field"),
        }
    }

    Ok(form)
}

async fn read_file(mut field: Field<'_>, max_bytes: u64) -> Result<UploadedFile, AppError> {
    let filename = field.file_name().unwrap_or_default().to_string();
    let content_type = field
        .content_type()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();

    let mut buf = BytesMut::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|err| ingest_error(err, max_bytes))?
    {
        if (buf.len() + chunk.len()) as u64 > max_bytes {
            debug!(%filename, max_bytes, "file exceeds size ceiling");
            return Err(AppError::FileTooLarge { max_bytes });
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(UploadedFile {
        filename,
        content_type,
        bytes: buf.freeze(),
    })
}

/// The request-wide body limit surfaces as a multipart error; report it as
/// the size problem it is.
fn ingest_error(err: MultipartError, max_bytes: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge { max_bytes }
    } else {
        AppError::MalformedUpload(err.body_text())
    }
}
