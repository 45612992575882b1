use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    config::whole_megabytes, models::upload::ErrorBody, services::storage_service::StorageError,
};

/// Every way an upload request can end short of success.
///
/// All variants are rendered at the request boundary; none escape as panics.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No file provided")]
    NoFileProvided,

    #[error("Invalid upload secret")]
    AuthenticationFailed,

    #[error("File type .{extension} not allowed. Allowed types: {}", .allowed.join(", "))]
    DisallowedFileType {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("File too large. Maximum size: {}MB", megabytes(.max_bytes))]
    FileTooLarge { max_bytes: u64 },

    #[error("Malformed upload body")]
    MalformedUpload(String),

    #[error("Upload failed")]
    StorageUploadFailed(String),

    #[error("Too many upload requests, please try again later.")]
    RateLimited,

    #[error("Internal server error")]
    Internal(String),
}

fn megabytes(bytes: &u64) -> u64 {
    whole_megabytes(*bytes)
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NoFileProvided
            | Self::DisallowedFileType { .. }
            | Self::FileTooLarge { .. }
            | Self::MalformedUpload(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::StorageUploadFailed(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::MalformedUpload(d) | Self::StorageUploadFailed(d) | Self::Internal(d) => {
                Some(d.clone())
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, details = ?self.details(), "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = Json(ErrorBody {
            success: false,
            error: self.to_string(),
            details: self.details(),
        });

        (status, body).into_response()
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::StorageUploadFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(AppError::NoFileProvided.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::AuthenticationFailed.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            AppError::StorageUploadFailed("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn size_and_type_errors_read_differently() {
        let too_large = AppError::FileTooLarge {
            max_bytes: 10 * 1024 * 1024,
        };
        let wrong_type = AppError::DisallowedFileType {
            extension: "exe".into(),
            allowed: vec!["png".into(), "jpg".into()],
        };

        assert_eq!(too_large.to_string(), "File too large. Maximum size: 10MB");
        assert_eq!(
            wrong_type.to_string(),
            "File type .exe not allowed. Allowed types: png, jpg"
        );
    }

    #[test]
    fn only_opaque_failures_carry_details() {
        assert_eq!(
            AppError::StorageUploadFailed("access denied".into()).details(),
            Some("access denied".into())
        );
        assert_eq!(AppError::AuthenticationFailed.details(), None);
    }
}
