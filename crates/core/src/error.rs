use serde::Serialize;
use thiserror::Error;

use crate::validate::FieldError;

/// Unified API error type.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("validation failed ({} field{})", .0.len(), if .0.len() == 1 { "" } else { "s" })]
    Validation(Vec<FieldError>),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("metadata provider error: {0}")]
    ProviderUnavailable(String),

    #[error("metadata provider overloaded: {0}")]
    ProviderTransient(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::ProviderUnavailable(_) => "provider_unavailable",
            Self::ProviderTransient(_) => "provider_transient",
            Self::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::ProviderUnavailable(_) => 502,
            Self::ProviderTransient(_) => 503,
            Self::Internal(_) => 500,
        }
    }
}

/// JSON error envelope: `{ "error": { "code": "…", "message": "…", "details": {} } }`
#[derive(Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
}

impl From<&ApiError> for ErrorEnvelope {
    fn from(e: &ApiError) -> Self {
        let details = match e {
            ApiError::Validation(fields) => {
                serde_json::to_value(fields).unwrap_or_else(|_| serde_json::json!([]))
            }
            // Transient provider failures are worth retrying; everything
            // else is not, so the UI can tune its messaging.
            ApiError::ProviderTransient(_) => serde_json::json!({ "retryable": true }),
            _ => serde_json::Value::Object(serde_json::Map::new()),
        };
        Self {
            error: ErrorBody {
                code: e.code().to_string(),
                message: e.to_string(),
                details,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_envelope_carries_field_details() {
        let err = ApiError::Validation(vec![FieldError {
            path: "tituloOriginal".into(),
            message: "must not be empty".into(),
        }]);
        assert_eq!(err.status_code(), 400);

        let envelope = ErrorEnvelope::from(&err);
        assert_eq!(envelope.error.code, "validation_error");
        assert_eq!(envelope.error.details[0]["path"], "tituloOriginal");
    }

    #[test]
    fn transient_provider_error_is_retryable() {
        let err = ApiError::ProviderTransient("model overloaded".into());
        assert_eq!(err.status_code(), 503);
        let envelope = ErrorEnvelope::from(&err);
        assert_eq!(envelope.error.details["retryable"], true);
    }
}
