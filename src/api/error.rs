//! HTTP error mapping. Every failure renders as `{"detail": "..."}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::crm::CrmError;
use crate::integrations::IntegrationError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Integration(#[from] IntegrationError),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Integration(IntegrationError::NotConfigured { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Integration(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CrmError> for ApiError {
    fn from(err: CrmError) -> Self {
        match err {
            CrmError::NotFound { .. } => Self::NotFound(err.to_string()),
            CrmError::Invalid(msg) => Self::BadRequest(msg),
            CrmError::LimitReached { .. } => Self::Forbidden(err.to_string()),
            CrmError::Database(_) | CrmError::Serialization(_) => Self::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            // Storage details stay in the log.
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                "Internal server error".to_string()
            }
            Self::Integration(e) => {
                tracing::warn!(error = %e, "integration failure");
                e.to_string()
            }
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crm_errors_map_to_statuses() {
        let nf: ApiError = CrmError::NotFound {
            kind: "Contact",
            id: "x".into(),
        }
        .into();
        assert_eq!(nf.status(), StatusCode::NOT_FOUND);
        assert_eq!(nf.to_string(), "Contact not found");

        let bad: ApiError = CrmError::Invalid("nope".into()).into();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let limit: ApiError = CrmError::LimitReached {
            tier: "free",
            limit: 5,
        }
        .into();
        assert_eq!(limit.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn integration_errors_map_to_gateway_statuses() {
        let missing: ApiError = IntegrationError::NotConfigured { service: "llm" }.into();
        assert_eq!(missing.status(), StatusCode::SERVICE_UNAVAILABLE);
        let down: ApiError = IntegrationError::unavailable("llm", "timeout").into();
        assert_eq!(down.status(), StatusCode::BAD_GATEWAY);
        let junk: ApiError = IntegrationError::unusable("llm", "prose").into();
        assert_eq!(junk.status(), StatusCode::BAD_GATEWAY);
    }
}
