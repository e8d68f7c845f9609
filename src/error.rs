use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("request failed ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("backend rejected request: {}", .0.as_deref().unwrap_or("no message"))]
    Rejected(Option<String>),

    #[error("received invalid json data")]
    Decode(#[from] serde_json::Error),

    #[error("response carried no data")]
    MissingData,
}

impl ApiError {
    /// Backend-supplied message when there is one, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status { message: Some(m), .. } | ApiError::Rejected(Some(m))
                if !m.is_empty() =>
            {
                m.clone()
            }
            _ => fallback.to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// Errors that abort a portal request outright, as opposed to the toast path.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Render(#[from] askama::Error),

    #[error(transparent)]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => e400(msg).into_response(),
            AppError::Multipart(e) => e400(e.to_string()).into_response(),
            other => e500(other).into_response(),
        }
    }
}

pub fn e400<T: Into<String>>(msg: T) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, msg.into())
}

pub fn e500<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    tracing::error!(error=%e, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_backend_text() {
        let err = ApiError::Rejected(Some("Already enrolled".into()));
        assert_eq!(err.user_message("Enrollment failed"), "Already enrolled");

        let err = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            message: Some("Title too long".into()),
        };
        assert_eq!(err.user_message("Error adding lesson"), "Title too long");
    }

    #[test]
    fn user_message_falls_back() {
        assert_eq!(ApiError::Rejected(None).user_message("Enrollment failed"), "Enrollment failed");
        assert_eq!(
            ApiError::Rejected(Some(String::new())).user_message("Enrollment failed"),
            "Enrollment failed"
        );
        assert_eq!(ApiError::MissingData.user_message("x"), "x");
    }

    #[test]
    fn not_found_is_detected_from_status() {
        let err = ApiError::Status { status: StatusCode::NOT_FOUND, message: None };
        assert!(err.is_not_found());
        let err = ApiError::Status { status: StatusCode::BAD_GATEWAY, message: None };
        assert!(!err.is_not_found());
    }

    #[test]
    fn bad_request_maps_to_400() {
        let res = AppError::BadRequest("nope".into()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
