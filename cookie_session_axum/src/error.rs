use axum::response::{IntoResponse, Response};
use http::StatusCode;

use cookie_session::SessionError;

/// Why a request could not be served with a session.
#[derive(Debug)]
pub enum SessionRejection {
    /// A handler asked for a session on a route without the session middleware.
    MissingLayer,
    Session(SessionError),
}

impl From<SessionError> for SessionRejection {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}

fn status_for(err: &SessionError) -> StatusCode {
    match err {
        SessionError::Binding { .. } => StatusCode::FORBIDDEN,
        SessionError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        SessionError::Value(_) => StatusCode::BAD_REQUEST,
        SessionError::StoreUnavailable(_) | SessionError::Utils(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            Self::MissingLayer => {
                tracing::error!("SessionHandle requested but session middleware is not installed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
            Self::Session(err) => {
                let status = status_for(&err);
                if status.is_server_error() {
                    tracing::error!("Session failure: {}", err);
                    (status, "Internal Server Error").into_response()
                } else {
                    tracing::debug!("Session rejection: {}", err);
                    (status, err.to_string()).into_response()
                }
            }
        }
    }
}

/// Helper trait for converting errors to a standard response error format
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

impl<T> IntoResponseError<T> for Result<T, SessionError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| (status_for(&e), e.to_string()))
    }
}
