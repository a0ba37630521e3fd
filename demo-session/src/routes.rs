use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;

use cookie_session_axum::{IntoResponseError, SessionError, SessionHandle, SessionRejection};

const COUNT_KEY: &str = "count";

#[derive(Serialize)]
struct SessionState {
    count: Option<u64>,
}

pub(crate) fn router() -> Router {
    Router::new()
        .route("/", get(counter))
        .route("/state", get(state))
        .route("/regenerate", post(regenerate))
        .route("/logout", post(logout))
}

async fn counter(session: SessionHandle) -> Result<String, SessionRejection> {
    let mut session = session.lock().await;
    let count = match session.get::<u64>(COUNT_KEY).await {
        Ok(count) => count + 1,
        Err(SessionError::KeyNotFound(_)) => 1,
        Err(e) => return Err(e.into()),
    };
    session.set(COUNT_KEY, &count).await?;
    Ok(format!("You have visited this page {count} time(s).\n"))
}

async fn state(session: SessionHandle) -> Result<Json<SessionState>, (StatusCode, String)> {
    let session = session.lock().await;
    let count = if session.has(COUNT_KEY).await.into_response_error()? {
        Some(session.get::<u64>(COUNT_KEY).await.into_response_error()?)
    } else {
        None
    };
    Ok(Json(SessionState { count }))
}

async fn regenerate(session: SessionHandle) -> Result<StatusCode, SessionRejection> {
    session.lock().await.regenerate(true).await?;
    tracing::info!("Session identifier regenerated on request");
    Ok(StatusCode::NO_CONTENT)
}

async fn logout(session: SessionHandle) -> Result<StatusCode, SessionRejection> {
    session.lock().await.destroy().await?;
    Ok(StatusCode::NO_CONTENT)
}
