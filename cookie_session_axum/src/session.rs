use std::sync::Arc;

use axum::extract::FromRequestParts;
use http::request::Parts;
use tokio::sync::{Mutex, MutexGuard};

use cookie_session::{CacheSessionStore, HeaderList, Session};

use super::error::SessionRejection;

/// The session attached by [`session_middleware`](crate::session_middleware).
pub type RequestSession = Session<CacheSessionStore, HeaderList>;

/// Shared handle to the current request's session, available as an extractor.
///
/// # Example
///
/// ```no_run
/// use cookie_session_axum::{SessionHandle, SessionRejection};
///
/// async fn visits(session: SessionHandle) -> Result<String, SessionRejection> {
///     let mut session = session.lock().await;
///     let count = session.get::<u64>("visits").await.unwrap_or(0) + 1;
///     session.set("visits", &count).await?;
///     Ok(format!("visit #{count}"))
/// }
/// ```
#[derive(Clone)]
pub struct SessionHandle(Arc<Mutex<RequestSession>>);

impl SessionHandle {
    pub(crate) fn new(session: RequestSession) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    pub async fn lock(&self) -> MutexGuard<'_, RequestSession> {
        self.0.lock().await
    }
}

impl<S> FromRequestParts<S> for SessionHandle
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionHandle>()
            .cloned()
            .ok_or(SessionRejection::MissingLayer)
    }
}
