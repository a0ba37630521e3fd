use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::headers::{Cookie, HeaderMapExt};

use cookie_session::{
    CacheSessionStore, HeaderList, SESSION_COOKIE_NAME, Session, SessionOptions,
    SharedCacheStore, StorageError, init_cache_store,
};

use super::error::SessionRejection;
use super::session::SessionHandle;

/// State shared by [`session_middleware`] across requests.
#[derive(Clone)]
pub struct SessionLayerState {
    pub cache: SharedCacheStore,
    pub options: Arc<SessionOptions>,
}

impl SessionLayerState {
    pub fn new(cache: SharedCacheStore, options: SessionOptions) -> Self {
        Self {
            cache,
            options: Arc::new(options),
        }
    }

    /// Cache store and options taken from the environment.
    pub async fn from_env() -> Result<Self, StorageError> {
        let cache = init_cache_store().await?;
        Ok(Self::new(cache, SessionOptions::default()))
    }

    fn cookie_name(&self) -> &str {
        self.options
            .session_name
            .as_deref()
            .unwrap_or(SESSION_COOKIE_NAME.as_str())
    }
}

/// Attach a session to every request and write its cookies to the response.
///
/// ```no_run
/// use axum::{Router, middleware::from_fn_with_state, routing::get};
/// use cookie_session_axum::{SessionLayerState, session_middleware};
///
/// # async fn build() -> Result<Router, Box<dyn std::error::Error>> {
/// let state = SessionLayerState::from_env().await?;
/// let app: Router = Router::new()
///     .route("/", get(|| async { "hello" }))
///     .layer(from_fn_with_state(state, session_middleware));
/// # Ok(app)
/// # }
/// ```
pub async fn session_middleware(
    State(state): State<SessionLayerState>,
    mut req: Request,
    next: Next,
) -> Response {
    let inbound_id = req
        .headers()
        .typed_get::<Cookie>()
        .and_then(|cookies| cookies.get(state.cookie_name()).map(str::to_string));

    let store = CacheSessionStore::new(state.cache.clone(), inbound_id);
    let session =
        match Session::attach(state.options.as_ref().clone(), store, HeaderList::new()).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Failed to attach session: {}", e);
                return SessionRejection::from(e).into_response();
            }
        };

    let handle = SessionHandle::new(session);
    req.extensions_mut().insert(handle.clone());

    let mut response = next.run(req).await;

    let mut session = handle.lock().await;
    tracing::debug!(
        "Flushing {} Set-Cookie line(s) for session",
        session.headers().len()
    );
    session.headers_mut().drain_into(response.headers_mut());

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use cookie_session::{SessionError, memory_cache_store};
    use http::{StatusCode, header};
    use tower::ServiceExt;

    const NAME: &str = "SID";

    fn test_state(cache: SharedCacheStore, domain: Option<&str>) -> SessionLayerState {
        let options = SessionOptions {
            session_name: Some(NAME.to_string()),
            domain_binding: domain.map(str::to_string),
            ..SessionOptions::default()
        };
        SessionLayerState::new(cache, options)
    }

    async fn counter(session: SessionHandle) -> Result<String, SessionRejection> {
        let mut session = session.lock().await;
        let count = match session.get::<u32>("count").await {
            Ok(count) => count,
            Err(SessionError::KeyNotFound(_)) => 0,
            Err(e) => return Err(e.into()),
        } + 1;
        session.set("count", &count).await?;
        Ok(count.to_string())
    }

    async fn missing(session: SessionHandle) -> Result<String, SessionRejection> {
        let session = session.lock().await;
        Ok(session.get::<String>("nope").await?)
    }

    fn app(state: SessionLayerState) -> Router {
        Router::new()
            .route("/", get(counter))
            .route("/missing", get(missing))
            .layer(from_fn_with_state(state, session_middleware))
    }

    fn request(cookie: Option<&str>) -> Request {
        let builder = http::Request::builder().uri("/");
        let builder = match cookie {
            Some(id) => builder.header(header::COOKIE, format!("{NAME}={id}")),
            None => builder,
        };
        builder.body(Body::empty()).unwrap()
    }

    fn set_cookie_ids(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.strip_prefix(&format!("{NAME}=")))
            .filter_map(|v| v.split(';').next())
            .map(str::to_string)
            .collect()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_new_client_gets_session_cookie() {
        // Given a request without any cookie
        let state = test_state(memory_cache_store(), None);

        // When it passes through the middleware
        let response = app(state).oneshot(request(None)).await.unwrap();

        // Then exactly one identifier cookie is set and the handler ran
        assert_eq!(response.status(), StatusCode::OK);
        let ids = set_cookie_ids(&response);
        assert_eq!(ids.len(), 1);
        assert!(!ids[0].is_empty());
        assert_eq!(body_string(response).await, "1");
    }

    #[tokio::test]
    async fn test_returning_client_resumes_session() {
        let cache = memory_cache_store();
        let state = test_state(cache, None);

        let first = app(state.clone()).oneshot(request(None)).await.unwrap();
        let id = set_cookie_ids(&first).remove(0);

        let second = app(state).oneshot(request(Some(&id))).await.unwrap();

        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(set_cookie_ids(&second), vec![id]);
        assert_eq!(body_string(second).await, "2");
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_adopted() {
        let state = test_state(memory_cache_store(), None);

        let response = app(state)
            .oneshot(request(Some("attacker-chosen")))
            .await
            .unwrap();

        let ids = set_cookie_ids(&response);
        assert_eq!(ids.len(), 1);
        assert_ne!(ids[0], "attacker-chosen");
        assert_eq!(body_string(response).await, "1");
    }

    #[tokio::test]
    async fn test_domain_mismatch_is_forbidden() {
        // Given a session bound to one domain
        let cache = memory_cache_store();
        let first = app(test_state(cache.clone(), Some("www.example.org")))
            .oneshot(request(None))
            .await
            .unwrap();
        let id = set_cookie_ids(&first).remove(0);

        // When it is presented to an app bound to another domain
        let response = app(test_state(cache, Some("other.example.org")))
            .oneshot(request(Some(&id)))
            .await
            .unwrap();

        // Then the request is rejected without a session cookie
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(set_cookie_ids(&response).is_empty());
        assert!(body_string(response).await.contains("DomainBinding"));
    }

    #[tokio::test]
    async fn test_missing_key_maps_to_not_found() {
        let state = test_state(memory_cache_store(), None);
        let req = http::Request::builder()
            .uri("/missing")
            .body(Body::empty())
            .unwrap();

        let response = app(state).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        // The identifier cookie is still delivered
        assert_eq!(set_cookie_ids(&response).len(), 1);
    }

    #[tokio::test]
    async fn test_handler_without_layer_fails() {
        let router = Router::new().route("/", get(counter));

        let response = router.oneshot(request(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
