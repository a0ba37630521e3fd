//! cookie_session_axum - Axum integration for cookie_session
//!
//! Add [`session_middleware`] to a router with
//! `axum::middleware::from_fn_with_state` and take a [`SessionHandle`] in
//! handlers.

mod error;
mod middleware;
mod session;

pub use error::{IntoResponseError, SessionRejection};
pub use middleware::{SessionLayerState, session_middleware};
pub use session::{RequestSession, SessionHandle};

// Re-export what applications need to configure and use sessions
pub use cookie_session::{
    BindingDimension, CookieOptions, SameSite, SessionError, SessionOptions, SharedCacheStore,
    init_cache_store, memory_cache_store,
};
