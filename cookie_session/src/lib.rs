//! cookie_session - Cookie-bound server-side sessions
//!
//! A [`Session`] owns one request's view of a session record: it resumes or
//! creates the record through a [`SessionStore`], rotates the identifier when
//! its canary goes stale, enforces optional domain/path bindings, discards
//! records past their absolute lifetime, and queues the identifier cookie on a
//! [`HeaderTransport`] through the [`Cookie`] encoder.

mod config;
mod cookie;
mod header;
mod session;
mod storage;
mod utils;

pub use config::{
    SESSION_CANARY_EXPIRY_SECS, SESSION_COOKIE_NAME, SESSION_EXPIRY_SECS, SESSION_STORE_TTL_SECS,
    SESSION_STORE_TYPE, SESSION_STORE_URL,
};

pub use cookie::{Cookie, CookieOptions, SET_COOKIE_PREFIX, SameSite, format_set_cookie};

pub use header::{HeaderList, HeaderTransport};

pub use session::{
    BindingDimension, CANARY_KEY, DOMAIN_BINDING_KEY, EXPIRY_KEY, PATH_BINDING_KEY, Session,
    SessionError, SessionOptions, SessionStore,
};

pub use storage::{
    CacheData, CacheSessionStore, CacheStore, InMemoryCacheStore, RedisCacheStore, SessionRecord,
    SharedCacheStore, StorageError, init_cache_store, memory_cache_store,
};

pub use utils::{UtilError, gen_random_string};
