//! Central configuration for the cookie_session crate
//!
//! Every value is read once from the environment and falls back to a default
//! when the variable is missing or cannot be parsed.

use std::sync::LazyLock;

/// Built-in name of the session identifier cookie.
///
/// Default: "SessionId"
pub static SESSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    std::env::var("SESSION_COOKIE_NAME")
        .ok()
        .unwrap_or("SessionId".to_string())
});

/// Absolute session lifetime in seconds. `0` disables absolute expiry.
///
/// Default: 28800 (8 hours)
pub static SESSION_EXPIRY_SECS: LazyLock<u64> =
    LazyLock::new(|| parse_secs("SESSION_EXPIRY_SECS", 8 * 60 * 60));

/// Interval after which the session identifier is rotated.
///
/// Default: 3600 (1 hour)
pub static SESSION_CANARY_EXPIRY_SECS: LazyLock<u64> =
    LazyLock::new(|| parse_secs("SESSION_CANARY_EXPIRY_SECS", 60 * 60));

/// TTL applied to session records in the cache store.
///
/// Default: the absolute session lifetime, or 24 hours when that is disabled.
pub static SESSION_STORE_TTL_SECS: LazyLock<u64> = LazyLock::new(|| {
    parse_secs(
        "SESSION_STORE_TTL_SECS",
        store_ttl_fallback(*SESSION_EXPIRY_SECS),
    )
});

/// Cache store backend: "memory" or "redis".
pub static SESSION_STORE_TYPE: LazyLock<String> = LazyLock::new(|| {
    std::env::var("SESSION_STORE_TYPE")
        .ok()
        .unwrap_or("memory".to_string())
});

/// Connection URL, only used by the redis backend.
pub static SESSION_STORE_URL: LazyLock<String> = LazyLock::new(|| {
    std::env::var("SESSION_STORE_URL")
        .ok()
        .unwrap_or("redis://127.0.0.1:6379".to_string())
});

fn store_ttl_fallback(session_expiry_secs: u64) -> u64 {
    match session_expiry_secs {
        0 => 24 * 60 * 60,
        secs => secs,
    }
}

fn parse_secs(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
