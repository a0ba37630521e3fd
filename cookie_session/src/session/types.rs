use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::config::{SESSION_CANARY_EXPIRY_SECS, SESSION_EXPIRY_SECS};
use crate::cookie::CookieOptions;

/// Record key holding the time of the last identifier rotation.
pub const CANARY_KEY: &str = "Canary";
/// Record key holding the time the record was created or last reset.
pub const EXPIRY_KEY: &str = "Expiry";
/// Record key holding the first domain the record was seen with.
pub const DOMAIN_BINDING_KEY: &str = "DomainBinding";
/// Record key holding the first path the record was seen with.
pub const PATH_BINDING_KEY: &str = "PathBinding";

/// Which binding constraint a record violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingDimension {
    Domain,
    Path,
}

impl BindingDimension {
    /// Record key the bound value is stored under.
    pub fn key(self) -> &'static str {
        match self {
            Self::Domain => DOMAIN_BINDING_KEY,
            Self::Path => PATH_BINDING_KEY,
        }
    }
}

impl fmt::Display for BindingDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Settings for one [`Session`](crate::Session).
///
/// Start from [`SessionOptions::default`] and override fields with struct
/// update syntax:
///
/// ```
/// use chrono::Duration;
/// use cookie_session::SessionOptions;
///
/// let options = SessionOptions {
///     canary_expiry: Duration::minutes(15),
///     domain_binding: Some("www.example.org".to_string()),
///     ..Default::default()
/// };
/// assert!(options.cookie.secure);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Attributes of the identifier cookie.
    pub cookie: CookieOptions,
    /// Absolute lifetime of a record. `None` disables absolute expiry.
    pub session_expiry: Option<Duration>,
    /// Interval after which the identifier is rotated.
    pub canary_expiry: Duration,
    pub domain_binding: Option<String>,
    pub path_binding: Option<String>,
    /// Overrides the store's built-in cookie name.
    pub session_name: Option<String>,
}

impl SessionOptions {
    pub fn binding(&self, dimension: BindingDimension) -> Option<&str> {
        match dimension {
            BindingDimension::Domain => self.domain_binding.as_deref(),
            BindingDimension::Path => self.path_binding.as_deref(),
        }
    }
}

fn secs_to_duration(secs: u64) -> Option<Duration> {
    i64::try_from(secs).ok().and_then(Duration::try_seconds)
}

impl Default for SessionOptions {
    fn default() -> Self {
        let session_expiry = match *SESSION_EXPIRY_SECS {
            0 => None,
            secs => Some(secs_to_duration(secs).unwrap_or(Duration::hours(8))),
        };
        let canary_expiry =
            secs_to_duration(*SESSION_CANARY_EXPIRY_SECS).unwrap_or(Duration::hours(1));

        Self {
            cookie: CookieOptions::default(),
            session_expiry,
            canary_expiry,
            domain_binding: None,
            path_binding: None,
            session_name: None,
        }
    }
}
