use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::UtilError;

/// Cookie SameSite attribute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    #[default]
    Strict,
    Lax,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "Strict"),
            Self::Lax => write!(f, "Lax"),
        }
    }
}

impl FromStr for SameSite {
    type Err = UtilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("strict") {
            Ok(Self::Strict)
        } else if s.eq_ignore_ascii_case("lax") {
            Ok(Self::Lax)
        } else {
            Err(UtilError::Format(format!(
                "SameSite must be Strict or Lax, got \"{s}\""
            )))
        }
    }
}

/// Attributes attached to every cookie line an encoder produces.
///
/// The encoder takes its own copy at construction, so every line it emits uses
/// the same snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieOptions {
    pub secure: bool,
    pub http_only: bool,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub max_age: Option<NonZeroU64>,
    pub same_site: SameSite,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            secure: true,
            http_only: true,
            path: None,
            domain: None,
            max_age: None,
            same_site: SameSite::Strict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_options_default() {
        let options = CookieOptions::default();

        assert!(options.secure);
        assert!(options.http_only);
        assert_eq!(options.path, None);
        assert_eq!(options.domain, None);
        assert_eq!(options.max_age, None);
        assert_eq!(options.same_site, SameSite::Strict);
    }

    #[test]
    fn test_same_site_display() {
        assert_eq!(SameSite::Strict.to_string(), "Strict");
        assert_eq!(SameSite::Lax.to_string(), "Lax");
    }

    #[test]
    fn test_same_site_from_str() {
        assert_eq!("Strict".parse::<SameSite>().unwrap(), SameSite::Strict);
        assert_eq!("lax".parse::<SameSite>().unwrap(), SameSite::Lax);
        assert_eq!("LAX".parse::<SameSite>().unwrap(), SameSite::Lax);

        let err = "None".parse::<SameSite>().unwrap_err();
        assert!(err.to_string().contains("SameSite must be Strict or Lax"));
    }

    #[test]
    fn test_cookie_options_deserialize_with_zero_max_age_fails() {
        // Max-Age must be positive
        let json = r#"{"secure":true,"http_only":true,"path":null,"domain":null,"max_age":0,"same_site":"Lax"}"#;
        assert!(serde_json::from_str::<CookieOptions>(json).is_err());
    }
}
