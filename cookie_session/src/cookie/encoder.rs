use crate::header::{HeaderTransport, starts_with_ignore_ascii_case};

use super::types::CookieOptions;

/// Prefix shared by every line this encoder emits, matched case-insensitively.
pub const SET_COOKIE_PREFIX: &str = "Set-Cookie:";

/// Build a `Set-Cookie` header line.
///
/// Attributes always come out in the order Secure, HttpOnly, Path, Domain,
/// Max-Age, SameSite. `name` and `value` are emitted as given; callers must
/// pass values that are already safe to put in a header.
pub fn format_set_cookie(name: &str, value: &str, options: &CookieOptions) -> String {
    let mut attributes = Vec::with_capacity(6);

    if options.secure {
        attributes.push("Secure".to_string());
    }
    if options.http_only {
        attributes.push("HttpOnly".to_string());
    }
    if let Some(path) = &options.path {
        attributes.push(format!("Path={path}"));
    }
    if let Some(domain) = &options.domain {
        attributes.push(format!("Domain={domain}"));
    }
    if let Some(max_age) = options.max_age {
        attributes.push(format!("Max-Age={max_age}"));
    }
    attributes.push(format!("SameSite={}", options.same_site));

    format!("Set-Cookie: {name}={value}; {}", attributes.join("; "))
}

/// The `name=value` pair at the start of a queued `Set-Cookie` line.
fn cookie_pair(line: &str) -> Option<(&str, &str)> {
    if !starts_with_ignore_ascii_case(line, SET_COOKIE_PREFIX) {
        return None;
    }
    let rest = line.get(SET_COOKIE_PREFIX.len()..)?;
    let pair = rest.split(';').next()?.trim();
    pair.split_once('=')
}

/// Encodes cookies into `Set-Cookie` lines on a [`HeaderTransport`].
#[derive(Debug)]
pub struct Cookie<H> {
    options: CookieOptions,
    headers: H,
}

impl<H: HeaderTransport> Cookie<H> {
    pub fn new(options: CookieOptions, headers: H) -> Self {
        Self { options, headers }
    }

    pub fn options(&self) -> &CookieOptions {
        &self.options
    }

    pub fn headers(&self) -> &H {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut H {
        &mut self.headers
    }

    pub fn into_headers(self) -> H {
        self.headers
    }

    /// Queue a new `Set-Cookie` line. Lines already queued for `name` stay.
    pub fn set(&mut self, name: &str, value: &str) {
        let line = format_set_cookie(name, value, &self.options);
        tracing::trace!("Queueing cookie line for {}", name);
        self.headers.append(line);
    }

    /// Queue a line with an empty value for `name`.
    pub fn delete(&mut self, name: &str) {
        self.set(name, "");
    }

    /// Drop queued lines for exactly `name=value`, then queue it once.
    ///
    /// Lines for the same name with a different value are kept.
    pub fn replace(&mut self, name: &str, value: &str) {
        self.supersede(name, &[], value);
    }

    /// Like [`Cookie::replace`], additionally dropping queued lines carrying
    /// any of the `stale` values for `name`.
    ///
    /// All other `Set-Cookie` lines are re-queued in their original order and
    /// non-cookie headers are left alone.
    pub fn supersede(&mut self, name: &str, stale: &[String], value: &str) {
        let mut preserved = Vec::new();
        let mut dropped = 0usize;

        for line in self.headers.list_all() {
            if !starts_with_ignore_ascii_case(&line, SET_COOKIE_PREFIX) {
                continue;
            }
            let superseded = cookie_pair(&line).is_some_and(|(n, v)| {
                n == name && (v == value || stale.iter().any(|s| s == v))
            });
            if superseded {
                dropped += 1;
            } else {
                preserved.push(line);
            }
        }

        self.headers.remove_all_with_prefix(SET_COOKIE_PREFIX);
        for line in preserved {
            self.headers.append(line);
        }

        if dropped > 0 {
            tracing::trace!("Dropped {} queued cookie line(s) for {}", dropped, name);
        }
        self.set(name, value);
    }
}
