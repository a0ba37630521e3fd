mod encoder;
mod types;

pub use encoder::{Cookie, SET_COOKIE_PREFIX, format_set_cookie};
pub use types::{CookieOptions, SameSite};
