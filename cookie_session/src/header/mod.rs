mod http_map;
mod types;

pub use types::{HeaderList, HeaderTransport};

pub(crate) use types::starts_with_ignore_ascii_case;
