use http::header::{HeaderMap, HeaderName, HeaderValue};

use super::types::{HeaderTransport, starts_with_ignore_ascii_case};

/// `None` for values carrying opaque (non-visible-ASCII) bytes.
fn render_line(name: &HeaderName, value: &HeaderValue) -> Option<String> {
    value.to_str().ok().map(|value| format!("{name}: {value}"))
}

/// Response headers as a transport. Names come back in their canonical
/// lower-case form from [`HeaderTransport::list_all`].
///
/// Values with opaque bytes cannot be represented as lines: they are left out
/// of `list_all` and never removed, so their bytes are not rewritten.
impl HeaderTransport for HeaderMap {
    fn append(&mut self, line: String) {
        let Some((name, value)) = line.split_once(':') else {
            tracing::error!("Dropping malformed header line without ':' separator");
            return;
        };

        let name = match HeaderName::from_bytes(name.trim().as_bytes()) {
            Ok(name) => name,
            Err(e) => {
                tracing::error!("Dropping header line with invalid name: {}", e);
                return;
            }
        };

        let value = match HeaderValue::from_str(value.trim()) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Dropping {} header line with invalid value: {}", name, e);
                return;
            }
        };

        HeaderMap::append(self, name, value);
    }

    fn remove_all_with_prefix(&mut self, prefix: &str) {
        let kept: Vec<(HeaderName, HeaderValue)> = self
            .iter()
            .filter(|(name, value)| {
                !render_line(name, value)
                    .is_some_and(|line| starts_with_ignore_ascii_case(&line, prefix))
            })
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        self.clear();
        for (name, value) in kept {
            HeaderMap::append(self, name, value);
        }
    }

    fn list_all(&self) -> Vec<String> {
        self.iter()
            .filter_map(|(name, value)| render_line(name, value))
            .collect()
    }
}
