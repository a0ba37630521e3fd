/// Outgoing response header lines queued for the current request.
///
/// Lines are complete `Name: value` strings. Implementations keep them in
/// insertion order.
pub trait HeaderTransport {
    /// Queue a header line. Existing lines are never replaced.
    fn append(&mut self, line: String);

    /// Remove every queued line starting with `prefix`, compared ASCII case-insensitively.
    fn remove_all_with_prefix(&mut self, prefix: &str);

    /// All queued lines in insertion order.
    fn list_all(&self) -> Vec<String>;
}

impl<T: HeaderTransport + ?Sized> HeaderTransport for &mut T {
    fn append(&mut self, line: String) {
        (**self).append(line);
    }

    fn remove_all_with_prefix(&mut self, prefix: &str) {
        (**self).remove_all_with_prefix(prefix);
    }

    fn list_all(&self) -> Vec<String> {
        (**self).list_all()
    }
}

/// Ordered collection of pending header lines owned by one request/response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    lines: Vec<String>,
}

impl HeaderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Move every queued line into `target`, leaving this list empty.
    pub fn drain_into<T: HeaderTransport + ?Sized>(&mut self, target: &mut T) {
        for line in self.lines.drain(..) {
            target.append(line);
        }
    }
}

impl HeaderTransport for HeaderList {
    fn append(&mut self, line: String) {
        self.lines.push(line);
    }

    fn remove_all_with_prefix(&mut self, prefix: &str) {
        self.lines
            .retain(|line| !starts_with_ignore_ascii_case(line, prefix));
    }

    fn list_all(&self) -> Vec<String> {
        self.lines.clone()
    }
}

pub(crate) fn starts_with_ignore_ascii_case(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
