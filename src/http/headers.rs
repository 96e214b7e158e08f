use smallvec::SmallVec;

/// Values stored under one header name. Most headers carry a single value.
pub type HeaderValues = SmallVec<[String; 2]>;

/// Ordered, case-insensitive, multi-valued header storage.
///
/// Keys are kept in lowercase; display casing (`Content-Type`) is applied
/// only when the response is emitted, see [`display_name`]. Insertion order
/// of distinct names is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, HeaderValues)>,
}

impl HeaderMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Replace every value of `name` with `value`.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let mut values = HeaderValues::new();
        values.push(value.into());
        match self.position(name) {
            Some(idx) => self.entries[idx].1 = values,
            None => self.entries.push((name.to_ascii_lowercase(), values)),
        }
    }

    /// Add `value` after any existing values of `name`.
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        match self.position(name) {
            Some(idx) => self.entries[idx].1.push(value.into()),
            None => {
                let mut values = HeaderValues::new();
                values.push(value.into());
                self.entries.push((name.to_ascii_lowercase(), values));
            }
        }
    }

    /// First value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    #[must_use]
    pub fn get_all(&self, name: &str) -> Option<&[String]> {
        self.position(name).map(|idx| self.entries[idx].1.as_slice())
    }

    /// All values of `name` joined with `,` as they go on the wire.
    #[must_use]
    pub fn get_line(&self, name: &str) -> Option<String> {
        self.get_all(name).map(|values| values.join(","))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<HeaderValues> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(lowercase name, values)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Capitalize each hyphen-separated segment: `x-request-id` -> `X-Request-Id`.
#[must_use]
pub fn display_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, segment) in name.split('-').enumerate() {
        if i > 0 {
            out.push('-');
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
