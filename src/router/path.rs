use std::borrow::Cow;

/// Whether `path` is already canonical: leading `/`, no empty segments, no
/// backslashes, no trailing `/` except for the root.
#[must_use]
pub fn is_canonical(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    path.starts_with('/') && !path.ends_with('/') && !path.contains("//") && !path.contains('\\')
}

/// Normalize a path to canonical form.
///
/// Returns `Cow::Borrowed` when the input is already canonical.
///
/// ```
/// use ant_kernel::router::normalize_path;
///
/// assert_eq!(normalize_path("/users/"), "/users");
/// assert_eq!(normalize_path("users//42"), "/users/42");
/// assert_eq!(normalize_path(""), "/");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_canonical(path) {
        return Cow::Borrowed(path);
    }
    let mut out = String::with_capacity(path.len() + 1);
    for segment in path.split(['/', '\\']).filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    Cow::Owned(out)
}

/// Join path fragments with exactly one `/` between non-empty pieces, no
/// leading or trailing slash.
#[must_use]
pub fn join_segments(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
