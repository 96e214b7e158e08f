use super::path::{join_segments, normalize_path};

/// Split middleware names given as `"auth|cors"` into separate entries.
pub(crate) fn split_middleware<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .flat_map(|n| {
            n.as_ref()
                .split('|')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Attributes shared by every route declared inside a group.
///
/// They are merged into each [`Route`](super::Route) when it is built; the
/// route keeps no link back to its group.
///
/// ```
/// use ant_kernel::router::GroupAttributes;
///
/// let outer = GroupAttributes::new().prefix("/api").middleware(["auth"]);
/// let inner = GroupAttributes::new().prefix("v1/").middleware(["cors|auth"]);
/// let merged = outer.merge(&inner);
///
/// assert_eq!(merged.prefix, "api/v1");
/// assert_eq!(merged.middleware, vec!["auth", "cors"]);
/// assert_eq!(merged.apply_path("users/"), "/api/v1/users");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupAttributes {
    pub prefix: String,
    pub suffix: String,
    pub namespace: String,
    pub middleware: Vec<String>,
}

impl GroupAttributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn prefix(mut self, prefix: impl AsRef<str>) -> Self {
        self.prefix = join_segments(&[prefix.as_ref()]);
        self
    }

    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn namespace(mut self, namespace: impl AsRef<str>) -> Self {
        self.namespace = namespace.as_ref().trim_matches('\\').to_string();
        self
    }

    /// Append middleware names; `|`-separated lists are split.
    #[must_use]
    pub fn middleware<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in split_middleware(names) {
            if !self.middleware.contains(&name) {
                self.middleware.push(name);
            }
        }
        self
    }

    /// Attributes for a group nested inside `self`.
    ///
    /// Prefixes and suffixes concatenate, namespaces nest with `\` unless the
    /// inner namespace is fully qualified, and middleware is the ordered
    /// union (outer first).
    #[must_use]
    pub fn merge(&self, inner: &GroupAttributes) -> GroupAttributes {
        let namespace = if inner.namespace.is_empty() {
            self.namespace.clone()
        } else if self.namespace.is_empty() {
            inner.namespace.clone()
        } else {
            format!("{}\\{}", self.namespace, inner.namespace)
        };

        let mut middleware = self.middleware.clone();
        for name in &inner.middleware {
            if !middleware.contains(name) {
                middleware.push(name.clone());
            }
        }

        GroupAttributes {
            prefix: join_segments(&[&self.prefix, &inner.prefix]),
            suffix: format!("{}{}", self.suffix, inner.suffix),
            namespace,
            middleware,
        }
    }

    /// Effective path for `raw` declared inside this group.
    #[must_use]
    pub fn apply_path(&self, raw: &str) -> String {
        let joined = format!(
            "{}/{}{}",
            self.prefix.trim_matches('/'),
            raw.trim_matches('/'),
            self.suffix
        );
        normalize_path(&joined).into_owned()
    }

    /// Qualify an action reference with this group's namespace.
    ///
    /// References starting with `\` are already fully qualified and only
    /// lose the leading separator.
    #[must_use]
    pub fn apply_namespace(&self, identifier: &str) -> String {
        if let Some(qualified) = identifier.strip_prefix('\\') {
            return qualified.to_string();
        }
        if self.namespace.is_empty() {
            identifier.to_string()
        } else {
            format!("{}\\{}", self.namespace, identifier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_prefixes_concatenate() {
        let a = GroupAttributes::new().prefix("a");
        let b = GroupAttributes::new().prefix("/b/");
        let merged = a.merge(&b);
        assert_eq!(merged.prefix, "a/b");
        assert_eq!(merged.apply_path("x"), "/a/b/x");
    }

    #[test]
    fn suffix_is_appended_verbatim() {
        let group = GroupAttributes::new().prefix("/app").suffix(".json");
        assert_eq!(group.apply_path("/users"), "/app/users.json");
    }

    #[test]
    fn empty_group_normalizes_only() {
        let group = GroupAttributes::new();
        assert_eq!(group.apply_path("/x/"), "/x");
        assert_eq!(group.apply_path(""), "/");
    }

    #[test]
    fn namespaces_nest_and_qualify() {
        let outer = GroupAttributes::new().namespace("App\\");
        let inner = GroupAttributes::new().namespace("Controller");
        let merged = outer.merge(&inner);
        assert_eq!(merged.namespace, "App\\Controller");
        assert_eq!(
            merged.apply_namespace("IndexController@index"),
            "App\\Controller\\IndexController@index"
        );
        assert_eq!(
            merged.apply_namespace("\\Other\\Ctl@run"),
            "Other\\Ctl@run"
        );
    }

    #[test]
    fn middleware_union_keeps_outer_first() {
        let outer = GroupAttributes::new().middleware(["auth|log"]);
        let inner = GroupAttributes::new().middleware(["cors", "auth"]);
        assert_eq!(outer.merge(&inner).middleware, vec!["auth", "log", "cors"]);
    }
}
