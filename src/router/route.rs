use http::Method;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::group::{split_middleware, GroupAttributes};
use super::path::normalize_path;
use crate::dispatcher::{Handler, Reply};
use crate::error::ValidationError;
use crate::http::{Request, Response};

/// Named values handed to an action: route defaults first, then path
/// parameters bound at match time.
pub type Arguments = BTreeMap<String, Value>;

/// What a route invokes once its pipeline reaches the terminal step.
#[derive(Clone)]
pub enum Action {
    /// An inline handler.
    Closure(Handler),
    /// A `Controller@method` style reference resolved at dispatch time
    /// through an [`ActionResolver`](crate::dispatcher::ActionResolver).
    Reference { identifier: String },
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Closure(_) => f.write_str("Closure"),
            Action::Reference { identifier } => {
                f.debug_struct("Reference").field("identifier", identifier).finish()
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Closure(_) => f.write_str("Closure"),
            Action::Reference { identifier } => f.write_str(identifier),
        }
    }
}

/// Action descriptor with per-route middleware and default arguments.
///
/// `uses` must be set; a descriptor without a callable target is rejected
/// at registration.
#[derive(Clone)]
pub struct ActionSpec {
    uses: Option<Action>,
    middleware: Vec<String>,
    defaults: Arguments,
}

impl Default for ActionSpec {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionSpec {
    #[must_use]
    pub fn new() -> Self {
        Self {
            uses: None,
            middleware: Vec::new(),
            defaults: Arguments::new(),
        }
    }

    /// Target a `Controller@method` reference.
    #[must_use]
    pub fn uses(mut self, identifier: impl Into<String>) -> Self {
        self.uses = Some(Action::Reference {
            identifier: identifier.into(),
        });
        self
    }

    /// Target an inline handler.
    #[must_use]
    pub fn handler<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&Request, &mut Response, &Arguments) -> anyhow::Result<R> + Send + Sync + 'static,
        R: Into<Reply>,
    {
        self.uses = Some(Action::Closure(handler(f)));
        self
    }

    #[must_use]
    pub fn middleware<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.middleware.extend(split_middleware(names));
        self
    }

    #[must_use]
    pub fn with_default(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }
}

/// Any of the accepted ways of declaring a route action.
#[derive(Clone)]
pub enum RawAction {
    Closure(Handler),
    Reference(String),
    Spec(ActionSpec),
}

impl RawAction {
    /// Wrap an inline handler.
    pub fn closure<F, R>(f: F) -> Self
    where
        F: Fn(&Request, &mut Response, &Arguments) -> anyhow::Result<R> + Send + Sync + 'static,
        R: Into<Reply>,
    {
        RawAction::Closure(handler(f))
    }
}

impl From<&str> for RawAction {
    fn from(identifier: &str) -> Self {
        RawAction::Reference(identifier.to_string())
    }
}

impl From<String> for RawAction {
    fn from(identifier: String) -> Self {
        RawAction::Reference(identifier)
    }
}

impl From<ActionSpec> for RawAction {
    fn from(spec: ActionSpec) -> Self {
        RawAction::Spec(spec)
    }
}

impl From<Handler> for RawAction {
    fn from(handler: Handler) -> Self {
        RawAction::Closure(handler)
    }
}

/// Box a closure as a [`Handler`], converting its return value to a [`Reply`].
pub fn handler<F, R>(f: F) -> Handler
where
    F: Fn(&Request, &mut Response, &Arguments) -> anyhow::Result<R> + Send + Sync + 'static,
    R: Into<Reply>,
{
    Arc::new(move |req: &Request, res: &mut Response, args: &Arguments| {
        f(req, res, args).map(Into::<Reply>::into)
    })
}

/// A registered route: methods, canonical path, action, effective
/// middleware and default arguments.
///
/// Group attributes are merged in when the route is built. The route table
/// shares routes behind `Arc`; dispatch works on a clone so bound
/// parameters never leak between requests.
#[derive(Debug, Clone)]
pub struct Route {
    methods: SmallVec<[Method; 2]>,
    path: String,
    action: Action,
    middleware: Vec<String>,
    arguments: Arguments,
}

impl Route {
    /// Build a route, applying `group` attributes when present.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when no method is given, when an action
    /// descriptor carries no callable target, or when a reference is empty.
    pub fn build(
        methods: &[Method],
        raw_path: &str,
        raw_action: RawAction,
        group: Option<&GroupAttributes>,
    ) -> Result<Self, ValidationError> {
        if methods.is_empty() {
            return Err(ValidationError::new(format!(
                "route {raw_path} declares no HTTP method"
            )));
        }

        let (action, action_middleware, defaults) = match raw_action {
            RawAction::Closure(h) => (Action::Closure(h), Vec::new(), Arguments::new()),
            RawAction::Reference(identifier) => (
                Action::Reference { identifier },
                Vec::new(),
                Arguments::new(),
            ),
            RawAction::Spec(spec) => {
                let action = spec.uses.ok_or_else(|| {
                    ValidationError::new(format!("routing callback failed for {raw_path}"))
                })?;
                (action, spec.middleware, spec.defaults)
            }
        };

        let action = match action {
            Action::Reference { identifier } => {
                if identifier.trim().is_empty() {
                    return Err(ValidationError::new(format!(
                        "route {raw_path} has an empty action reference"
                    )));
                }
                let identifier = match group {
                    Some(g) => g.apply_namespace(&identifier),
                    None => identifier.trim_start_matches('\\').to_string(),
                };
                Action::Reference { identifier }
            }
            closure => closure,
        };

        let (path, mut middleware) = match group {
            Some(g) => (g.apply_path(raw_path), g.middleware.clone()),
            None => (normalize_path(raw_path).into_owned(), Vec::new()),
        };
        middleware.extend(action_middleware);

        let mut unique: SmallVec<[Method; 2]> = SmallVec::new();
        for m in methods {
            if !unique.contains(m) {
                unique.push(m.clone());
            }
        }

        Ok(Self {
            methods: unique,
            path,
            action,
            middleware,
            arguments: defaults,
        })
    }

    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    #[must_use]
    pub fn allows(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the path contains `{param}` segments.
    #[must_use]
    pub fn is_pattern(&self) -> bool {
        self.path.contains('{')
    }

    #[must_use]
    pub fn action(&self) -> &Action {
        &self.action
    }

    #[must_use]
    pub fn middleware(&self) -> &[String] {
        &self.middleware
    }

    /// Append middleware names; `|`-separated lists are split.
    pub fn add_middleware<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.middleware.extend(split_middleware(names));
        self
    }

    /// Replace the middleware list.
    pub fn set_middleware<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.middleware = split_middleware(names);
        self
    }

    pub fn reset_middleware(&mut self) -> &mut Self {
        self.middleware.clear();
        self
    }

    #[must_use]
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }

    pub fn set_argument(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// Merge `arguments` over the current ones.
    pub fn set_arguments<I, K, V>(&mut self, arguments: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (k, v) in arguments {
            self.arguments.insert(k.into(), v.into());
        }
        self
    }
}
