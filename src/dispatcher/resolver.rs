use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::{Handler, Reply};
use crate::http::{Request, Response};
use crate::router::{handler, Arguments};

/// Turns a route's `Controller@method` reference into a callable.
///
/// Resolution is explicit: the dispatcher only ever calls what a resolver
/// hands back, it never looks names up on its own.
pub trait ActionResolver: Send + Sync {
    fn resolve(&self, identifier: &str) -> Option<Handler>;
}

/// Resolver backed by a map of fully-qualified identifiers.
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    actions: HashMap<String, Handler>,
}

impl ControllerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` for `identifier` (e.g. `App\Controller\IndexController@index`).
    ///
    /// A later registration for the same identifier replaces the earlier one.
    pub fn register<F, R>(&mut self, identifier: impl Into<String>, f: F)
    where
        F: Fn(&Request, &mut Response, &Arguments) -> anyhow::Result<R> + Send + Sync + 'static,
        R: Into<Reply>,
    {
        let identifier = identifier.into().trim_start_matches('\\').to_string();
        if self.actions.insert(identifier.clone(), handler(f)).is_some() {
            warn!(
                action = %identifier,
                total_actions = self.actions.len(),
                "Replaced existing action"
            );
        } else {
            info!(
                action = %identifier,
                total_actions = self.actions.len(),
                "Action registered"
            );
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl ActionResolver for ControllerRegistry {
    fn resolve(&self, identifier: &str) -> Option<Handler> {
        self.actions
            .get(identifier.trim_start_matches('\\'))
            .map(Arc::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn resolves_registered_identifiers() {
        let mut registry = ControllerRegistry::new();
        registry.register("App\\Home@index", |_: &Request, _: &mut Response, _: &Arguments| {
            Ok("home")
        });
        assert!(registry.resolve("App\\Home@index").is_some());
        assert!(registry.resolve("\\App\\Home@index").is_some());
        assert!(registry.resolve("App\\Home@other").is_none());

        let action = registry.resolve("App\\Home@index").unwrap();
        let reply = action(
            &Request::new(Method::GET, "/"),
            &mut Response::new(),
            &Arguments::new(),
        )
        .unwrap();
        assert!(matches!(reply, Reply::Text(ref s) if s == "home"));
    }
}
