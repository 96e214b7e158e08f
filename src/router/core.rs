use http::Method;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::group::GroupAttributes;
use super::path::normalize_path;
use super::radix::RadixRouter;
use super::route::{RawAction, Route};
use crate::error::ValidationError;

/// Maximum number of path/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Parameter storage: names come from the route tree and are shared via
/// `Arc<str>`, values are per-request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of successfully matching a request to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route as registered
    pub route: Arc<Route>,
    /// Path parameters extracted from the URL (e.g., `{id}` → `("id", "123")`)
    pub path_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics when the same name appears at
    /// several depths.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// A per-request copy of the route with path parameters bound over its
    /// default arguments.
    #[must_use]
    pub fn bind(&self) -> Route {
        let mut route = Route::clone(&self.route);
        route.set_arguments(
            self.path_params
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.clone()))),
        );
        route
    }
}

/// Outcome of a route lookup.
#[derive(Debug, Clone)]
pub enum Lookup {
    Found(RouteMatch),
    NotFound,
    /// The path exists but not for this method.
    MethodNotAllowed(Vec<Method>),
}

/// The route table: registration, groups and lookup.
///
/// Exact paths live in a hash map keyed by canonical path; paths with
/// `{param}` segments go into a radix tree. Exact matches are tried first.
/// Registering the same method and path twice keeps the last route.
#[derive(Clone, Default)]
pub struct RouteTable {
    /// Every registered route in registration order
    routes: Vec<Arc<Route>>,
    exact: HashMap<String, HashMap<Method, Arc<Route>>>,
    radix: RadixRouter,
    /// Merged attributes of the groups currently open
    groups: Vec<GroupAttributes>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            exact: HashMap::new(),
            radix: RadixRouter::new(),
            groups: Vec::new(),
        }
    }

    /// Register a route with explicit group attributes.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the route definition is invalid.
    pub fn register(
        &mut self,
        methods: &[Method],
        raw_path: &str,
        action: impl Into<RawAction>,
        group: Option<&GroupAttributes>,
    ) -> Result<Arc<Route>, ValidationError> {
        let route = Arc::new(Route::build(methods, raw_path, action.into(), group)?);

        let replaced = if route.is_pattern() {
            self.radix.insert(&route).len()
        } else {
            let by_method = self.exact.entry(route.path().to_string()).or_default();
            route
                .methods()
                .iter()
                .filter(|m| by_method.insert((*m).clone(), Arc::clone(&route)).is_some())
                .count()
        };

        if replaced > 0 {
            warn!(
                methods = ?route.methods(),
                path = %route.path(),
                "Replaced existing route"
            );
        } else {
            debug!(
                methods = ?route.methods(),
                path = %route.path(),
                action = %route.action(),
                middleware = ?route.middleware(),
                "Route registered"
            );
        }

        self.routes.push(Arc::clone(&route));
        Ok(route)
    }

    /// Register a route under the innermost open group.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the route definition is invalid.
    pub fn map(
        &mut self,
        methods: &[Method],
        raw_path: &str,
        action: impl Into<RawAction>,
    ) -> Result<Arc<Route>, ValidationError> {
        let group = self.groups.last().cloned();
        self.register(methods, raw_path, action, group.as_ref())
    }

    /// Register a GET route.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the route definition is invalid.
    pub fn get(&mut self, path: &str, action: impl Into<RawAction>) -> Result<Arc<Route>, ValidationError> {
        self.map(&[Method::GET], path, action)
    }

    /// Register a POST route.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the route definition is invalid.
    pub fn post(&mut self, path: &str, action: impl Into<RawAction>) -> Result<Arc<Route>, ValidationError> {
        self.map(&[Method::POST], path, action)
    }

    /// Register a PUT route.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the route definition is invalid.
    pub fn put(&mut self, path: &str, action: impl Into<RawAction>) -> Result<Arc<Route>, ValidationError> {
        self.map(&[Method::PUT], path, action)
    }

    /// Register a PATCH route.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the route definition is invalid.
    pub fn patch(&mut self, path: &str, action: impl Into<RawAction>) -> Result<Arc<Route>, ValidationError> {
        self.map(&[Method::PATCH], path, action)
    }

    /// Register a DELETE route.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the route definition is invalid.
    pub fn delete(&mut self, path: &str, action: impl Into<RawAction>) -> Result<Arc<Route>, ValidationError> {
        self.map(&[Method::DELETE], path, action)
    }

    /// Register an OPTIONS route.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the route definition is invalid.
    pub fn options(&mut self, path: &str, action: impl Into<RawAction>) -> Result<Arc<Route>, ValidationError> {
        self.map(&[Method::OPTIONS], path, action)
    }

    /// Register a route for every common method.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the route definition is invalid.
    pub fn any(&mut self, path: &str, action: impl Into<RawAction>) -> Result<Arc<Route>, ValidationError> {
        self.map(
            &[
                Method::GET,
                Method::HEAD,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ],
            path,
            action,
        )
    }

    /// Open a group nested in the current one and run `routes` inside it.
    ///
    /// The group is closed again even when `routes` fails.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `routes`.
    pub fn group<F>(&mut self, attrs: GroupAttributes, routes: F) -> Result<(), ValidationError>
    where
        F: FnOnce(&mut RouteTable) -> Result<(), ValidationError>,
    {
        let merged = match self.groups.last() {
            Some(outer) => outer.merge(&attrs),
            None => attrs,
        };
        self.groups.push(merged);
        let result = routes(self);
        self.groups.pop();
        result
    }

    /// Find the route for `method` and `path`.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup {
        let path = normalize_path(path);

        let exact = self.exact.get(path.as_ref());
        if let Some(route) = exact.and_then(|m| m.get(method)) {
            debug!(method = %method, path = %path, "Route matched");
            return Lookup::Found(RouteMatch {
                route: Arc::clone(route),
                path_params: ParamVec::new(),
            });
        }

        if let Some((route, path_params)) = self.radix.route(method, &path) {
            debug!(
                method = %method,
                path = %path,
                route_pattern = %route.path(),
                path_params = ?path_params,
                "Route matched"
            );
            return Lookup::Found(RouteMatch { route, path_params });
        }

        let mut allowed: Vec<Method> = exact
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        for m in self.radix.allowed(&path) {
            if !allowed.contains(&m) {
                allowed.push(m);
            }
        }

        if allowed.is_empty() {
            debug!(method = %method, path = %path, "No route matched");
            Lookup::NotFound
        } else {
            allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            debug!(method = %method, path = %path, allowed = ?allowed, "Method not allowed");
            Lookup::MethodNotAllowed(allowed)
        }
    }

    /// Find the route for `method` and `path`, folding every miss into `None`.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        match self.lookup(method, path) {
            Lookup::Found(m) => Some(m),
            Lookup::NotFound | Lookup::MethodNotAllowed(_) => None,
        }
    }

    /// Every registered route in registration order, including ones later
    /// replaced by a duplicate registration.
    #[must_use]
    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Middleware names referenced by any route.
    #[must_use]
    pub fn middleware_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.routes.iter().flat_map(|r| r.middleware()) {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }

    /// Log a summary of the table.
    pub fn log_summary(&self) {
        let summary: Vec<String> = self
            .routes
            .iter()
            .take(10)
            .map(|r| format!("{:?} {}", r.methods(), r.path()))
            .collect();
        info!(
            routes_count = self.routes.len(),
            routes_summary = ?summary,
            "Routing table loaded"
        );
    }

    /// Write one line per route: methods, path, action and middleware.
    ///
    /// # Errors
    ///
    /// Propagates write errors from `out`.
    pub fn dump(&self, out: &mut impl std::io::Write) -> std::io::Result<()> {
        writeln!(out, "[routes] count={}", self.routes.len())?;
        for route in &self.routes {
            let methods: Vec<&str> = route.methods().iter().map(Method::as_str).collect();
            writeln!(
                out,
                "[route] {} {} -> {} [{}]",
                methods.join("|"),
                route.path(),
                route.action(),
                route.middleware().join(",")
            )?;
        }
        Ok(())
    }
}
