//! Radix tree for `{param}` route patterns
//!
//! Paths are split into segments; each node represents one segment:
//! - Static segments (e.g., `users`) match exactly and win over parameters
//! - Parameter segments (e.g., `{id}`) match any single segment
//! - Routes are stored at terminal nodes, keyed by HTTP method
//!
//! Lookup is O(k) in the number of path segments. Exact, parameter-free
//! paths never reach the tree; the [`RouteTable`](super::RouteTable) keeps
//! them in a hash map.

use http::Method;
use std::collections::HashMap;
use std::sync::Arc;

use super::core::ParamVec;
use super::route::Route;

/// Node in the radix tree
#[derive(Clone, Default)]
struct RadixNode {
    /// The path segment this node represents (without leading /)
    segment: String,
    /// Routes terminating at this node, per HTTP method
    routes: HashMap<Method, Arc<Route>>,
    /// Parameter name if this node is a `{param}` segment
    param_name: Option<Arc<str>>,
    /// Static children
    children: Vec<RadixNode>,
    /// Parameter children. Several are allowed at the same position so
    /// `/users/{id}/posts` and `/users/{user_id}/comments` keep their own
    /// parameter names.
    param_children: Vec<RadixNode>,
}

impl RadixNode {
    fn new(segment: &str) -> Self {
        Self {
            segment: segment.to_string(),
            ..Self::default()
        }
    }

    fn new_param(param_name: &str) -> Self {
        Self {
            param_name: Some(Arc::from(param_name)),
            ..Self::default()
        }
    }

    fn insert(&mut self, segments: &[&str], method: Method, route: Arc<Route>) {
        let Some((segment, remaining)) = segments.split_first() else {
            self.routes.insert(method, route);
            return;
        };

        if let Some(name) = param_name(segment) {
            if let Some(child) = self
                .param_children
                .iter_mut()
                .find(|c| c.param_name.as_deref() == Some(name))
            {
                return child.insert(remaining, method, route);
            }
            let mut child = RadixNode::new_param(name);
            child.insert(remaining, method, route);
            self.param_children.push(child);
            return;
        }

        if let Some(child) = self.children.iter_mut().find(|c| c.segment == *segment) {
            return child.insert(remaining, method, route);
        }
        let mut child = RadixNode::new(segment);
        child.insert(remaining, method, route);
        self.children.push(child);
    }

    /// Drop the route for `method` at the node spelled exactly by `segments`.
    fn remove(&mut self, segments: &[&str], method: &Method) {
        let Some((segment, remaining)) = segments.split_first() else {
            self.routes.remove(method);
            return;
        };
        let child = match param_name(segment) {
            Some(name) => self
                .param_children
                .iter_mut()
                .find(|c| c.param_name.as_deref() == Some(name)),
            None => self.children.iter_mut().find(|c| c.segment == *segment),
        };
        if let Some(child) = child {
            child.remove(remaining, method);
        }
    }

    fn search(&self, segments: &[&str], method: &Method, params: &mut ParamVec) -> Option<Arc<Route>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.routes.get(method).cloned();
        };

        for child in &self.children {
            if child.segment == *segment {
                if let Some(route) = child.search(remaining, method, params) {
                    return Some(route);
                }
            }
        }

        for param_child in &self.param_children {
            if let Some(name) = &param_child.param_name {
                params.push((Arc::clone(name), (*segment).to_string()));
                if let Some(route) = param_child.search(remaining, method, params) {
                    return Some(route);
                }
                // Backtrack
                params.pop();
            }
        }

        None
    }

    /// Collect every method registered at a node reachable by `segments`.
    fn collect_methods(&self, segments: &[&str], out: &mut Vec<Method>) {
        let Some((segment, remaining)) = segments.split_first() else {
            for method in self.routes.keys() {
                if !out.contains(method) {
                    out.push(method.clone());
                }
            }
            return;
        };
        for child in self.children.iter().filter(|c| c.segment == *segment) {
            child.collect_methods(remaining, out);
        }
        for param_child in &self.param_children {
            param_child.collect_methods(remaining, out);
        }
    }
}

fn split(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn param_name(segment: &str) -> Option<&str> {
    segment.strip_prefix('{').and_then(|s| s.strip_suffix('}'))
}

/// Pattern with parameter names erased: `/users/{id}` and `/users/{uid}`
/// both become `users/{}`.
fn shape(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| if param_name(s).is_some() { "{}" } else { *s })
        .collect::<Vec<_>>()
        .join("/")
}

/// Radix tree-based matcher for parameterized routes
///
/// Patterns that differ only in parameter names match the same requests,
/// so they count as the same route: the later one replaces the earlier.
#[derive(Clone, Default)]
pub(crate) struct RadixRouter {
    root: RadixNode,
    by_shape: HashMap<(Method, String), Arc<Route>>,
}

impl RadixRouter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert `route` for each of its methods. Returns the routes it replaced.
    pub(crate) fn insert(&mut self, route: &Arc<Route>) -> Vec<Arc<Route>> {
        let segments = split(route.path());
        let pattern = shape(&segments);
        let mut replaced = Vec::new();
        for method in route.methods() {
            let key = (method.clone(), pattern.clone());
            if let Some(previous) = self.by_shape.insert(key, Arc::clone(route)) {
                if previous.path() != route.path() {
                    self.root.remove(&split(previous.path()), method);
                }
                replaced.push(previous);
            }
            self.root.insert(&segments, method.clone(), Arc::clone(route));
        }
        replaced
    }

    /// Match `method` and `path`, extracting path parameters in order.
    pub(crate) fn route(&self, method: &Method, path: &str) -> Option<(Arc<Route>, ParamVec)> {
        let segments = split(path);
        let mut params = ParamVec::new();
        let route = self.root.search(&segments, method, &mut params)?;
        Some((route, params))
    }

    /// Methods registered for any pattern matching `path`.
    pub(crate) fn allowed(&self, path: &str) -> Vec<Method> {
        let mut out = Vec::new();
        self.root.collect_methods(&split(path), &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::RawAction;

    fn route(method: Method, path: &str, target: &str) -> Arc<Route> {
        Arc::new(Route::build(&[method], path, RawAction::from(target), None).unwrap())
    }

    fn param<'a>(params: &'a ParamVec, name: &str) -> Option<&'a str> {
        params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    fn target(route: &Route) -> String {
        route.action().to_string()
    }

    #[test]
    fn test_radix_router_with_parameter() {
        let mut router = RadixRouter::new();
        router.insert(&route(Method::GET, "/users/{id}", "User@show"));

        let (r, params) = router.route(&Method::GET, "/users/123").unwrap();
        assert_eq!(target(&r), "User@show");
        assert_eq!(param(&params, "id"), Some("123"));
    }

    #[test]
    fn test_radix_router_multiple_parameters() {
        let mut router = RadixRouter::new();
        router.insert(&route(Method::GET, "/users/{user_id}/posts/{post_id}", "Post@show"));

        let (_, params) = router.route(&Method::GET, "/users/123/posts/456").unwrap();
        assert_eq!(param(&params, "user_id"), Some("123"));
        assert_eq!(param(&params, "post_id"), Some("456"));
    }

    #[test]
    fn test_radix_router_method_filtering() {
        let mut router = RadixRouter::new();
        router.insert(&route(Method::GET, "/items/{id}", "Item@show"));
        router.insert(&route(Method::POST, "/items/{id}", "Item@update"));

        assert_eq!(target(&router.route(&Method::GET, "/items/1").unwrap().0), "Item@show");
        assert_eq!(target(&router.route(&Method::POST, "/items/1").unwrap().0), "Item@update");
        assert!(router.route(&Method::PUT, "/items/1").is_none());

        let mut allowed = router.allowed("/items/1");
        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        assert_eq!(allowed, vec![Method::GET, Method::POST]);
    }

    #[test]
    fn static_segment_wins_over_parameter() {
        let mut router = RadixRouter::new();
        router.insert(&route(Method::GET, "/users/{id}", "User@show"));
        router.insert(&route(Method::GET, "/users/me", "User@me"));

        let (r, params) = router.route(&Method::GET, "/users/me").unwrap();
        assert_eq!(target(&r), "User@me");
        assert!(params.is_empty());
    }

    #[test]
    fn failed_branch_backtracks_params() {
        let mut router = RadixRouter::new();
        router.insert(&route(Method::GET, "/users/{user_id}/posts", "Post@index"));
        router.insert(&route(Method::GET, "/users/{id}/comments", "Comment@index"));

        let (r, params) = router.route(&Method::GET, "/users/456/comments").unwrap();
        assert_eq!(target(&r), "Comment@index");
        assert_eq!(param(&params, "id"), Some("456"));
        assert!(param(&params, "user_id").is_none());
    }

    #[test]
    fn renamed_parameter_replaces_equivalent_pattern() {
        let mut router = RadixRouter::new();
        router.insert(&route(Method::GET, "/users/{id}", "User@first"));
        router.insert(&route(Method::POST, "/users/{id}", "User@store"));
        let replaced = router.insert(&route(Method::GET, "/users/{uid}", "User@second"));
        assert_eq!(replaced.len(), 1);
        assert_eq!(target(&replaced[0]), "User@first");

        let (r, params) = router.route(&Method::GET, "/users/5").unwrap();
        assert_eq!(target(&r), "User@second");
        assert_eq!(param(&params, "uid"), Some("5"));
        assert!(param(&params, "id").is_none());
        assert_eq!(target(&router.route(&Method::POST, "/users/5").unwrap().0), "User@store");

        let mut allowed = router.allowed("/users/5");
        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        assert_eq!(allowed, vec![Method::GET, Method::POST]);
    }

    #[test]
    fn reinsert_reports_replacement() {
        let mut router = RadixRouter::new();
        assert!(router.insert(&route(Method::GET, "/a/{x}", "A@one")).is_empty());
        let replaced = router.insert(&route(Method::GET, "/a/{x}", "A@two"));
        assert_eq!(replaced.len(), 1);
        assert_eq!(target(&router.route(&Method::GET, "/a/1").unwrap().0), "A@two");
    }
}
