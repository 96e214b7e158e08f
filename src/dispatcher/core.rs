use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, error, info};

use super::resolver::ActionResolver;
use super::Handler;
use crate::error::{RoutingError, ValidationError};
use crate::http::{Request, Response};
use crate::middleware::MiddlewareRegistry;
use crate::router::{Action, Lookup, RouteTable};

/// The terminal step of the application pipeline.
///
/// Looks the request up in the [`RouteTable`], binds path parameters over
/// the route defaults, resolves the action and runs it inside the route's
/// own middleware pipeline. Nothing is caught here: routing misses become
/// [`RoutingError`]s and every failure propagates to the kernel.
#[derive(Clone)]
pub struct Dispatcher {
    routes: Arc<RouteTable>,
    resolver: Arc<dyn ActionResolver>,
    middleware: MiddlewareRegistry,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        routes: Arc<RouteTable>,
        resolver: Arc<dyn ActionResolver>,
        middleware: MiddlewareRegistry,
    ) -> Self {
        Self {
            routes,
            resolver,
            middleware,
        }
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Check that every route's middleware names are registered.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for the first unknown name.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.middleware.validate(self.routes.middleware_names())
    }

    /// Dispatch `req` using `res` as the working response.
    ///
    /// # Errors
    ///
    /// - [`RoutingError::NotFound`] when no route matches
    /// - [`RoutingError::MethodNotAllowed`] when the path exists for other methods
    /// - an unresolvable action reference
    /// - whatever the route middleware or the action raise
    pub fn dispatch(&self, req: &Request, res: Response) -> anyhow::Result<Response> {
        let route_match = match self.routes.lookup(&req.method, &req.path) {
            Lookup::Found(m) => m,
            Lookup::NotFound => {
                return Err(RoutingError::NotFound {
                    method: req.method.clone(),
                    path: req.path.clone(),
                }
                .into())
            }
            Lookup::MethodNotAllowed(allowed) => {
                return Err(RoutingError::MethodNotAllowed {
                    method: req.method.clone(),
                    path: req.path.clone(),
                    allowed,
                }
                .into())
            }
        };

        let route = route_match.bind();

        debug!(
            request_id = %req.request_id,
            action = %route.action(),
            route_pattern = %route.path(),
            "Handler lookup"
        );
        let action: Handler = match route.action() {
            Action::Closure(h) => Arc::clone(h),
            Action::Reference { identifier } => match self.resolver.resolve(identifier) {
                Some(h) => h,
                None => {
                    error!(
                        request_id = %req.request_id,
                        action = %identifier,
                        "Action could not be resolved"
                    );
                    return Err(anyhow!("action '{identifier}' could not be resolved"));
                }
            },
        };

        let pipeline = self.middleware.pipeline(route.middleware())?;

        info!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            action = %route.action(),
            route_middleware = pipeline.len(),
            "Request dispatched to handler"
        );

        pipeline.handle(req, res, |req, mut res| {
            let reply = action(req, &mut res, route.arguments())?;
            Ok(reply.apply(res))
        })
    }
}
