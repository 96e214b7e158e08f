//! # Kernel
//!
//! Turns one request into one response.
//!
//! [`Kernel::process`] runs the application middleware [`Pipeline`] with the
//! [`Dispatcher`] as its terminal step. Anything that goes wrong on the way,
//! an error returned by a phase or an action as well as a panic, is handed
//! to the [`ExceptionGateway`], so `process` always returns a response.
//! [`Kernel::run`] adds response preparation and emission to a
//! [`TransportSink`].
//!
//! All state is supplied up front through a [`KernelBuilder`]: the route
//! table, the action resolver, application and route middleware, renderers,
//! an optional exception handler and the [`KernelConfig`]. There is no
//! global application object.
//!
//! ```
//! use ant_kernel::http::Request;
//! use ant_kernel::kernel::KernelBuilder;
//! use ant_kernel::router::{RawAction, RouteTable};
//! use http::Method;
//!
//! let mut routes = RouteTable::new();
//! routes.get("/test", RawAction::closure(|_, _, _| Ok("123"))).unwrap();
//!
//! let kernel = KernelBuilder::new().routes(routes).build().unwrap();
//! let req = Request::new(Method::GET, "/test");
//! let res = kernel.process(&req, kernel.prepare_response(&req));
//!
//! assert_eq!(res.status(), 200);
//! assert_eq!(res.body_text(), "123");
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, info_span, warn};

use crate::config::KernelConfig;
use crate::dispatcher::{ActionResolver, ControllerRegistry, Dispatcher};
use crate::emitter::{Completion, ResponseEmitter, TransportSink};
use crate::error::ValidationError;
use crate::exception::{guard, install_hook, ExceptionGateway, ExceptionHandler, ExceptionRecord, Failure, FatalFault};
use crate::http::{Request, Response};
use crate::middleware::{Middleware, MiddlewareRegistry, Pipeline};
use crate::render::RendererFactory;
use crate::router::RouteTable;

/// Boot-time context for a [`Kernel`].
pub struct KernelBuilder {
    config: KernelConfig,
    routes: RouteTable,
    resolver: Arc<dyn ActionResolver>,
    middleware: Vec<Arc<dyn Middleware>>,
    route_middleware: MiddlewareRegistry,
    renderers: RendererFactory,
    exception_handler: Option<ExceptionHandler>,
}

impl Default for KernelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: KernelConfig::default(),
            routes: RouteTable::new(),
            resolver: Arc::new(ControllerRegistry::new()),
            middleware: Vec::new(),
            route_middleware: MiddlewareRegistry::new(),
            renderers: RendererFactory::with_defaults(),
            exception_handler: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: KernelConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Resolver for `Controller@method` references.
    #[must_use]
    pub fn resolver(mut self, resolver: Arc<dyn ActionResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    #[must_use]
    pub fn controllers(self, controllers: ControllerRegistry) -> Self {
        self.resolver(Arc::new(controllers))
    }

    /// Append an application-wide middleware unit. Units run in the order
    /// they are added.
    #[must_use]
    pub fn middleware(mut self, unit: Arc<dyn Middleware>) -> Self {
        self.middleware.push(unit);
        self
    }

    /// Register a unit that routes can name in their middleware list.
    #[must_use]
    pub fn route_middleware(mut self, name: impl Into<String>, unit: Arc<dyn Middleware>) -> Self {
        self.route_middleware.register(name, unit);
        self
    }

    #[must_use]
    pub fn renderers(mut self, renderers: RendererFactory) -> Self {
        self.renderers = renderers;
        self
    }

    #[must_use]
    pub fn exception_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ExceptionRecord, &Request, Response) -> Response + Send + Sync + 'static,
    {
        self.exception_handler = Some(Arc::new(handler));
        self
    }

    /// Validate the context and build the kernel.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when a route names middleware that was
    /// never registered.
    pub fn build(self) -> Result<Kernel, ValidationError> {
        let dispatcher = Dispatcher::new(Arc::new(self.routes), self.resolver, self.route_middleware);
        dispatcher.validate()?;

        let mut gateway = ExceptionGateway::new(
            self.renderers,
            self.config.debug,
            self.config.default_type.clone(),
        );
        if let Some(handler) = self.exception_handler {
            gateway.set_handler(handler);
        }
        install_hook();

        dispatcher.routes().log_summary();
        info!(
            middleware_count = self.middleware.len(),
            debug = self.config.debug,
            default_type = %self.config.default_type,
            "Kernel ready"
        );

        Ok(Kernel {
            config: self.config,
            pipeline: Pipeline::new(self.middleware),
            dispatcher,
            gateway,
            started: AtomicBool::new(false),
        })
    }
}

/// The request-processing kernel.
pub struct Kernel {
    config: KernelConfig,
    pipeline: Pipeline,
    dispatcher: Dispatcher,
    gateway: ExceptionGateway,
    started: AtomicBool,
}

impl Kernel {
    #[must_use]
    pub fn builder() -> KernelBuilder {
        KernelBuilder::new()
    }

    #[must_use]
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        self.dispatcher.routes()
    }

    #[must_use]
    pub fn gateway(&self) -> &ExceptionGateway {
        &self.gateway
    }

    /// Append an application middleware unit.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] once the first request has been processed;
    /// the chain is fixed from then on.
    pub fn register_middleware(&mut self, unit: Arc<dyn Middleware>) -> Result<(), ValidationError> {
        if self.started.load(Ordering::Acquire) {
            return Err(ValidationError::new(
                "middleware cannot be registered after the first request",
            ));
        }
        self.pipeline.push(unit);
        Ok(())
    }

    /// Install a custom exception handler; its response is used verbatim.
    pub fn register_exception_handler(&mut self, handler: ExceptionHandler) {
        self.gateway.set_handler(handler);
    }

    /// A fresh response for `req` carrying the configured default headers.
    #[must_use]
    pub fn prepare_response(&self, req: &Request) -> Response {
        let mut res = Response::prepare(req, &self.config.default_type);
        for (name, values) in &self.config.default_headers {
            for value in values {
                res.append_header(name, value.as_str());
            }
        }
        res
    }

    /// Process `req` with `res` as the working response. Never fails.
    #[must_use]
    pub fn process(&self, req: &Request, res: Response) -> Response {
        self.handle(req, res).0
    }

    /// Prepare, process and emit `req` to `sink`. Returns the emitted
    /// response.
    pub fn run<S>(&self, req: &Request, sink: &mut S) -> Response
    where
        S: TransportSink + ?Sized,
    {
        let res = self.prepare_response(req);
        let (res, completion) = self.handle(req, res);
        let mut emitter = ResponseEmitter::new(self.config.output_base_level);
        emitter.emit(&res, sink, completion);
        res
    }

    /// A minimal `GET /` request standing in for one the front end never
    /// produced, speaking the configured protocol version.
    #[must_use]
    pub fn synthetic_request(&self) -> Request {
        let mut req = Request::synthetic();
        req.protocol_version.clone_from(&self.config.protocol_version);
        req
    }

    /// Answer a fault that happened outside [`process`](Self::process), with
    /// no request of its own, and emit the result to `sink`.
    pub fn recover<S>(&self, fault: FatalFault, sink: &mut S) -> Response
    where
        S: TransportSink + ?Sized,
    {
        let req = self.synthetic_request();
        let res = self.prepare_response(&req);
        warn!(request_id = %req.request_id, panic_message = %fault.message, "Recovering from fault outside request");
        let res = self.gateway.handle(Failure::Fatal(fault), &req, res);
        let mut emitter = ResponseEmitter::new(self.config.output_base_level);
        emitter.emit(&res, sink, Completion::Error);
        res
    }

    fn handle(&self, req: &Request, res: Response) -> (Response, Completion) {
        self.started.store(true, Ordering::Release);

        let span = info_span!(
            "request",
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path
        );
        let _entered = span.enter();
        let start = Instant::now();

        let fallback = res.clone();
        let outcome = guard(|| {
            self.pipeline
                .handle(req, res, |req, res| self.dispatcher.dispatch(req, res))
        });

        let (res, completion) = match outcome {
            Ok(Ok(res)) => (res, Completion::Normal),
            Ok(Err(err)) => (
                self.gateway.handle(Failure::Error(err), req, fallback),
                Completion::Error,
            ),
            Err(fault) => (
                self.gateway.handle(Failure::Fatal(fault), req, fallback),
                Completion::Error,
            ),
        };

        debug!(
            status = res.status(),
            failed = completion == Completion::Error,
            duration_us = start.elapsed().as_micros() as u64,
            "Request processed"
        );
        (res, completion)
    }
}
