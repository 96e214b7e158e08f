//! # ant-kernel
//!
//! The request-processing kernel of a small HTTP application framework.
//! It turns an inbound [`Request`](http::Request) into exactly one outbound
//! [`Response`](http::Response). Every failure mode still produces a
//! well-formed response: application errors, unmatched routes and panics
//! raised mid-request.
//!
//! ## Architecture
//!
//! - **[`router`]** - routes, group attribute merging and the route table
//! - **[`middleware`]** - two-phase middleware and the [`Pipeline`](middleware::Pipeline)
//! - **[`dispatcher`]** - the pipeline's terminal step: route lookup and action invocation
//! - **[`exception`]** - failure classification and the exception gateway
//! - **[`render`]** - `{code, message}` payload rendering per negotiated type
//! - **[`emitter`]** - writes the final response to a transport sink, once
//! - **[`kernel`]** - ties the above together behind [`Kernel::process`](kernel::Kernel::process)
//! - **[`http`]** - request and response values
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Front as Front end (CGI)
//!     participant Kernel
//!     participant Pipeline
//!     participant Dispatcher
//!     participant Gateway as ExceptionGateway
//!     participant Emitter as ResponseEmitter
//!
//!     Front->>Kernel: run(request, sink)
//!     Kernel->>Pipeline: before A, B, C
//!     Pipeline->>Dispatcher: dispatch(request, response)
//!     Dispatcher-->>Pipeline: response | error
//!     Pipeline->>Pipeline: after C, B, A
//!     alt error or panic
//!         Kernel->>Gateway: handle(failure)
//!         Gateway-->>Kernel: error response
//!     end
//!     Kernel->>Emitter: emit(response, sink)
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use ant_kernel::emitter::StreamSink;
//! use ant_kernel::http::Request;
//! use ant_kernel::kernel::KernelBuilder;
//! use ant_kernel::router::{GroupAttributes, RawAction, RouteTable};
//! use http::Method;
//!
//! let mut routes = RouteTable::new();
//! routes
//!     .group(GroupAttributes::new().prefix("/app"), |r| {
//!         r.get("/x", RawAction::closure(|_, _, _| Ok("inside")))?;
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! let kernel = KernelBuilder::new().routes(routes).build().unwrap();
//!
//! let mut sink = StreamSink::http(Vec::new());
//! let res = kernel.run(&Request::new(Method::GET, "/app/x"), &mut sink);
//! assert_eq!(res.body_text(), "inside");
//!
//! let res = kernel.run(&Request::new(Method::GET, "/x"), &mut StreamSink::http(Vec::new()));
//! assert_eq!(res.status(), 404);
//! ```
//!
//! ## Configuration and Logging
//!
//! [`config::KernelConfig`] is read from `ANT_*` environment variables or
//! TOML; [`logging::init_logging`] installs a `tracing` subscriber.

pub mod cgi;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod emitter;
pub mod error;
pub mod exception;
pub mod http;
pub mod ids;
pub mod kernel;
pub mod logging;
pub mod middleware;
pub mod render;
pub mod router;

pub use error::{HttpError, KernelError, RoutingError, ValidationError};
pub use kernel::{Kernel, KernelBuilder};
