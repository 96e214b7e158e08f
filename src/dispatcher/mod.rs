//! # Dispatcher Module
//!
//! The terminal operation of the kernel pipeline.
//!
//! ## Request Flow
//!
//! 1. The [`RouteTable`](crate::router::RouteTable) resolves method and path
//!    to a route, or reports a miss
//! 2. Path parameters are bound over the route's default arguments
//! 3. The action is taken from the route (closure) or resolved through an
//!    [`ActionResolver`] (reference)
//! 4. The action runs inside the route's own middleware pipeline and its
//!    [`Reply`] is folded into the working response
//!
//! Misses and action failures are returned as errors; recovery belongs to
//! the [`exception`](crate::exception) gateway.

mod core;
mod reply;
mod resolver;

pub use self::core::Dispatcher;
pub use reply::{Handler, Reply};
pub use resolver::{ActionResolver, ControllerRegistry};
