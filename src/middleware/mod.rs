//! # Middleware Module
//!
//! Two-phase middleware and the [`Pipeline`] that composes it.
//!
//! The kernel runs one application-wide pipeline around the dispatcher; the
//! dispatcher runs a second, per-route pipeline built from the route's named
//! middleware through a [`MiddlewareRegistry`].

mod auth;
mod core;
mod cors;
mod metrics;
mod pipeline;
mod registry;
mod tracing;

pub use auth::AuthMiddleware;
pub use self::core::Middleware;
pub use cors::CorsMiddleware;
pub use metrics::MetricsMiddleware;
pub use pipeline::Pipeline;
pub use registry::MiddlewareRegistry;
pub use self::tracing::TracingMiddleware;
