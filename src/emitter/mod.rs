//! # Emitter Module
//!
//! The boundary between the kernel and the transport. A
//! [`ResponseEmitter`] writes the final response to a [`TransportSink`]
//! exactly once per request, then drains output buffer layers above the
//! configured base level: flushed after normal completion, discarded on
//! the error path.

mod core;
mod sink;

pub use self::core::{Completion, ResponseEmitter};
pub use sink::{CookieDirective, DrainMode, SinkStyle, StreamSink, TransportSink};
