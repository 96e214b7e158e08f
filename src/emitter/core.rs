use std::io;

use tracing::{debug, warn};

use super::sink::{CookieDirective, DrainMode, TransportSink};
use crate::http::{display_name, Response};

/// How the request finished, which decides what happens to stray output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Normal,
    /// The response came out of the exception gateway.
    Error,
}

impl Completion {
    #[must_use]
    pub fn drain_mode(self) -> DrainMode {
        match self {
            Completion::Normal => DrainMode::Flush,
            Completion::Error => DrainMode::Discard,
        }
    }
}

/// Writes one response to a [`TransportSink`], at most once.
///
/// Emission is best-effort: transport errors are logged and the remaining
/// steps still run. When the transport reports headers as already sent,
/// the status line, headers and cookies are skipped and only the body is
/// written.
#[derive(Debug)]
pub struct ResponseEmitter {
    output_base_level: usize,
    emitted: bool,
}

impl ResponseEmitter {
    #[must_use]
    pub fn new(output_base_level: usize) -> Self {
        Self {
            output_base_level,
            emitted: false,
        }
    }

    #[must_use]
    pub fn emitted(&self) -> bool {
        self.emitted
    }

    /// Emit `res`. Returns `false` when this emitter already emitted.
    pub fn emit<S>(&mut self, res: &Response, sink: &mut S, completion: Completion) -> bool
    where
        S: TransportSink + ?Sized,
    {
        if self.emitted {
            debug!(status = res.status(), "Response already emitted - skipping");
            return false;
        }
        self.emitted = true;

        if sink.headers_sent() {
            warn!(
                status = res.status(),
                "Headers already sent - skipping status line, headers and cookies"
            );
        } else {
            attempt(
                "status line",
                sink.write_status_line(res.protocol_version(), res.status(), res.reason_phrase()),
            );
            for (name, values) in res.headers().iter() {
                attempt("header", sink.write_header(&display_name(name), values));
            }
            for cookie in res.cookies() {
                attempt("cookie", sink.write_cookie(&CookieDirective::from(cookie)));
            }
        }

        let body: &[u8] = if res.is_empty() { &[] } else { res.body() };
        attempt("body", sink.write_body(body));

        let depth = sink.buffer_depth();
        if depth > self.output_base_level {
            let mode = completion.drain_mode();
            debug!(
                depth,
                base_level = self.output_base_level,
                mode = ?mode,
                "Draining output buffers"
            );
            attempt("drain", sink.flush_buffers(self.output_base_level, mode));
        }
        true
    }
}

fn attempt(step: &'static str, result: io::Result<()>) {
    if let Err(e) = result {
        warn!(step, error = %e, "Transport write failed during emission");
    }
}
