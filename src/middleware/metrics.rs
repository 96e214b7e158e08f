use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::Middleware;
use crate::http::{Request, Response};

/// Middleware collecting request statistics
///
/// Counts requests and server-error responses, accumulates latency for an
/// average, and stamps each response with an `X-Run-Time` header (seconds).
/// All counters are relaxed atomics; the middleware never blocks a request.
#[derive(Default)]
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    server_errors: AtomicUsize,
}

impl MetricsMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of requests seen
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Mean processing time across all requests, zero before the first one.
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// Responses that left this unit with a 5xx status.
    pub fn server_errors(&self) -> usize {
        self.server_errors.load(Ordering::Relaxed)
    }
}

impl Middleware for MetricsMiddleware {
    fn name(&self) -> &'static str {
        "metrics"
    }

    fn before(&self, _req: &Request, _res: &mut Response) -> anyhow::Result<Option<Response>> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        Ok(None)
    }

    fn after(&self, _req: &Request, res: &mut Response, latency: Duration) -> anyhow::Result<()> {
        let nanos = u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX);
        self.total_latency_ns.fetch_add(nanos, Ordering::Relaxed);
        if res.status() >= 500 {
            self.server_errors.fetch_add(1, Ordering::Relaxed);
        }
        res.set_header("X-Run-Time", format!("{:.6}", latency.as_secs_f64()));
        Ok(())
    }
}
