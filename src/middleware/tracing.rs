use std::time::Duration;

use tracing::{debug, info};

use super::Middleware;
use crate::http::{Request, Response};

/// Logs the start and completion of each request.
///
/// Holds no per-request state: events land in whatever span is current,
/// which inside [`Kernel::process`](crate::kernel::Kernel::process) is the
/// kernel's `request` span. A request aborted by an error never reaches
/// `after`; the gateway logs that outcome instead.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn name(&self) -> &'static str {
        "tracing"
    }

    fn before(&self, req: &Request, _res: &mut Response) -> anyhow::Result<Option<Response>> {
        debug!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            "Request started"
        );
        Ok(None)
    }

    fn after(&self, req: &Request, res: &mut Response, latency: Duration) -> anyhow::Result<()> {
        info!(
            request_id = %req.request_id,
            status = res.status(),
            latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
            "Request completed"
        );
        Ok(())
    }
}
