use std::time::Duration;

use crate::http::{Request, Response};

/// A two-phase unit of work wrapped around the terminal operation.
///
/// `before` runs in registration order and may short-circuit by returning a
/// response; `after` runs in reverse order for every unit whose `before`
/// completed without short-circuiting. Errors abort the pipeline and reach
/// the exception gateway.
pub trait Middleware: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str {
        "middleware"
    }
    fn before(&self, _req: &Request, _res: &mut Response) -> anyhow::Result<Option<Response>> {
        Ok(None)
    }
    fn after(&self, _req: &Request, _res: &mut Response, _latency: Duration) -> anyhow::Result<()> {
        Ok(())
    }
}
