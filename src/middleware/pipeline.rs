use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use super::Middleware;
use crate::http::{Request, Response};

/// Ordered composition of [`Middleware`] around a terminal operation.
///
/// Given units `[A, B, C]`, `before` runs A, B, C, then the terminal, then
/// `after` runs C, B, A. When B short-circuits, neither C nor the terminal
/// run, B's own `after` is skipped and only A unwinds; latency is zero.
///
/// The pipeline catches nothing: any error from a phase or the terminal is
/// returned as-is.
#[derive(Clone, Default)]
pub struct Pipeline {
    units: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    #[must_use]
    pub fn new(units: Vec<Arc<dyn Middleware>>) -> Self {
        Self { units }
    }

    pub fn push(&mut self, unit: Arc<dyn Middleware>) {
        self.units.push(unit);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Run the units around `terminal`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a `before`, the terminal or an
    /// `after`; nothing after the failing step runs.
    pub fn handle<F>(&self, req: &Request, res: Response, terminal: F) -> anyhow::Result<Response>
    where
        F: FnOnce(&Request, Response) -> anyhow::Result<Response>,
    {
        if self.units.is_empty() {
            return terminal(req, res);
        }

        let mut res = res;
        let mut entered = 0;
        let mut early: Option<Response> = None;
        for (idx, mw) in self.units.iter().enumerate() {
            if let Some(r) = mw.before(req, &mut res)? {
                debug!(
                    request_id = %req.request_id,
                    middleware_idx = idx,
                    middleware_name = mw.name(),
                    "Middleware returned early response"
                );
                early = Some(r);
                break;
            }
            entered = idx + 1;
        }

        let (mut res, latency) = match early {
            Some(r) => (r, Duration::ZERO),
            None => {
                let start = Instant::now();
                let r = terminal(req, res)?;
                (r, start.elapsed())
            }
        };

        for mw in self.units[..entered].iter().rev() {
            mw.after(req, &mut res, latency)?;
        }
        Ok(res)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").field("units", &self.units.len()).finish()
    }
}
