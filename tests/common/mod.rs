#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ant_kernel::http::{Request, Response};
use ant_kernel::kernel::{Kernel, KernelBuilder};
use ant_kernel::middleware::Middleware;
use ant_kernel::router::RouteTable;
use http::Method;

/// Shared, ordered record of phase calls.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

/// Middleware that records `name.before` / `name.after` and can
/// short-circuit or fail on demand.
pub struct Recorder {
    pub name: &'static str,
    pub journal: Journal,
    pub short_circuit: Option<u16>,
    pub fail_after: bool,
    pub latencies: Arc<Mutex<Vec<Duration>>>,
}

impl Recorder {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: Arc::clone(journal),
            short_circuit: None,
            fail_after: false,
            latencies: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn short_circuit(mut self, status: u16) -> Self {
        self.short_circuit = Some(status);
        self
    }

    pub fn fail_after(mut self) -> Self {
        self.fail_after = true;
        self
    }

    pub fn arc(self) -> Arc<dyn Middleware> {
        Arc::new(self)
    }
}

impl Middleware for Recorder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn before(&self, _req: &Request, _res: &mut Response) -> anyhow::Result<Option<Response>> {
        self.journal
            .lock()
            .unwrap()
            .push(format!("{}.before", self.name));
        Ok(self
            .short_circuit
            .map(|status| Response::text(status, format!("stopped by {}", self.name))))
    }

    fn after(&self, _req: &Request, res: &mut Response, latency: Duration) -> anyhow::Result<()> {
        self.journal
            .lock()
            .unwrap()
            .push(format!("{}.after", self.name));
        self.latencies.lock().unwrap().push(latency);
        res.append_header("X-Visited", self.name);
        if self.fail_after {
            anyhow::bail!("{} failed in after", self.name);
        }
        Ok(())
    }
}

/// A route table with one closure route that records its invocation.
pub fn terminal_routes(journal: &Journal) -> RouteTable {
    let journal = Arc::clone(journal);
    let mut routes = RouteTable::new();
    routes
        .get(
            "/work",
            ant_kernel::router::RawAction::closure(move |_, _, _| {
                journal.lock().unwrap().push("terminal".to_string());
                Ok("done")
            }),
        )
        .unwrap();
    routes
}

pub fn kernel(routes: RouteTable) -> Kernel {
    KernelBuilder::new().routes(routes).build().unwrap()
}

/// Process a request for `path` with the given `Accept` header.
pub fn send(kernel: &Kernel, method: Method, path: &str, accept: Option<&str>) -> Response {
    let mut req = Request::new(method, path);
    if let Some(accept) = accept {
        req = req.with_header("Accept", accept);
    }
    kernel.process(&req, kernel.prepare_response(&req))
}

pub fn get(kernel: &Kernel, path: &str) -> Response {
    send(kernel, Method::GET, path, None)
}
