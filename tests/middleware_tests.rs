mod common;

use std::sync::Arc;

use ant_kernel::http::Request;
use ant_kernel::kernel::KernelBuilder;
use ant_kernel::middleware::TracingMiddleware;
use ant_kernel::router::{RawAction, RouteTable};
use common::{journal, terminal_routes, Recorder};
use http::Method;

mod tracing_util;
use tracing_util::TestTracing;

fn routes() -> RouteTable {
    let mut routes = RouteTable::new();
    routes.get("/ok", RawAction::closure(|_, _, _| Ok("fine"))).unwrap();
    routes
        .get(
            "/fail",
            RawAction::closure(|_, _, _| -> anyhow::Result<()> { anyhow::bail!("db down") }),
        )
        .unwrap();
    routes
}

#[test]
fn tracing_unit_logs_completion_inside_request_span() {
    let tracing = TestTracing::init();
    let kernel = KernelBuilder::new()
        .routes(routes())
        .middleware(Arc::new(TracingMiddleware))
        .build()
        .unwrap();

    let req = Request::new(Method::GET, "/ok");
    let res = kernel.process(&req, kernel.prepare_response(&req));
    assert_eq!(res.status(), 200);

    assert!(tracing.has_message("Request started"));
    let completed = tracing.find("Request completed");
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["fields"]["status"], 200);
    assert_eq!(completed[0]["span"]["name"], "request");
    assert_eq!(completed[0]["span"]["request_id"], req.request_id.to_string());
}

#[test]
fn tracing_unit_keeps_no_state_across_failed_requests() {
    let tracing = TestTracing::init();
    let kernel = KernelBuilder::new()
        .routes(routes())
        .middleware(Arc::new(TracingMiddleware))
        .build()
        .unwrap();

    for _ in 0..3 {
        let req = Request::new(Method::GET, "/fail");
        assert_eq!(kernel.process(&req, kernel.prepare_response(&req)).status(), 500);
    }
    assert!(!tracing.has_message("Request completed"));

    let req = Request::new(Method::GET, "/ok");
    let res = kernel.process(&req, kernel.prepare_response(&req));
    assert_eq!(res.body_text(), "fine");

    let completed = tracing.find("Request completed");
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["fields"]["request_id"], req.request_id.to_string());
    assert_eq!(completed[0]["span"]["request_id"], req.request_id.to_string());
}

#[test]
fn short_circuit_log_names_the_unit() {
    let tracing = TestTracing::init();
    let log = journal();
    let kernel = KernelBuilder::new()
        .routes(terminal_routes(&log))
        .middleware(Recorder::new("gate", &log).short_circuit(429).arc())
        .build()
        .unwrap();

    let res = common::get(&kernel, "/work");
    assert_eq!(res.status(), 429);

    let early = tracing.find("Middleware returned early response");
    assert_eq!(early.len(), 1);
    assert_eq!(early[0]["fields"]["middleware_name"], "gate");
    assert_eq!(early[0]["fields"]["middleware_idx"], 0);
}
