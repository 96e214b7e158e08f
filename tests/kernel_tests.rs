mod common;

use std::sync::Arc;

use ant_kernel::config::KernelConfig;
use ant_kernel::emitter::StreamSink;
use ant_kernel::exception::{Classification, ExceptionRecord, FatalFault};
use ant_kernel::http::{Cookie, Request, Response};
use ant_kernel::kernel::KernelBuilder;
use ant_kernel::router::{RawAction, RouteTable};
use ant_kernel::HttpError;
use common::{get, send};
use http::Method;

mod tracing_util;
use tracing_util::TestTracing;

fn production() -> KernelConfig {
    KernelConfig {
        debug: false,
        ..KernelConfig::default()
    }
}

#[test]
fn registered_closure_answers() {
    let mut routes = RouteTable::new();
    routes.get("/test", RawAction::closure(|_, _, _| Ok("123"))).unwrap();
    let kernel = common::kernel(routes);

    let res = get(&kernel, "/test");
    assert_eq!(res.status(), 200);
    assert_eq!(res.body_text(), "123");
}

#[test]
fn unknown_path_is_structured_404_for_json_clients() {
    let kernel = common::kernel(RouteTable::new());
    let res = send(&kernel, Method::GET, "/missing", Some("application/json"));
    assert_eq!(res.status(), 404);
    let body: serde_json::Value = serde_json::from_str(&res.body_text()).unwrap();
    assert_eq!(body["code"], 404);
    assert_eq!(body["message"], "no route matches GET /missing");
}

#[test]
fn unknown_path_is_html_page_for_browsers() {
    let kernel = KernelBuilder::new().config(production()).build().unwrap();
    let res = send(&kernel, Method::GET, "/missing", Some("text/html"));
    assert_eq!(res.status(), 404);
    assert_eq!(res.header("Content-Type").as_deref(), Some("text/html;charset=utf-8"));
    assert!(res.body_text().contains("404"));
    assert!(res.header("X-Exception-Message").is_none());
}

#[test]
fn structured_http_error_keeps_status_and_message() {
    let mut routes = RouteTable::new();
    routes
        .get(
            "/strict",
            RawAction::closure(|_, _, _| -> anyhow::Result<()> {
                Err(HttpError::not_acceptable("only json here")
                    .with_header("Vary", "Accept")
                    .into())
            }),
        )
        .unwrap();
    let kernel = KernelBuilder::new()
        .config(production())
        .routes(routes)
        .build()
        .unwrap();

    let res = send(&kernel, Method::GET, "/strict", Some("application/json"));
    assert_eq!(res.status(), 406);
    assert_eq!(res.header("Vary").as_deref(), Some("Accept"));
    assert_eq!(res.body_text(), r#"{"code":406,"message":"only json here"}"#);
}

#[test]
fn structured_error_wrapped_in_context_keeps_its_status() {
    use anyhow::Context;

    let mut routes = RouteTable::new();
    routes
        .get(
            "/wrapped",
            RawAction::closure(|_, _, _| -> anyhow::Result<()> {
                Err(HttpError::forbidden("no entry")).context("loading profile")
            }),
        )
        .unwrap();
    let kernel = KernelBuilder::new()
        .config(production())
        .routes(routes)
        .build()
        .unwrap();

    let res = send(&kernel, Method::GET, "/wrapped", Some("application/json"));
    assert_eq!(res.status(), 403);
}

#[test]
fn recoverable_error_is_generic_in_production() {
    let mut routes = RouteTable::new();
    routes
        .get(
            "/fail",
            RawAction::closure(|_, _, _| -> anyhow::Result<()> { anyhow::bail!("secret detail") }),
        )
        .unwrap();
    let kernel = KernelBuilder::new()
        .config(production())
        .routes(routes)
        .build()
        .unwrap();

    let res = send(&kernel, Method::GET, "/fail", Some("application/json"));
    assert_eq!(res.status(), 500);
    assert_eq!(res.body_text(), r#"{"code":500,"message":"error"}"#);
    assert!(!res.body_text().contains("secret"));
}

#[test]
fn panic_during_dispatch_still_yields_a_response() {
    let tracing = TestTracing::init();
    let mut routes = RouteTable::new();
    routes
        .get(
            "/panic",
            RawAction::closure(|_, _, _| -> anyhow::Result<String> {
                let empty: Vec<u8> = Vec::new();
                Ok(format!("{}", empty[3]))
            }),
        )
        .unwrap();
    let kernel = common::kernel(routes);

    let res = send(&kernel, Method::GET, "/panic", Some("text/html"));
    assert!(!(200..300).contains(&res.status()));
    assert_eq!(res.status(), 500);
    assert!(!res.body().is_empty());
    assert!(res
        .header("X-Exception-Message")
        .unwrap_or_default()
        .contains("index out of bounds"));
    assert!(tracing.has_message("Fatal fault - CRITICAL"));
}

#[test]
fn custom_handler_result_is_used_verbatim() {
    let mut routes = RouteTable::new();
    routes
        .get(
            "/fail",
            RawAction::closure(|_, _, _| -> anyhow::Result<()> { anyhow::bail!("nope") }),
        )
        .unwrap();
    let kernel = KernelBuilder::new()
        .routes(routes)
        .exception_handler(|record, _req, _res| {
            let mut res = Response::text(418, format!("custom: {}", record.message));
            res.set_header("X-Handled", "yes");
            res
        })
        .build()
        .unwrap();

    let res = get(&kernel, "/fail");
    assert_eq!(res.status(), 418);
    assert_eq!(res.body_text(), "custom: nope");
    assert_eq!(res.header("X-Handled").as_deref(), Some("yes"));
}

#[test]
fn panicking_custom_handler_falls_back_to_default_rendering() {
    let mut kernel = common::kernel(RouteTable::new());
    kernel.register_exception_handler(Arc::new(
        |_: &ExceptionRecord, _: &Request, _: Response| -> Response { panic!("handler is broken") },
    ));

    let res = send(&kernel, Method::GET, "/missing", Some("application/json"));
    assert_eq!(res.status(), 500);
    assert_eq!(
        res.header("X-Exception-Message").as_deref(),
        Some("no route matches GET /missing")
    );
}

#[test]
fn run_emits_prepared_headers_and_cookies() {
    let mut routes = RouteTable::new();
    routes
        .get(
            "/login",
            RawAction::closure(|_, res, _| {
                res.add_cookie(Cookie::new("sid", "abc").http_only(true));
                Ok("welcome")
            }),
        )
        .unwrap();
    let kernel = common::kernel(routes);

    let mut sink = StreamSink::cgi(Vec::new());
    let res = kernel.run(&Request::new(Method::GET, "/login"), &mut sink);
    assert_eq!(res.status(), 200);

    let raw = String::from_utf8(sink.into_inner()).unwrap();
    assert!(raw.starts_with("Status: 200 OK\r\n"), "raw: {raw}");
    assert!(raw.contains("\r\nX-Powered-By: Ant-Framework\r\n"));
    assert!(raw.contains("\r\nSet-Cookie: sid=abc; Path=/; HttpOnly\r\n"));
    assert!(raw.ends_with("\r\n\r\nwelcome"));
}

#[test]
fn recover_answers_faults_without_a_request() {
    let kernel = KernelBuilder::new().config(production()).build().unwrap();
    let mut sink = StreamSink::http(Vec::new());
    let res = kernel.recover(FatalFault::new("out of memory"), &mut sink);

    assert_eq!(res.status(), 500);
    let raw = String::from_utf8(sink.into_inner()).unwrap();
    assert!(raw.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    assert!(raw.ends_with(r#"{"code":500,"message":"error"}"#));
}

#[test]
fn failures_are_classified_before_reaching_the_handler() {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let kernel = KernelBuilder::new()
        .exception_handler(move |record, _req, res| {
            sink.lock().unwrap().push(record.classification.clone());
            res
        })
        .build()
        .unwrap();

    let _ = get(&kernel, "/missing");
    assert_eq!(
        *seen.lock().unwrap(),
        vec![Classification::Structured {
            status: 404,
            headers: Vec::new()
        }]
    );
}

#[test]
fn request_span_is_opened_per_request() {
    let tracing = TestTracing::init();
    let mut routes = RouteTable::new();
    routes.get("/test", RawAction::closure(|_, _, _| Ok("123"))).unwrap();
    let kernel = common::kernel(routes);

    let req = Request::new(Method::GET, "/test");
    let _ = kernel.process(&req, kernel.prepare_response(&req));

    let processed = tracing.find("Request processed");
    assert_eq!(processed.len(), 1);
    assert_eq!(processed[0]["span"]["name"], "request");
    assert_eq!(processed[0]["span"]["request_id"], req.request_id.to_string());
}
