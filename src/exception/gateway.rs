use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, warn};

use super::fault::{guard, FatalFault};
use super::page::render_page;
use super::record::{Classification, ExceptionRecord};
use crate::http::{status_reason, Request, Response};
use crate::render::RendererFactory;

/// A user-supplied exception handler. Its response is used verbatim.
pub type ExceptionHandler =
    Arc<dyn Fn(&ExceptionRecord, &Request, Response) -> Response + Send + Sync>;

/// Anything that can reach the gateway.
#[derive(Debug)]
pub enum Failure {
    Error(anyhow::Error),
    Fatal(FatalFault),
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Failure::Error(err)
    }
}

impl From<FatalFault> for Failure {
    fn from(fault: FatalFault) -> Self {
        Failure::Fatal(fault)
    }
}

impl Failure {
    #[must_use]
    pub fn record(&self) -> ExceptionRecord {
        match self {
            Failure::Error(err) => ExceptionRecord::from_error(err),
            Failure::Fatal(fault) => ExceptionRecord::from_fault(fault),
        }
    }
}

/// Turns any failure into a response. Never panics, never fails.
///
/// With a custom handler installed, the handler's response is returned
/// verbatim. Otherwise the response body is cleared, the status and any
/// structured headers are applied, and a `{code, message}` payload is
/// rendered for the negotiated type; when that is impossible the HTML error
/// page is used instead.
///
/// In debug mode the root cause is also exposed through
/// `X-Exception-Message` and `X-Exception-Trace-NN` headers.
#[derive(Clone)]
pub struct ExceptionGateway {
    handler: Option<ExceptionHandler>,
    renderers: RendererFactory,
    debug: bool,
    default_type: String,
}

impl ExceptionGateway {
    #[must_use]
    pub fn new(renderers: RendererFactory, debug: bool, default_type: impl Into<String>) -> Self {
        Self {
            handler: None,
            renderers,
            debug,
            default_type: default_type.into(),
        }
    }

    pub fn set_handler(&mut self, handler: ExceptionHandler) {
        self.handler = Some(handler);
    }

    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Normalize `failure` into a response for `req`.
    #[must_use]
    pub fn handle(&self, failure: Failure, req: &Request, res: Response) -> Response {
        let record = failure.record();
        self.log(&record, req);

        let Some(handler) = &self.handler else {
            return self.render_default(&record, req, res);
        };

        let fallback = res.clone();
        match guard(|| handler(&record, req, res)) {
            Ok(custom) => custom,
            Err(fault) => {
                error!(
                    request_id = %req.request_id,
                    panic_message = %fault.message,
                    "Custom exception handler panicked - using default rendering"
                );
                let mut fatal = ExceptionRecord::from_fault(&fault);
                fatal.previous = Some(Box::new(record));
                self.render_default(&fatal, req, fallback)
            }
        }
    }

    /// Handle a fault that has no request of its own: a minimal `GET /`
    /// request and a fresh response are synthesized.
    #[must_use]
    pub fn recover_fatal(&self, fault: FatalFault) -> (Request, Response) {
        let req = Request::synthetic();
        let res = Response::prepare(&req, &self.default_type);
        let res = self.handle(Failure::Fatal(fault), &req, res);
        (req, res)
    }

    fn log(&self, record: &ExceptionRecord, req: &Request) {
        match &record.classification {
            Classification::Structured { status, .. } => warn!(
                request_id = %req.request_id,
                status = *status,
                kind = record.kind,
                message = %record.message,
                "Structured error"
            ),
            Classification::Recoverable => error!(
                request_id = %req.request_id,
                kind = record.kind,
                message = %record.message,
                root_cause = %record.root_cause().message,
                "Request failed"
            ),
            Classification::Fatal => error!(
                request_id = %req.request_id,
                message = %record.message,
                trace_lines = record.trace.len(),
                "Fatal fault - CRITICAL"
            ),
        }
    }

    /// Text shown to the client.
    fn public_message(&self, record: &ExceptionRecord, status: u16) -> String {
        if record.is_structured() {
            if record.message.is_empty() {
                status_reason(status).to_string()
            } else {
                record.message.clone()
            }
        } else if self.debug && !record.message.is_empty() {
            record.message.clone()
        } else {
            "error".to_string()
        }
    }

    fn debug_headers(record: &ExceptionRecord, res: &mut Response) {
        let root = record.root_cause();
        res.set_header("X-Exception-Message", header_safe(&root.message));
        let keep = root.trace.len().saturating_sub(1);
        for (idx, line) in root.trace.iter().take(keep).enumerate() {
            res.set_header(&format!("X-Exception-Trace-{idx:02}"), header_safe(line));
        }
    }

    fn render_default(&self, record: &ExceptionRecord, req: &Request, mut res: Response) -> Response {
        let status = record.status();
        res.clear_body();
        res.set_status(status);
        if let Classification::Structured { headers, .. } = &record.classification {
            for (name, value) in headers {
                res.append_header(name, value.clone());
            }
        }
        if self.debug {
            Self::debug_headers(record, &mut res);
        }

        let message = self.public_message(record, status);
        let code = record.code.unwrap_or_else(|| i64::from(status));
        let payload = json!({ "code": code, "message": message });
        let ty = res
            .negotiated_type()
            .unwrap_or(&self.default_type)
            .to_string();

        let rendered = match guard(|| self.renderers.render(&ty, &payload, req, &mut res)) {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(fault) => {
                error!(
                    request_id = %req.request_id,
                    negotiated_type = %ty,
                    panic_message = %fault.message,
                    "Renderer panicked"
                );
                Err(format!("renderer panicked: {}", fault.message))
            }
        };

        match rendered {
            Ok(()) => res,
            Err(e) => {
                debug!(
                    request_id = %req.request_id,
                    negotiated_type = %ty,
                    error = %e,
                    "Structured render unavailable - falling back to HTML page"
                );
                res.clear_body();
                res.set_header("Content-Type", "text/html;charset=utf-8");
                res.write(render_page(record, status, &message, self.debug));
                res
            }
        }
    }
}

fn header_safe(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpError;
    use http::Method;

    fn prepared(accept: &str) -> (Request, Response) {
        let req = Request::new(Method::GET, "/").with_header("Accept", accept);
        let res = Response::prepare(&req, "json");
        (req, res)
    }

    #[test]
    fn recoverable_message_hidden_in_production() {
        let gateway = ExceptionGateway::new(RendererFactory::default(), false, "json");
        let (req, mut res) = prepared("application/json");
        res.write("partial output");
        let res = gateway.handle(anyhow::anyhow!("db password wrong").into(), &req, res);
        assert_eq!(res.status(), 500);
        assert_eq!(res.body_text(), r#"{"code":500,"message":"error"}"#);
        assert!(res.header("x-exception-message").is_none());
    }

    #[test]
    fn structured_message_always_shown() {
        let gateway = ExceptionGateway::new(RendererFactory::default(), false, "json");
        let (req, res) = prepared("application/json");
        let err = HttpError::not_acceptable("json only").with_code(42);
        let res = gateway.handle(anyhow::Error::from(err).into(), &req, res);
        assert_eq!(res.status(), 406);
        assert_eq!(res.body_text(), r#"{"code":42,"message":"json only"}"#);
    }

    #[test]
    fn html_clients_get_the_error_page() {
        let gateway = ExceptionGateway::new(RendererFactory::default(), true, "json");
        let (req, res) = prepared("text/html");
        let res = gateway.handle(anyhow::anyhow!("broken <thing>").into(), &req, res);
        assert_eq!(res.status(), 500);
        assert_eq!(res.header("content-type").as_deref(), Some("text/html;charset=utf-8"));
        assert!(res.body_text().contains("broken &lt;thing&gt;"));
        assert_eq!(res.header("x-exception-message").as_deref(), Some("broken <thing>"));
    }

    #[test]
    fn debug_trace_headers_drop_last_line() {
        let gateway = ExceptionGateway::new(RendererFactory::default(), true, "json");
        let (req, res) = prepared("application/json");
        let fault = FatalFault {
            message: "boom".into(),
            location: None,
            trace: vec!["#0 a".into(), "#1 b\r\nc".into(), "#2 {main}".into()],
        };
        let res = gateway.handle(fault.into(), &req, res);
        assert_eq!(res.header("x-exception-trace-00").as_deref(), Some("#0 a"));
        assert_eq!(res.header("x-exception-trace-01").as_deref(), Some("#1 b  c"));
        assert!(res.header("x-exception-trace-02").is_none());
    }

    #[test]
    fn custom_handler_result_is_verbatim() {
        let mut gateway = ExceptionGateway::new(RendererFactory::default(), true, "json");
        gateway.set_handler(Arc::new(|record: &ExceptionRecord, _: &Request, _: Response| {
            Response::text(418, format!("custom: {}", record.message))
        }));
        let (req, res) = prepared("application/json");
        let res = gateway.handle(anyhow::anyhow!("x").into(), &req, res);
        assert_eq!(res.status(), 418);
        assert_eq!(res.body_text(), "custom: x");
        assert!(res.header("x-exception-message").is_none());
    }

    #[test]
    fn panicking_handler_falls_back_to_default() {
        let mut gateway = ExceptionGateway::new(RendererFactory::default(), false, "json");
        gateway.set_handler(Arc::new(|_: &ExceptionRecord, _: &Request, _: Response| -> Response {
            panic!("handler bug")
        }));
        let (req, res) = prepared("application/json");
        let res = gateway.handle(Failure::Error(HttpError::forbidden("nope").into()), &req, res);
        assert_eq!(res.status(), 500);
        assert_eq!(res.body_text(), r#"{"code":500,"message":"error"}"#);
    }

    #[test]
    fn recover_fatal_synthesizes_context() {
        let gateway = ExceptionGateway::new(RendererFactory::default(), false, "html");
        let (req, res) = gateway.recover_fatal(FatalFault::new("out of memory"));
        assert_eq!(req.path, "/");
        assert_eq!(res.status(), 500);
        assert!(res.body_text().contains("Whoops"));
    }
}

