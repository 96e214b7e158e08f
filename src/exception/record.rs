use std::backtrace::BacktraceStatus;
use std::error::Error as StdError;

use super::fault::FatalFault;
use crate::error::{HttpError, RoutingError};
use crate::render::RenderError;

/// How a failure maps onto a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Ordinary application failure: `500`, message hidden outside debug.
    Recoverable,
    /// Carries its own status and headers; its message is always shown.
    Structured {
        status: u16,
        headers: Vec<(String, String)>,
    },
    /// A panic caught inside the kernel.
    Fatal,
}

impl Classification {
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Classification::Structured { status, .. } => *status,
            Classification::Recoverable | Classification::Fatal => 500,
        }
    }
}

/// A classified failure with its cause chain.
#[derive(Debug, Clone)]
pub struct ExceptionRecord {
    pub classification: Classification,
    /// Short type label (`HttpError`, `RoutingError`, `FatalFault`, `Error`).
    pub kind: &'static str,
    pub message: String,
    /// Application error code, when the failure carries one.
    pub code: Option<i64>,
    pub trace: Vec<String>,
    pub previous: Option<Box<ExceptionRecord>>,
}

struct Link {
    classification: Classification,
    kind: &'static str,
    message: String,
    code: Option<i64>,
}

fn classify(err: &(dyn StdError + 'static)) -> Link {
    if let Some(e) = err.downcast_ref::<HttpError>() {
        return Link {
            classification: Classification::Structured {
                status: e.status(),
                headers: e.headers().to_vec(),
            },
            kind: "HttpError",
            message: e.message().to_string(),
            code: e.code(),
        };
    }
    if let Some(e) = err.downcast_ref::<RoutingError>() {
        return Link {
            classification: Classification::Structured {
                status: e.status(),
                headers: e.headers(),
            },
            kind: "RoutingError",
            message: e.to_string(),
            code: None,
        };
    }
    if let Some(e) = err.downcast_ref::<FatalFault>() {
        return Link {
            classification: Classification::Fatal,
            kind: "FatalFault",
            message: e.message.clone(),
            code: None,
        };
    }
    let kind = if err.is::<RenderError>() { "RenderError" } else { "Error" };
    Link {
        classification: Classification::Recoverable,
        kind,
        message: err.to_string(),
        code: None,
    }
}

impl ExceptionRecord {
    /// Classify an error and its `source()` chain.
    ///
    /// The outermost link that is not merely recoverable decides the
    /// classification, so `.context(...)` around an [`HttpError`] keeps its
    /// status. The backtrace anyhow captured, when enabled, belongs to the
    /// root cause.
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        let links: Vec<Link> = err.chain().map(classify).collect();

        let backtrace = err.backtrace();
        let root_trace: Vec<String> = if backtrace.status() == BacktraceStatus::Captured {
            backtrace
                .to_string()
                .lines()
                .map(|l| l.trim_end().to_string())
                .collect()
        } else {
            Vec::new()
        };

        let mut previous: Option<Box<ExceptionRecord>> = None;
        let mut trace = root_trace;
        for link in links.iter().skip(1).rev() {
            previous = Some(Box::new(ExceptionRecord {
                classification: link.classification.clone(),
                kind: link.kind,
                message: link.message.clone(),
                code: link.code,
                trace: std::mem::take(&mut trace),
                previous,
            }));
        }

        let primary = links
            .iter()
            .find(|l| l.classification != Classification::Recoverable)
            .or_else(|| links.first());

        ExceptionRecord {
            classification: primary
                .map(|l| l.classification.clone())
                .unwrap_or(Classification::Recoverable),
            kind: primary.map_or("Error", |l| l.kind),
            message: primary.map(|l| l.message.clone()).unwrap_or_default(),
            code: primary.and_then(|l| l.code),
            trace,
            previous,
        }
    }

    #[must_use]
    pub fn from_fault(fault: &FatalFault) -> Self {
        let message = match &fault.location {
            Some(location) => format!("{} at {location}", fault.message),
            None => fault.message.clone(),
        };
        ExceptionRecord {
            classification: Classification::Fatal,
            kind: "FatalFault",
            message,
            code: None,
            trace: fault.trace.clone(),
            previous: None,
        }
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.classification.status()
    }

    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(self.classification, Classification::Structured { .. })
    }

    /// This record followed by its causes, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &ExceptionRecord> {
        std::iter::successors(Some(self), |r| r.previous.as_deref())
    }

    /// The innermost cause.
    #[must_use]
    pub fn root_cause(&self) -> &ExceptionRecord {
        self.chain().last().unwrap_or(self)
    }
}
