use std::io::{self, Write};

use tracing::warn;

use crate::http::{http_date, Cookie};

/// What to do with buffered output layers when draining them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainMode {
    /// Pass each layer's content down to the layer below, then close it.
    Flush,
    /// Drop each layer's content, then close it.
    Discard,
}

/// A cookie as handed to the transport: expiry already normalized to a
/// Unix timestamp, `None` for session cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieDirective {
    pub name: String,
    pub value: String,
    pub expires: Option<i64>,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

impl From<&Cookie> for CookieDirective {
    fn from(cookie: &Cookie) -> Self {
        let expires = cookie.expires.timestamp();
        if expires.is_none() {
            warn!(
                cookie = %cookie.name,
                expires = ?cookie.expires,
                "Unparseable cookie expiry - sending as session cookie"
            );
        }
        Self {
            name: cookie.name.clone(),
            value: cookie.value.clone(),
            expires: expires.filter(|ts| *ts != 0),
            path: cookie.path.clone(),
            domain: (!cookie.domain.is_empty()).then(|| cookie.domain.clone()),
            secure: cookie.secure,
            http_only: cookie.http_only,
        }
    }
}

impl CookieDirective {
    /// `Set-Cookie` header value.
    #[must_use]
    pub fn to_header_value(&self) -> String {
        let mut out = format!("{}={}", self.name, self.value);
        if let Some(date) = self.expires.and_then(http_date) {
            out.push_str("; Expires=");
            out.push_str(&date);
        }
        if !self.path.is_empty() {
            out.push_str("; Path=");
            out.push_str(&self.path);
        }
        if let Some(domain) = &self.domain {
            out.push_str("; Domain=");
            out.push_str(domain);
        }
        if self.secure {
            out.push_str("; Secure");
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        out
    }
}

/// The transport a response is emitted to.
///
/// Header, cookie and status writes may be staged until the first body
/// write; after that [`headers_sent`](TransportSink::headers_sent) is true
/// and only body writes still make sense.
pub trait TransportSink {
    fn headers_sent(&self) -> bool;

    /// # Errors
    /// Transport write failure.
    fn write_status_line(&mut self, protocol_version: &str, status: u16, reason: &str) -> io::Result<()>;

    /// `name` arrives display-cased; `values` are joined with `,`.
    ///
    /// # Errors
    /// Transport write failure.
    fn write_header(&mut self, name: &str, values: &[String]) -> io::Result<()>;

    /// # Errors
    /// Transport write failure.
    fn write_cookie(&mut self, cookie: &CookieDirective) -> io::Result<()>;

    /// Write to the base body channel, below any output buffer layer.
    ///
    /// # Errors
    /// Transport write failure.
    fn write_body(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Number of open output buffer layers.
    fn buffer_depth(&self) -> usize;

    /// Close layers until `target_depth` remain.
    ///
    /// # Errors
    /// Transport write failure while flushing.
    fn flush_buffers(&mut self, target_depth: usize, mode: DrainMode) -> io::Result<()>;
}

/// Status line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkStyle {
    /// `HTTP/1.1 200 OK`
    Http,
    /// `Status: 200 OK`, for CGI gateways.
    Cgi,
}

/// A [`TransportSink`] over any [`Write`].
///
/// Status, header and cookie lines are staged and sent, followed by the
/// blank separator line, on the first body write. Output written through
/// [`write_output`](StreamSink::write_output) lands in the innermost open
/// buffer layer.
pub struct StreamSink<W: Write> {
    out: W,
    style: SinkStyle,
    pending: Vec<String>,
    headers_sent: bool,
    buffers: Vec<Vec<u8>>,
}

impl<W: Write> StreamSink<W> {
    pub fn new(out: W, style: SinkStyle) -> Self {
        Self {
            out,
            style,
            pending: Vec::new(),
            headers_sent: false,
            buffers: Vec::new(),
        }
    }

    pub fn http(out: W) -> Self {
        Self::new(out, SinkStyle::Http)
    }

    pub fn cgi(out: W) -> Self {
        Self::new(out, SinkStyle::Cgi)
    }

    /// Open a new output buffer layer.
    pub fn push_buffer(&mut self) {
        self.buffers.push(Vec::new());
    }

    /// Application output outside the response body.
    ///
    /// # Errors
    /// Transport write failure when no buffer layer is open.
    pub fn write_output(&mut self, bytes: &[u8]) -> io::Result<()> {
        match self.buffers.last_mut() {
            Some(layer) => {
                layer.extend_from_slice(bytes);
                Ok(())
            }
            None => self.write_body(bytes),
        }
    }

    fn send_headers(&mut self) -> io::Result<()> {
        if self.headers_sent {
            return Ok(());
        }
        for line in self.pending.drain(..) {
            self.out.write_all(line.as_bytes())?;
            self.out.write_all(b"\r\n")?;
        }
        self.out.write_all(b"\r\n")?;
        self.headers_sent = true;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TransportSink for StreamSink<W> {
    fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    fn write_status_line(&mut self, protocol_version: &str, status: u16, reason: &str) -> io::Result<()> {
        let line = match self.style {
            SinkStyle::Http => format!("HTTP/{protocol_version} {status} {reason}"),
            SinkStyle::Cgi => format!("Status: {status} {reason}"),
        };
        self.pending.insert(0, line.trim_end().to_string());
        Ok(())
    }

    fn write_header(&mut self, name: &str, values: &[String]) -> io::Result<()> {
        self.pending.push(format!("{name}: {}", values.join(",")));
        Ok(())
    }

    fn write_cookie(&mut self, cookie: &CookieDirective) -> io::Result<()> {
        self.pending
            .push(format!("Set-Cookie: {}", cookie.to_header_value()));
        Ok(())
    }

    fn write_body(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.send_headers()?;
        self.out.write_all(bytes)?;
        self.out.flush()
    }

    fn buffer_depth(&self) -> usize {
        self.buffers.len()
    }

    fn flush_buffers(&mut self, target_depth: usize, mode: DrainMode) -> io::Result<()> {
        while self.buffers.len() > target_depth {
            let Some(layer) = self.buffers.pop() else {
                break;
            };
            if mode == DrainMode::Discard {
                continue;
            }
            match self.buffers.last_mut() {
                Some(below) => below.extend_from_slice(&layer),
                None => self.write_body(&layer)?,
            }
        }
        self.out.flush()
    }
}
