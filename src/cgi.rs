//! CGI front end: builds a [`Request`] from a CGI/1.1 environment.
//!
//! | Variable | Becomes |
//! |---|---|
//! | `REQUEST_METHOD` | method (default `GET`) |
//! | `PATH_INFO`, else `REQUEST_URI` without query | path (default `/`) |
//! | `QUERY_STRING` | query parameters (form-urlencoded) |
//! | `HTTP_*` | headers (`HTTP_X_API_KEY` becomes `x-api-key`) |
//! | `CONTENT_TYPE`, `CONTENT_LENGTH` | headers of the same name |
//! | `HTTP_COOKIE` | cookies |
//! | `SERVER_PROTOCOL` | protocol version (`HTTP/1.0` becomes `1.0`) |
//! | `HTTP_X_REQUEST_ID` | request id, when it is a valid ULID |

use std::collections::HashMap;
use std::io::Read;

use anyhow::{Context, Result};
use http::Method;
use tracing::debug;

use crate::http::Request;
use crate::ids::RequestId;

/// Split a `Cookie` header into name/value pairs.
#[must_use]
pub fn parse_cookies(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
        })
        .collect()
}

fn header_name(var: &str) -> Option<String> {
    let name = match var {
        "CONTENT_TYPE" | "CONTENT_LENGTH" => var,
        _ => var.strip_prefix("HTTP_")?,
    };
    Some(name.to_ascii_lowercase().replace('_', "-"))
}

/// Build a request from CGI variables and an already-read body.
///
/// # Errors
///
/// Fails when `REQUEST_METHOD` is not a valid HTTP method token.
pub fn request_from_vars<I, K, V>(vars: I, body: Vec<u8>) -> Result<Request>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let vars: HashMap<String, String> = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();

    let method = match vars.get("REQUEST_METHOD").map(|m| m.trim()) {
        Some(m) if !m.is_empty() => Method::from_bytes(m.to_ascii_uppercase().as_bytes())
            .with_context(|| format!("invalid REQUEST_METHOD '{m}'"))?,
        _ => Method::GET,
    };

    let path = vars
        .get("PATH_INFO")
        .filter(|p| !p.is_empty())
        .cloned()
        .or_else(|| {
            vars.get("REQUEST_URI")
                .map(|uri| uri.split('?').next().unwrap_or_default().to_string())
        })
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "/".to_string());

    let mut req = Request::new(method, path);

    if let Some(query) = vars.get("QUERY_STRING") {
        for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
            req = req.with_query(&k, v.into_owned());
        }
    }

    let mut names: Vec<&String> = vars.keys().collect();
    names.sort();
    for var in names {
        if let Some(name) = header_name(var) {
            req.headers.append(&name, vars[var].as_str());
        }
    }

    req.request_id = RequestId::from_headers(&req.headers);
    if let Some(cookie) = vars.get("HTTP_COOKIE") {
        req.cookies = parse_cookies(cookie);
    }
    if let Some(version) = vars
        .get("SERVER_PROTOCOL")
        .and_then(|p| p.strip_prefix("HTTP/"))
    {
        req.protocol_version = version.to_string();
    }
    req.body = body;

    debug!(
        request_id = %req.request_id,
        method = %req.method,
        path = %req.path,
        query_params = req.query_params.len(),
        headers = req.headers.len(),
        body_len = req.body.len(),
        "CGI request parsed"
    );
    Ok(req)
}

/// Build a request from the process environment, reading `CONTENT_LENGTH`
/// bytes of body from `input`.
///
/// # Errors
///
/// Fails on an invalid method or when the body cannot be read.
pub fn request_from_env(input: &mut impl Read) -> Result<Request> {
    let vars: Vec<(String, String)> = std::env::vars().collect();
    let length = vars
        .iter()
        .find(|(k, _)| k == "CONTENT_LENGTH")
        .and_then(|(_, v)| v.trim().parse::<u64>().ok())
        .unwrap_or(0);

    let mut body = Vec::new();
    input
        .take(length)
        .read_to_end(&mut body)
        .context("failed to read request body")?;
    request_from_vars(vars, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_environment_is_mapped() {
        let req = request_from_vars(
            [
                ("REQUEST_METHOD", "post"),
                ("PATH_INFO", "/users/42"),
                ("QUERY_STRING", "q=a%20b&page=2&page=3"),
                ("HTTP_ACCEPT", "application/json"),
                ("HTTP_X_API_KEY", "secret"),
                ("CONTENT_TYPE", "text/plain"),
                ("HTTP_COOKIE", "sid=abc; theme=dark"),
                ("SERVER_PROTOCOL", "HTTP/1.0"),
            ],
            b"hello".to_vec(),
        )
        .unwrap();

        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "/users/42");
        assert_eq!(req.get_query_param("q"), Some("a b"));
        assert_eq!(req.get_query_param("page"), Some("3"));
        assert_eq!(req.get_header("x-api-key"), Some("secret"));
        assert_eq!(req.get_header("Content-Type"), Some("text/plain"));
        assert_eq!(req.get_cookie("theme"), Some("dark"));
        assert_eq!(req.protocol_version, "1.0");
        assert_eq!(req.body, b"hello");
    }

    #[test]
    fn request_uri_is_used_without_path_info() {
        let req = request_from_vars([("REQUEST_URI", "/test?x=1")], Vec::new()).unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.path, "/test");
    }

    #[test]
    fn empty_environment_is_root_get() {
        let req = request_from_vars(Vec::<(String, String)>::new(), Vec::new()).unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.path, "/");
        assert_eq!(req.protocol_version, "1.1");
    }

    #[test]
    fn request_id_header_is_adopted() {
        let id = RequestId::new().to_string();
        let req = request_from_vars([("HTTP_X_REQUEST_ID", id.as_str())], Vec::new()).unwrap();
        assert_eq!(req.request_id.to_string(), id);
    }

    #[test]
    fn invalid_method_is_rejected() {
        assert!(request_from_vars([("REQUEST_METHOD", "BAD METHOD")], Vec::new()).is_err());
    }

    #[test]
    fn malformed_cookie_pairs_are_skipped() {
        assert_eq!(
            parse_cookies("a=1; junk; =x; b = 2"),
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string())
            ]
        );
    }
}
