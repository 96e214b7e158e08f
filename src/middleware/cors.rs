use std::time::Duration;

use http::Method;

use super::Middleware;
use crate::http::{Request, Response};

/// CORS (Cross-Origin Resource Sharing) middleware
///
/// Answers preflight OPTIONS requests directly and adds CORS headers to
/// every other response.
pub struct CorsMiddleware {
    allowed_origins: Vec<String>,
    allowed_headers: Vec<String>,
    allowed_methods: Vec<Method>,
}

impl CorsMiddleware {
    /// Create a CORS middleware with a specific policy
    ///
    /// ```
    /// use ant_kernel::middleware::CorsMiddleware;
    /// use http::Method;
    ///
    /// let cors = CorsMiddleware::new(
    ///     vec!["https://example.com".to_string()],
    ///     vec!["Content-Type".to_string()],
    ///     vec![Method::GET, Method::POST],
    /// );
    /// ```
    #[must_use]
    pub fn new(
        allowed_origins: Vec<String>,
        allowed_headers: Vec<String>,
        allowed_methods: Vec<Method>,
    ) -> Self {
        Self {
            allowed_origins,
            allowed_headers,
            allowed_methods,
        }
    }

    fn apply(&self, res: &mut Response) {
        res.set_header("Access-Control-Allow-Origin", self.allowed_origins.join(", "))
            .set_header("Access-Control-Allow-Headers", self.allowed_headers.join(", "))
            .set_header(
                "Access-Control-Allow-Methods",
                self.allowed_methods
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            );
    }
}

/// Permissive policy: any origin, common headers and methods.
impl Default for CorsMiddleware {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".into()],
            allowed_headers: vec!["Content-Type".into(), "Authorization".into()],
            allowed_methods: vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ],
        }
    }
}

impl Middleware for CorsMiddleware {
    fn name(&self) -> &'static str {
        "cors"
    }

    /// Preflight requests end here with `204` and the CORS headers.
    fn before(&self, req: &Request, _res: &mut Response) -> anyhow::Result<Option<Response>> {
        if req.method != Method::OPTIONS {
            return Ok(None);
        }
        let mut preflight = Response::new();
        preflight
            .set_status(204)
            .set_protocol_version(req.protocol_version.clone());
        self.apply(&mut preflight);
        Ok(Some(preflight))
    }

    fn after(&self, _req: &Request, res: &mut Response, _latency: Duration) -> anyhow::Result<()> {
        self.apply(res);
        Ok(())
    }
}
