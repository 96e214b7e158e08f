use super::Middleware;
use crate::http::{Request, Response};

/// Static bearer-token check; rejects with `401` before the action runs.
pub struct AuthMiddleware {
    token: String,
}

impl AuthMiddleware {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    fn accepts(&self, header: &str) -> bool {
        let presented = header.strip_prefix("Bearer ").unwrap_or(header).trim();
        presented == self.token
    }
}

impl Middleware for AuthMiddleware {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn before(&self, req: &Request, _res: &mut Response) -> anyhow::Result<Option<Response>> {
        match req.get_header("authorization") {
            Some(h) if self.accepts(h) => Ok(None),
            _ => {
                let mut denied = Response::error(401, "Unauthorized");
                denied.set_header("WWW-Authenticate", "Bearer");
                Ok(Some(denied))
            }
        }
    }
}
