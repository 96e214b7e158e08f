use serde_json::Value;

use super::core::{RenderError, Renderer};
use crate::http::{Request, Response};

/// `application/json`
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, payload: &Value, _req: &Request, res: &mut Response) -> Result<(), RenderError> {
        let body = serde_json::to_vec(payload)?;
        res.set_header("Content-Type", "application/json;charset=utf-8");
        res.write(body);
        Ok(())
    }
}

/// JSONP: the JSON payload wrapped in a call to the function named by the
/// request's callback query parameter.
pub struct JsonpRenderer {
    param: String,
    fallback: String,
}

impl Default for JsonpRenderer {
    fn default() -> Self {
        Self::new("callback", "callback")
    }
}

impl JsonpRenderer {
    #[must_use]
    pub fn new(param: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            fallback: fallback.into(),
        }
    }
}

fn valid_callback(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'))
}

impl Renderer for JsonpRenderer {
    fn render(&self, payload: &Value, req: &Request, res: &mut Response) -> Result<(), RenderError> {
        let callback = req.get_query_param(&self.param).unwrap_or(&self.fallback);
        if !valid_callback(callback) {
            return Err(RenderError::InvalidCallback(callback.to_string()));
        }
        let json = serde_json::to_string(payload)?;
        res.set_header("Content-Type", "application/javascript;charset=utf-8");
        res.write(format!("{callback}({json});"));
        Ok(())
    }
}
