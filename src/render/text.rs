use serde_json::Value;

use super::core::{kind_of, RenderError, Renderer};
use crate::http::{Request, Response};

/// Plain text or HTML. Only string payloads have a textual form.
pub struct TextRenderer {
    name: &'static str,
    content_type: &'static str,
}

impl TextRenderer {
    #[must_use]
    pub fn plain() -> Self {
        Self {
            name: "text",
            content_type: "text/plain;charset=utf-8",
        }
    }

    #[must_use]
    pub fn html() -> Self {
        Self {
            name: "html",
            content_type: "text/html;charset=utf-8",
        }
    }
}

impl Renderer for TextRenderer {
    fn render(&self, payload: &Value, _req: &Request, res: &mut Response) -> Result<(), RenderError> {
        let Value::String(text) = payload else {
            return Err(RenderError::Unsupported {
                renderer: self.name,
                kind: kind_of(payload),
            });
        };
        res.set_header("Content-Type", self.content_type);
        res.write(text);
        Ok(())
    }
}
