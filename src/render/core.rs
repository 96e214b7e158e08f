use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use super::json::{JsonRenderer, JsonpRenderer};
use super::text::TextRenderer;
use crate::http::{Request, Response};

/// Why a payload could not be rendered.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no renderer for type '{0}'")]
    NotAcceptable(String),
    #[error("{renderer} renderer cannot render {kind} payloads")]
    Unsupported {
        renderer: &'static str,
        kind: &'static str,
    },
    #[error("invalid JSONP callback '{0}'")]
    InvalidCallback(String),
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Writes a payload into the response for one representation type.
pub trait Renderer: Send + Sync {
    /// # Errors
    ///
    /// Returns [`RenderError`] when the payload has no form in this
    /// representation or cannot be serialized.
    fn render(&self, payload: &Value, req: &Request, res: &mut Response) -> Result<(), RenderError>;
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Renderers keyed by negotiated type (`json`, `html`, ...).
#[derive(Clone)]
pub struct RendererFactory {
    renderers: HashMap<String, Arc<dyn Renderer>>,
}

impl Default for RendererFactory {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl RendererFactory {
    /// A factory with no renderers at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    /// `json`, `javascript` (JSONP), `text` and `html`.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut factory = Self::empty();
        factory.register("json", Arc::new(JsonRenderer));
        factory.register("javascript", Arc::new(JsonpRenderer::default()));
        factory.register("text", Arc::new(TextRenderer::plain()));
        factory.register("html", Arc::new(TextRenderer::html()));
        factory
    }

    pub fn register(&mut self, ty: impl Into<String>, renderer: Arc<dyn Renderer>) {
        self.renderers.insert(ty.into().to_ascii_lowercase(), renderer);
    }

    /// # Errors
    ///
    /// Returns [`RenderError::NotAcceptable`] for an unknown type.
    pub fn select(&self, ty: &str) -> Result<Arc<dyn Renderer>, RenderError> {
        self.renderers
            .get(&ty.to_ascii_lowercase())
            .map(Arc::clone)
            .ok_or_else(|| RenderError::NotAcceptable(ty.to_string()))
    }

    /// Select the renderer for `ty` and render `payload` into `res`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] from selection or rendering.
    pub fn render(
        &self,
        ty: &str,
        payload: &Value,
        req: &Request,
        res: &mut Response,
    ) -> Result<(), RenderError> {
        self.select(ty)?.render(payload, req, res)
    }
}
