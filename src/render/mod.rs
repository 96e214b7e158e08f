//! # Render Module
//!
//! The `render(negotiated type, payload) -> response` contract used by the
//! exception gateway for structured error payloads. A [`RendererFactory`]
//! maps negotiated types to [`Renderer`]s; unknown types fail with
//! [`RenderError::NotAcceptable`].

mod core;
mod json;
mod text;

pub use self::core::{RenderError, Renderer, RendererFactory};
pub use json::{JsonRenderer, JsonpRenderer};
pub use text::TextRenderer;
