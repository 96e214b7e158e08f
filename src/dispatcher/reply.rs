use serde_json::Value;
use std::sync::Arc;

use crate::http::{Request, Response};
use crate::router::Arguments;

/// An action: reads the request, may mutate the working response, and
/// returns a [`Reply`] that is folded into it.
pub type Handler =
    Arc<dyn Fn(&Request, &mut Response, &Arguments) -> anyhow::Result<Reply> + Send + Sync>;

/// What an action hands back.
#[derive(Debug, Clone, Default)]
pub enum Reply {
    /// Keep the working response as the action left it.
    #[default]
    Empty,
    /// Append text to the body.
    Text(String),
    /// Serialize as the JSON body.
    Json(Value),
    /// Replace the working response.
    Response(Response),
}

impl Reply {
    /// Fold this reply into the working response.
    #[must_use]
    pub fn apply(self, mut res: Response) -> Response {
        match self {
            Reply::Empty => res,
            Reply::Text(text) => {
                res.write(text);
                res
            }
            Reply::Json(value) => {
                if !res.headers().contains("content-type") {
                    res.set_header("Content-Type", "application/json;charset=utf-8");
                }
                res.write(value.to_string());
                res
            }
            Reply::Response(replacement) => replacement,
        }
    }
}

impl From<()> for Reply {
    fn from((): ()) -> Self {
        Reply::Empty
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Text(text.to_string())
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Json(value)
    }
}

impl From<Response> for Reply {
    fn from(res: Response) -> Self {
        Reply::Response(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_appends_to_body() {
        let mut res = Response::new();
        res.write("1");
        let res = Reply::from("23").apply(res);
        assert_eq!(res.body_text(), "123");
    }

    #[test]
    fn json_sets_content_type_once() {
        let res = Reply::from(json!({"ok": true})).apply(Response::new());
        assert_eq!(res.body_text(), r#"{"ok":true}"#);
        assert_eq!(
            res.header("content-type").as_deref(),
            Some("application/json;charset=utf-8")
        );
    }

    #[test]
    fn response_replaces_working_one() {
        let res = Reply::from(Response::text(201, "made")).apply(Response::new());
        assert_eq!(res.status(), 201);
        assert_eq!(res.body_text(), "made");
    }
}
