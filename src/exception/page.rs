use std::fmt::Write as _;

use super::record::ExceptionRecord;
use crate::http::status_reason;

const STYLESHEET: &str = "\
body { margin: 0; padding: 40px; font: 12px/1.5 Verdana, sans-serif; color: #333; background: #eee; }
.container { max-width: 960px; margin: 0 auto; background: #fff; padding: 24px 32px; border: 1px solid #ccc; }
h1 { font-size: 22px; font-weight: normal; margin: 0 0 16px; }
h2 { font-size: 15px; margin: 24px 0 8px; }
.kind { color: #888; }
ol.trace { font-family: Menlo, Consolas, monospace; font-size: 11px; padding-left: 24px; }
ol.trace li { white-space: pre-wrap; word-break: break-all; }";

/// Escape text for HTML element content and attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn content(record: &ExceptionRecord, status: u16, message: &str, debug: bool) -> String {
    let mut html = String::new();
    if !debug {
        let _ = write!(
            html,
            "<h1>Whoops, looks like something went wrong.</h1>\n<p>{} {}</p>",
            status,
            escape_html(status_reason(status))
        );
        if record.is_structured() && !message.is_empty() {
            let _ = write!(html, "\n<p>{}</p>", escape_html(message));
        }
        return html;
    }

    let _ = write!(
        html,
        "<h1>{} <span class=\"kind\">({} {})</span></h1>",
        escape_html(message),
        status,
        escape_html(status_reason(status))
    );
    let total = record.chain().count();
    for (idx, link) in record.chain().enumerate() {
        let _ = write!(
            html,
            "\n<h2>{}/{} <span class=\"kind\">{}</span>: {}</h2>",
            idx + 1,
            total,
            link.kind,
            escape_html(&link.message)
        );
        if !link.trace.is_empty() {
            html.push_str("\n<ol class=\"trace\">");
            for line in &link.trace {
                let _ = write!(html, "<li>{}</li>", escape_html(line));
            }
            html.push_str("</ol>");
        }
    }
    html
}

/// The HTML error page used when no structured renderer applies.
///
/// Debug pages list every record in the cause chain with its trace;
/// production pages show only the status and, for structured errors,
/// their own message.
#[must_use]
pub fn render_page(record: &ExceptionRecord, status: u16, message: &str, debug: bool) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n    <head>\n        <meta charset=\"utf-8\" />\n        \
         <meta name=\"robots\" content=\"noindex,nofollow\" />\n        <style>\n{STYLESHEET}\n        \
         </style>\n    </head>\n    <body>\n<div class=\"container\">\n{}\n</div>\n    </body>\n</html>\n",
        content(record, status, message, debug)
    )
}
