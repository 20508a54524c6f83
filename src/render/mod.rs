//! Page rendering module
//!
//! Builds the public page and the admin editing page straight from the
//! content document. All document text is HTML-escaped.

mod admin;
mod public;

pub use admin::render_admin_page;
pub use public::render_public_page;

use serde_json::Value;

/// Shared stylesheet for both pages
const BASE_STYLE: &str = r"
        * { box-sizing: border-box; }
        body {
            margin: 0;
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif;
            line-height: 1.6;
            color: #1f2933;
            background: #f5f7fa;
        }
        header {
            display: flex;
            justify-content: space-between;
            align-items: center;
            padding: 16px 32px;
            background: #323f4b;
            color: #fff;
        }
        header a { color: #9fe6a0; text-decoration: none; font-weight: 600; }
        main { max-width: 860px; margin: 32px auto; padding: 0 16px; }
        section, fieldset {
            background: #fff;
            border: 1px solid #e4e7eb;
            border-radius: 8px;
            padding: 20px 24px;
            margin-bottom: 24px;
        }
        img { max-width: 100%; border-radius: 6px; }
        .empty { color: #7b8794; font-style: italic; }
";

/// Escape text for use in HTML content and double-quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Text shown for a JSON value: strings as-is, everything else as compact JSON
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Page heading: the top-level `title` string when present
fn site_title(document: &crate::content::ContentDocument) -> String {
    use crate::content::ContentValue;
    match document.get("title") {
        Some(ContentValue::Scalar(Value::String(title))) if !title.is_empty() => title.clone(),
        _ => "Site".to_string(),
    }
}
