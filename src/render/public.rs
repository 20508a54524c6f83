// Public page rendering

use serde_json::{Map, Value};
use std::fmt::Write;

use super::{display_value, escape_html, site_title, BASE_STYLE};
use crate::content::{ContentDocument, ContentValue};

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"];

/// Render the public page: one block per section, in document order
pub fn render_public_page(document: &ContentDocument) -> String {
    let title = escape_html(&site_title(document));
    let mut body = String::new();

    for (name, value) in document.iter() {
        if name == "title" {
            continue;
        }
        match value {
            ContentValue::Section(fields) => render_section(&mut body, name, fields),
            ContentValue::Scalar(scalar) => {
                let _ = write!(
                    body,
                    "<section id=\"{id}\"><h2>{id}</h2>{content}</section>\n",
                    id = escape_html(name),
                    content = render_value(scalar),
                );
            }
        }
    }

    if body.is_empty() {
        body.push_str("<p class=\"empty\">No content yet. Add some from the admin page.</p>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>{BASE_STYLE}
        dt {{ font-weight: 600; text-transform: capitalize; }}
        dd {{ margin: 0 0 12px 0; }}
    </style>
</head>
<body>
    <header><h1>{title}</h1><a href="/admin">Edit</a></header>
    <main>
{body}    </main>
</body>
</html>"#
    )
}

fn render_section(out: &mut String, name: &str, fields: &Map<String, Value>) {
    let heading = match fields.get("title") {
        Some(Value::String(t)) if !t.is_empty() => t.as_str(),
        _ => name,
    };
    let _ = write!(
        out,
        "<section id=\"{}\"><h2>{}</h2><dl>",
        escape_html(name),
        escape_html(heading)
    );
    for (field, value) in fields {
        if field == "title" {
            continue;
        }
        let _ = write!(
            out,
            "<dt>{}</dt><dd>{}</dd>",
            escape_html(field),
            render_value(value)
        );
    }
    out.push_str("</dl></section>\n");
}

/// Site-relative image paths become `<img>`, everything else escaped text
fn render_value(value: &Value) -> String {
    if let Value::String(s) = value {
        let lower = s.to_ascii_lowercase();
        if s.starts_with('/') && IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            return format!("<img src=\"{0}\" alt=\"{0}\">", escape_html(s));
        }
    }
    format!("<p>{}</p>", escape_html(&display_value(value)))
}
