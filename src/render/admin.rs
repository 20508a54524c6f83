// Admin page rendering
//
// Inputs are named `section[field]` or `name` so a submit round-trips
// through the form merge. Values that would not survive that round trip
// (non-string JSON, names containing brackets) are shown disabled.

use serde_json::Value;
use std::fmt::Write;

use super::{display_value, escape_html, site_title, BASE_STYLE};
use crate::content::{ContentDocument, ContentValue};

/// Longer values get a textarea instead of a single-line input
const TEXTAREA_THRESHOLD: usize = 80;

/// Render the admin editing page
pub fn render_admin_page(document: &ContentDocument, allowed_extensions: &[String]) -> String {
    let title = escape_html(&site_title(document));
    let mut sections = String::new();
    let mut top_level = String::new();

    for (name, value) in document.iter() {
        match value {
            ContentValue::Section(fields) => {
                let _ = write!(sections, "<fieldset><legend>{}</legend>", escape_html(name));
                for (field, field_value) in fields {
                    let input_name = format!("{name}[{field}]");
                    let editable = is_editable_name(name) && is_editable_name(field);
                    sections.push_str(&render_input(&input_name, field, field_value, editable));
                }
                sections.push_str("</fieldset>\n");
            }
            ContentValue::Scalar(scalar) => {
                top_level.push_str(&render_input(name, name, scalar, is_editable_name(name)));
            }
        }
    }

    if !top_level.is_empty() {
        top_level = format!("<fieldset><legend>General</legend>{top_level}</fieldset>\n");
    }
    if sections.is_empty() && top_level.is_empty() {
        sections.push_str("<p class=\"empty\">The content document is empty.</p>\n");
    }

    let accept = allowed_extensions
        .iter()
        .map(|ext| format!(".{}", escape_html(ext)))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Admin - {title}</title>
    <style>{BASE_STYLE}
        label {{ display: block; font-weight: 600; margin-top: 12px; }}
        input[type=text], textarea {{ width: 100%; padding: 8px; border: 1px solid #cbd2d9; border-radius: 4px; font: inherit; }}
        textarea {{ min-height: 96px; }}
        button {{ margin-top: 16px; padding: 8px 20px; border: 0; border-radius: 4px; background: #3e7bfa; color: #fff; font-weight: 600; cursor: pointer; }}
        #upload-result {{ margin-left: 12px; font-family: monospace; }}
    </style>
</head>
<body>
    <header><h1>Admin - {title}</h1><a href="/">View site</a></header>
    <main>
        <form method="post" action="/api/update">
{top_level}{sections}            <button type="submit">Save</button>
        </form>
        <section>
            <h2>Upload image</h2>
            <form id="upload-form" method="post" action="/api/upload" enctype="multipart/form-data">
                <input type="file" name="image" accept="{accept}">
                <button type="submit">Upload</button>
                <span id="upload-result"></span>
            </form>
        </section>
    </main>
    <script>
        document.getElementById('upload-form').addEventListener('submit', async (event) => {{
            event.preventDefault();
            const result = document.getElementById('upload-result');
            const response = await fetch('/api/upload', {{ method: 'POST', body: new FormData(event.target) }});
            const data = await response.json();
            result.textContent = data.filePath || data.error;
        }});
    </script>
</body>
</html>"#
    )
}

/// Names with brackets cannot be expressed as a form field name
fn is_editable_name(name: &str) -> bool {
    !name.contains('[') && !name.contains(']')
}

fn render_input(input_name: &str, label: &str, value: &Value, editable: bool) -> String {
    let text = display_value(value);
    let editable = editable && value.is_string();
    let name_attr = if editable {
        format!(" name=\"{}\"", escape_html(input_name))
    } else {
        " disabled".to_string()
    };

    if text.len() > TEXTAREA_THRESHOLD || text.contains('\n') {
        format!(
            "<label>{}<textarea{name_attr}>{}</textarea></label>",
            escape_html(label),
            escape_html(&text)
        )
    } else {
        format!(
            "<label>{}<input type=\"text\"{name_attr} value=\"{}\"></label>",
            escape_html(label),
            escape_html(&text)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> ContentDocument {
        serde_json::from_value(value).unwrap()
    }

    fn allowed() -> Vec<String> {
        vec!["png".to_string(), "jpg".to_string()]
    }

    #[test]
    fn test_inputs_use_bracket_names() {
        let html = render_admin_page(
            &doc(json!({"hero": {"title": "Hi \"there\""}, "footer": "F"})),
            &allowed(),
        );
        assert!(html.contains("name=\"hero[title]\" value=\"Hi &quot;there&quot;\""));
        assert!(html.contains("name=\"footer\" value=\"F\""));
        assert!(html.contains("action=\"/api/update\""));
        assert!(html.contains("accept=\".png,.jpg\""));
    }

    #[test]
    fn test_long_values_use_textarea() {
        let long = "x".repeat(TEXTAREA_THRESHOLD + 1);
        let html = render_admin_page(&doc(json!({"about": {"text": long}})), &allowed());
        assert!(html.contains("<textarea name=\"about[text]\">"));
    }

    #[test]
    fn test_non_string_and_bracketed_values_are_disabled() {
        let html = render_admin_page(
            &doc(json!({"stats": {"visits": 10}, "odd[key]": "v", "flag": true})),
            &allowed(),
        );
        assert!(!html.contains("name=\"stats[visits]\""));
        assert!(html.contains("<input type=\"text\" disabled value=\"10\">"));
        assert!(!html.contains("name=\"odd[key]\""));
        assert!(!html.contains("name=\"flag\""));
    }

    #[test]
    fn test_empty_document() {
        let html = render_admin_page(&ContentDocument::new(), &allowed());
        assert!(html.contains("The content document is empty."));
        assert!(html.contains("name=\"image\""));
    }
}
