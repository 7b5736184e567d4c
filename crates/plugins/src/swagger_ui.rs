//! Swagger UI page served at the viewer endpoint.

use {askama::Template, serde_json::Value, sofa_config::DOCUMENT_PATH};

use crate::error::Result;

const DEFAULT_TITLE: &str = "Swagger UI";

#[derive(Template)]
#[template(path = "swagger_ui.html", escape = "html")]
struct SwaggerUiTemplate<'a> {
    title: &'a str,
    /// JSON string literal, already escaped for a `<script>` block.
    spec_url: String,
}

/// Render the viewer for `document`, loading it back from the document path.
pub fn render_swagger_ui(document: &Value) -> Result<String> {
    let title = document
        .pointer("/info/title")
        .and_then(Value::as_str)
        .filter(|title| !title.is_empty())
        .unwrap_or(DEFAULT_TITLE);
    let template = SwaggerUiTemplate {
        title,
        spec_url: script_safe_json(DOCUMENT_PATH)?,
    };
    Ok(template.render()?)
}

fn script_safe_json(value: &str) -> Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(json
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029"))
}
