//! Embedded widget bundles served as MCP resources.

use rust_embed::RustEmbed;
use serde_json::{json, Value};
use vita_types::WIDGET_URI;

/// MIME type the MCP Apps extension expects for widget markup.
pub const WIDGET_MIME_TYPE: &str = "text/html;profile=mcp-app";

const URI_PREFIX: &str = "ui://widget/";

/// Dashboard markup and script, embedded at build time.
#[derive(RustEmbed)]
#[folder = "static/widgets/"]
pub struct WidgetAssets;

/// A resource addressable by URI.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetResource {
    pub uri: String,
    pub name: String,
    pub text: String,
}

impl WidgetResource {
    /// Entry for `resources/list`.
    pub fn listing(&self) -> Value {
        json!({
            "uri": self.uri,
            "name": self.name,
            "mimeType": WIDGET_MIME_TYPE,
        })
    }

    /// Entry for `resources/read`.
    pub fn contents(&self) -> Value {
        json!({
            "uri": self.uri,
            "mimeType": WIDGET_MIME_TYPE,
            "text": self.text,
        })
    }
}

/// Widgets exposed to clients. Only the dashboard is advertised.
pub fn list() -> Vec<WidgetResource> {
    read(WIDGET_URI).into_iter().collect()
}

/// Load the widget addressed by `uri`, if embedded.
pub fn read(uri: &str) -> Option<WidgetResource> {
    let file = uri.strip_prefix(URI_PREFIX)?;
    let asset = WidgetAssets::get(file)?;
    let text = String::from_utf8_lossy(&asset.data).into_owned();
    Some(WidgetResource {
        uri: uri.to_string(),
        name: file.trim_end_matches(".html").to_string(),
        text,
    })
}
