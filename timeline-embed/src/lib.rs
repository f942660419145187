//! Builds the self-contained document that renders the timeline widget inside an
//! isolated frame and keeps its theme in step with the host page.

use serde::{Deserialize, Serialize};
use timeline_core::{RenderConfig, TimelineDataset, TimelineError};
use tracing::debug;

pub mod page;
mod script;
mod styles;
#[cfg(not(target_arch = "wasm32"))]
pub mod sync;

pub use page::{render_frame, render_host_page, PageConfig, PageSection};
pub use script::theme_sync_script;
pub use styles::override_styles;
#[cfg(not(target_arch = "wasm32"))]
pub use sync::ThemeSyncTask;

/// Id of the element the widget mounts into.
pub const MOUNT_POINT_ID: &str = "timeline-embed";
/// Global variable holding the serialized dataset inside the document.
pub const DATA_VARIABLE: &str = "timeline_json";

const DEFAULT_CDN_BASE: &str = "https://cdn.knightlab.com/libs/timeline3";
const DEFAULT_WIDGET_VERSION: &str = "latest";

/// Location of the widget's stylesheet and script. Both URLs derive from the same
/// version so style and behaviour cannot come from different releases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WidgetAssets {
    pub base_url: String,
    pub version: String,
}

impl Default for WidgetAssets {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CDN_BASE.to_string(),
            version: DEFAULT_WIDGET_VERSION.to_string(),
        }
    }
}

impl WidgetAssets {
    pub fn new(base_url: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            version: version.into(),
        }
    }

    pub fn stylesheet_url(&self) -> String {
        format!("{}/css/timeline.css", self.release_root())
    }

    pub fn script_url(&self) -> String {
        format!("{}/js/timeline.js", self.release_root())
    }

    fn release_root(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.version)
    }

    pub fn validate(&self) -> Result<(), TimelineError> {
        let base = self.base_url.as_str();
        if !(base.starts_with("https://") || base.starts_with("http://") || base.starts_with('/')) {
            return Err(TimelineError::InvalidConfig(format!(
                "widget base_url {base:?} must be an http(s) URL or an absolute path"
            )));
        }
        let version_ok = !self.version.is_empty()
            && self
                .version
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !version_ok {
            return Err(TimelineError::InvalidConfig(format!(
                "widget version {:?} is not a release name",
                self.version
            )));
        }
        Ok(())
    }
}

/// Non-default options handed to the widget constructor.
#[derive(Debug, Serialize)]
struct WidgetOptions {
    start_at_end: bool,
    is_embed: bool,
    timenav_height_min: u32,
}

impl From<&RenderConfig> for WidgetOptions {
    fn from(config: &RenderConfig) -> Self {
        Self {
            start_at_end: config.start_at_end,
            is_embed: false,
            timenav_height_min: config.min_nav_height,
        }
    }
}

/// The generated artifact: markup, styles and scripts in one string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedDocument {
    markup: String,
    data_literal: String,
    height: u32,
    event_count: usize,
}

impl EmbeddedDocument {
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn into_markup(self) -> String {
        self.markup
    }

    /// The dataset literal exactly as it appears inside the document's script.
    pub fn data_literal(&self) -> &str {
        &self.data_literal
    }

    /// Height in pixels of the surface the document must be mounted in.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn event_count(&self) -> usize {
        self.event_count
    }
}

/// Composes embedded documents for one widget release.
#[derive(Debug, Clone, Default)]
pub struct EmbedBuilder {
    assets: WidgetAssets,
}

impl EmbedBuilder {
    pub fn new(assets: WidgetAssets) -> Self {
        Self { assets }
    }

    pub fn assets(&self) -> &WidgetAssets {
        &self.assets
    }

    /// Render `dataset` into a document sized for `config.height`.
    ///
    /// Never fails on an empty dataset; errors only come from an invalid configuration.
    pub fn build(
        &self,
        dataset: &TimelineDataset,
        config: &RenderConfig,
    ) -> Result<EmbeddedDocument, TimelineError> {
        config.validate()?;
        self.assets.validate()?;

        let data_literal = script_literal(dataset)?;
        let options = script_literal(&WidgetOptions::from(config))?;
        let markup = format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<link title="timeline-styles" rel="stylesheet" href="{css}">
<style data-timeline-embed="theme">
{overrides}
</style>
<script src="{js}"></script>
</head>
<body>
<div id="{mount}" style="width: 100%; height: {height}px; margin: 0px;"></div>
<script type="text/javascript">
var additionalOptions = {options};
var {var} = {data};
window.timeline = new TL.Timeline('{mount}', {var}, additionalOptions);
</script>
<script type="text/javascript">
{theme}
</script>
</body>
</html>
"#,
            css = page::escape_html(&self.assets.stylesheet_url()),
            js = page::escape_html(&self.assets.script_url()),
            overrides = override_styles(&config.theme.dark_class),
            mount = MOUNT_POINT_ID,
            height = config.height,
            options = options,
            var = DATA_VARIABLE,
            data = data_literal,
            theme = theme_sync_script(&config.theme),
        );

        debug!(
            events = dataset.len(),
            height = config.height,
            bytes = markup.len(),
            "timeline embed built"
        );

        Ok(EmbeddedDocument {
            markup,
            data_literal,
            height: config.height,
            event_count: dataset.len(),
        })
    }
}

/// Build with the default widget release.
pub fn build(
    dataset: &TimelineDataset,
    config: &RenderConfig,
) -> Result<EmbeddedDocument, TimelineError> {
    EmbedBuilder::default().build(dataset, config)
}

/// Serialize `value` as JSON that can sit verbatim inside a `<script>` element.
///
/// Characters that could close the element, open a comment or end a JavaScript line
/// are written as `\u` escapes; they only ever occur inside JSON strings, so decoding
/// the literal yields the original value.
pub fn script_literal<T: Serialize + ?Sized>(value: &T) -> Result<String, TimelineError> {
    let json =
        serde_json::to_string(value).map_err(|err| TimelineError::Serialization(err.to_string()))?;
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    Ok(out)
}
