//! Framework-neutral WASM <-> JavaScript bridge for building timeline embeds.

use serde::Deserialize;
use serde_wasm_bindgen::from_value;
use timeline_core::{FallbackPolicy, RenderConfig, TimelineError};
use timeline_embed::{EmbedBuilder, WidgetAssets};
use wasm_bindgen::prelude::*;

/// Partial configuration accepted from JavaScript; missing fields keep their defaults.
#[derive(Deserialize, Default)]
pub(crate) struct JsRenderConfig {
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    start_at_end: Option<bool>,
    #[serde(default)]
    min_nav_height: Option<u32>,
    #[serde(default)]
    tick_interval_ms: Option<u32>,
    #[serde(default)]
    symmetric_fallback: Option<bool>,
    #[serde(default)]
    widget_version: Option<String>,
}

impl From<&JsRenderConfig> for RenderConfig {
    fn from(cfg: &JsRenderConfig) -> Self {
        let mut base = RenderConfig::default();
        if let Some(height) = cfg.height {
            base.height = height;
        }
        if let Some(start_at_end) = cfg.start_at_end {
            base.start_at_end = start_at_end;
        }
        if let Some(min_nav_height) = cfg.min_nav_height {
            base.min_nav_height = min_nav_height;
        }
        if let Some(interval_ms) = cfg.tick_interval_ms {
            base.theme.interval_ms = interval_ms;
        }
        if let Some(symmetric) = cfg.symmetric_fallback {
            base.theme.fallback = if symmetric {
                FallbackPolicy::Symmetric
            } else {
                FallbackPolicy::AddOnly
            };
        }
        base
    }
}

impl From<&JsRenderConfig> for WidgetAssets {
    fn from(cfg: &JsRenderConfig) -> Self {
        let mut assets = WidgetAssets::default();
        if let Some(version) = &cfg.widget_version {
            assets.version = version.clone();
        }
        assets
    }
}

fn read_config(config: Option<JsValue>) -> Result<JsRenderConfig, JsValue> {
    match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => from_value(js_cfg)
            .map_err(|err| JsValue::from_str(&format!("Could not read config: {err}"))),
        _ => Ok(JsRenderConfig::default()),
    }
}

/// Build the embeddable HTML document for `dataset` (an event array or a
/// `{events: [...]}` object).
#[wasm_bindgen]
pub fn build_embed(dataset: JsValue, config: Option<JsValue>) -> Result<String, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let value = from_value::<serde_json::Value>(dataset)
        .map_err(|err| JsValue::from_str(&format!("Could not read timeline data: {err}")))?;
    let dataset = timeline_source::dataset_from_value(value)
        .map_err(|err| JsValue::from_str(&format_timeline_error(err)))?;

    let cfg = read_config(config)?;
    let document = EmbedBuilder::new(WidgetAssets::from(&cfg))
        .build(&dataset, &RenderConfig::from(&cfg))
        .map_err(|err| JsValue::from_str(&format_timeline_error(err)))?;

    Ok(document.into_markup())
}

/// `"light"` or `"dark"` for a computed background colour, `undefined` when the
/// colour is not an opaque `rgb()`/`rgba()` value.
#[wasm_bindgen]
pub fn classify_background(css: &str) -> Option<String> {
    timeline_core::classify_background(css)
        .ok()
        .map(|theme| theme.as_str().to_string())
}

fn format_timeline_error(err: TimelineError) -> String {
    format!("Timeline error: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_js_config_overrides_only_given_fields() {
        let cfg: JsRenderConfig =
            serde_json::from_str(r#"{"height": 500, "symmetric_fallback": true}"#).unwrap();
        let config = RenderConfig::from(&cfg);
        assert_eq!(config.height, 500);
        assert_eq!(config.min_nav_height, RenderConfig::default().min_nav_height);
        assert_eq!(config.theme.fallback, FallbackPolicy::Symmetric);
        assert_eq!(WidgetAssets::from(&cfg), WidgetAssets::default());
    }

    #[test]
    fn classifies_host_colours() {
        assert_eq!(classify_background("rgb(14, 17, 23)").as_deref(), Some("dark"));
        assert_eq!(classify_background("rgb(255, 255, 255)").as_deref(), Some("light"));
        assert_eq!(classify_background("transparent"), None);
    }
}
