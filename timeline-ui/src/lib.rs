//! Isolated rendering surface for the timeline embed in WebAssembly hosts.
//!
//! The surface is a same-origin `srcdoc` frame owned by a yew app. Destroying the app
//! removes the frame, which ends the embedded document's theme tick with it.

use serde_json::Value;
use timeline_core::{Notice, RenderConfig, TimelineDataset};
use timeline_embed::{EmbedBuilder, EmbeddedDocument};

#[cfg(target_arch = "wasm32")]
mod styles;

/// Turn raw timeline data into a document, converting data errors into a notice and
/// an empty timeline.
pub fn prepare_embed(
    data: Value,
    config: &RenderConfig,
) -> Result<(EmbeddedDocument, Option<Notice>), timeline_core::TimelineError> {
    let (dataset, notice) = match timeline_source::dataset_from_value(data) {
        Ok(dataset) => (dataset, None),
        Err(err) => (TimelineDataset::default(), Some(Notice::from(&err))),
    };
    let document = EmbedBuilder::default().build(&dataset, config)?;
    Ok((document, notice))
}

#[cfg(target_arch = "wasm32")]
mod wasm_ui {
    use crate::{prepare_embed, styles};
    use serde_wasm_bindgen::from_value;
    use timeline_core::{Notice, NoticeLevel, RenderConfig};
    use timeline_embed::EmbeddedDocument;
    use wasm_bindgen::prelude::*;
    use web_sys::{console, Document, Element, Window};
    use yew::prelude::*;
    use yew::AppHandle;

    #[derive(Properties, PartialEq)]
    pub struct TimelineEmbedProps {
        pub document: EmbeddedDocument,
        pub notice: Option<Notice>,
    }

    #[function_component(TimelineEmbed)]
    pub fn timeline_embed(props: &TimelineEmbedProps) -> Html {
        use_effect_with((), |_| {
            if let Some(window) = web_sys::window() {
                if let Some(document) = window.document() {
                    if let Err(err) = styles::ensure_styles(&document) {
                        console::error_1(&err);
                    }
                }
            }
            || ()
        });

        let height = props.document.height();

        html! {
            <div class="timeline-embed-root">
                { props.notice.as_ref().map(render_notice).unwrap_or_default() }
                <iframe
                    class="timeline-embed-frame"
                    title="Timeline"
                    scrolling="no"
                    style={format!("height: {height}px;")}
                    height={height.to_string()}
                    srcdoc={props.document.markup().to_string()}
                />
            </div>
        }
    }

    fn render_notice(notice: &Notice) -> Html {
        html! {
            <div class="timeline-embed-notice" role="alert" data-level={notice_level(notice.level)}>
                { notice.message.clone() }
            </div>
        }
    }

    fn notice_level(level: NoticeLevel) -> &'static str {
        match level {
            NoticeLevel::Error => "error",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Info => "info",
        }
    }

    /// Owner of a mounted surface. Call `destroy` when the host removes the timeline.
    #[wasm_bindgen]
    pub struct TimelineEmbedHandle {
        app: Option<AppHandle<TimelineEmbed>>,
    }

    #[wasm_bindgen]
    impl TimelineEmbedHandle {
        pub fn destroy(&mut self) {
            if let Some(app) = self.app.take() {
                app.destroy();
            }
        }
    }

    #[wasm_bindgen]
    pub fn mount_timeline_embed(
        selector: &str,
        data: JsValue,
        config: Option<JsValue>,
    ) -> Result<TimelineEmbedHandle, JsValue> {
        let window: Window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document available"))?;

        let target: Element = document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Invalid selector: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("No element matches the selector"))?;

        let config: RenderConfig = match config {
            Some(cfg) if !cfg.is_undefined() && !cfg.is_null() => from_value(cfg)?,
            _ => RenderConfig::default(),
        };
        let data: serde_json::Value = from_value(data)?;
        let (document, notice) =
            prepare_embed(data, &config).map_err(|err| JsValue::from_str(&err.to_string()))?;

        if let Some(notice) = &notice {
            console::warn_1(&JsValue::from_str(&notice.message));
        }

        let app = yew::Renderer::<TimelineEmbed>::with_root_and_props(
            target,
            TimelineEmbedProps { document, notice },
        )
        .render();
        Ok(TimelineEmbedHandle { app: Some(app) })
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_ui::{mount_timeline_embed, TimelineEmbedHandle};

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_timeline_embed(
    _: &str,
    _: wasm_bindgen::JsValue,
    _: Option<wasm_bindgen::JsValue>,
) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "timeline-ui only supports the wasm32 target",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use timeline_core::NoticeLevel;

    #[test]
    fn valid_data_has_no_notice() {
        let (document, notice) = prepare_embed(
            json!([{ "start_date": { "year": 2024 }, "text": { "headline": "Sora" } }]),
            &RenderConfig::default(),
        )
        .unwrap();
        assert_eq!(document.event_count(), 1);
        assert!(notice.is_none());
    }

    #[test]
    fn unusable_data_renders_empty_with_notice() {
        let (document, notice) =
            prepare_embed(json!("not a timeline"), &RenderConfig::default()).unwrap();
        assert_eq!(document.event_count(), 0);
        assert_eq!(document.data_literal(), r#"{"events":[]}"#);
        assert_eq!(notice.map(|n| n.level), Some(NoticeLevel::Error));
    }
}
