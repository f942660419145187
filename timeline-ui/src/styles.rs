#![cfg(target_arch = "wasm32")]

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Node};

const STYLE_TAG_SELECTOR: &str = "style[data-timeline-ui]";

/// Host-side styles for the frame and the notice banner.
pub const DEFAULT_STYLES: &str = r#"
.timeline-embed-root {
  --timeline-notice-radius: 8px;
  --timeline-notice-error-bg: rgba(255, 43, 43, 0.09);
  --timeline-notice-error-text: #ff4b4b;
  --timeline-notice-warning-bg: rgba(255, 193, 7, 0.12);
  --timeline-notice-warning-text: #b58105;
  --timeline-notice-info-bg: rgba(28, 131, 225, 0.1);
  --timeline-notice-info-text: #1c83e1;
  display: flex;
  flex-direction: column;
  gap: 12px;
}

.timeline-embed-notice {
  border-radius: var(--timeline-notice-radius);
  padding: 12px 16px;
  font: inherit;
}

.timeline-embed-notice[data-level="error"] {
  background: var(--timeline-notice-error-bg);
  color: var(--timeline-notice-error-text);
}

.timeline-embed-notice[data-level="warning"] {
  background: var(--timeline-notice-warning-bg);
  color: var(--timeline-notice-warning-text);
}

.timeline-embed-notice[data-level="info"] {
  background: var(--timeline-notice-info-bg);
  color: var(--timeline-notice-info-text);
}

.timeline-embed-frame {
  display: block;
  width: 100%;
  border: 0;
}
"#;

pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.query_selector(STYLE_TAG_SELECTOR)?.is_some() {
        return Ok(());
    }

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document has no <head> element"))?;

    let style_el = document.create_element("style")?;
    style_el.set_attribute("data-timeline-ui", "embed")?;
    style_el.set_text_content(Some(DEFAULT_STYLES));
    head.append_child(&style_el.clone().dyn_into::<Node>()?)?;

    Ok(())
}
