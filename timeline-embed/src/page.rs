//! Standalone host page: the dashboard around the embedded timeline.
//!
//! Narrative text is static configuration. Section bodies and the intro are
//! author-trusted HTML; titles and notices are escaped.

use serde::{Deserialize, Serialize};
use timeline_core::{Notice, NoticeLevel};

use crate::EmbeddedDocument;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PageConfig {
    pub title: String,
    pub icon: Option<String>,
    pub heading: String,
    pub subtitle: Option<String>,
    pub intro_html: Option<String>,
    /// Expandable panels shown below the timeline.
    pub sections: Vec<PageSection>,
    /// Legend shown beside the main column.
    pub sidebar: Vec<PageSection>,
    pub footer_hint: Option<String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "AI Video Generation Timeline".to_string(),
            icon: Some("🎬".to_string()),
            heading: "AI Video Generation Timeline".to_string(),
            subtitle: Some("From GANs to world models".to_string()),
            intro_html: None,
            sections: Vec::new(),
            sidebar: Vec::new(),
            footer_hint: Some(
                "Scroll the timeline horizontally or click the dates at the bottom to navigate."
                    .to_string(),
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageSection {
    pub title: String,
    pub body_html: String,
    #[serde(default)]
    pub expanded: bool,
}

const HOST_STYLES: &str = r#"
:root { color-scheme: light dark; }
body {
  margin: 0;
  font-family: 'Inter', system-ui, -apple-system, 'Segoe UI', sans-serif;
  background: #ffffff;
  color: #31333f;
}
body[data-theme="dark"] { background: #0e1117; color: #fafafa; }
@media (prefers-color-scheme: dark) {
  body:not([data-theme="light"]) { background: #0e1117; color: #fafafa; }
}
.host-layout { display: grid; grid-template-columns: minmax(220px, 300px) 1fr; min-height: 100vh; }
.host-sidebar { padding: 24px; border-right: 1px solid rgba(128, 128, 128, 0.25); }
.host-main { padding: 24px 40px; min-width: 0; }
.host-toolbar { display: flex; justify-content: flex-end; }
.host-notice { border-radius: 8px; padding: 12px 16px; margin: 16px 0; }
.host-notice[data-level="error"] { background: rgba(255, 43, 43, 0.09); color: #ff4b4b; }
.host-notice[data-level="warning"] { background: rgba(255, 193, 7, 0.12); color: #b58105; }
.host-notice[data-level="info"] { background: rgba(28, 131, 225, 0.1); color: #1c83e1; }
.host-sections { display: grid; grid-template-columns: repeat(auto-fit, minmax(240px, 1fr)); gap: 16px; }
.host-sections details { border: 1px solid rgba(128, 128, 128, 0.25); border-radius: 8px; padding: 8px 12px; }
.timeline-frame { display: block; width: 100%; border: 0; }
"#;

const HOST_SCRIPT: &str = r#"
document.getElementById("host-theme-toggle").addEventListener("click", function () {
  var body = document.body;
  var dark = body.getAttribute("data-theme") === "dark" ||
    (!body.hasAttribute("data-theme") && window.matchMedia("(prefers-color-scheme: dark)").matches);
  body.setAttribute("data-theme", dark ? "light" : "dark");
});
"#;

/// Escape text for HTML element content and double-quoted attributes.
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

/// The isolated rendering surface: a same-origin `srcdoc` frame of the document's height.
pub fn render_frame(document: &EmbeddedDocument) -> String {
    format!(
        r#"<iframe class="timeline-frame" title="Timeline" scrolling="no" style="height: {height}px;" height="{height}" srcdoc="{srcdoc}"></iframe>"#,
        height = document.height(),
        srcdoc = escape_html(document.markup()),
    )
}

fn notice_level(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Error => "error",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Info => "info",
    }
}

fn render_notice(notice: &Notice) -> String {
    format!(
        r#"<div class="host-notice" role="alert" data-level="{}">{}</div>"#,
        notice_level(notice.level),
        escape_html(&notice.message)
    )
}

fn render_section(section: &PageSection) -> String {
    format!(
        "<details{}><summary>{}</summary>\n{}\n</details>",
        if section.expanded { " open" } else { "" },
        escape_html(&section.title),
        section.body_html
    )
}

/// Full host document with the timeline frame and an optional notice above it.
pub fn render_host_page(
    config: &PageConfig,
    document: &EmbeddedDocument,
    notice: Option<&Notice>,
) -> String {
    let icon = config
        .icon
        .as_deref()
        .map(|icon| format!("{} ", escape_html(icon)))
        .unwrap_or_default();
    let subtitle = config
        .subtitle
        .as_deref()
        .map(|text| format!("<h3>{}</h3>\n", escape_html(text)))
        .unwrap_or_default();
    let intro = config.intro_html.clone().unwrap_or_default();
    let notice = notice.map(render_notice).unwrap_or_default();
    let sidebar: Vec<String> = config
        .sidebar
        .iter()
        .map(|section| {
            format!(
                "<section><h3>{}</h3>\n{}\n</section>",
                escape_html(&section.title),
                section.body_html
            )
        })
        .collect();
    let sections: Vec<String> = config.sections.iter().map(render_section).collect();
    let footer = config
        .footer_hint
        .as_deref()
        .map(|hint| render_notice(&Notice::info(hint)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{styles}</style>
</head>
<body>
<div class="host-layout">
<aside class="host-sidebar">
{sidebar}
</aside>
<main class="host-main">
<div class="host-toolbar"><button type="button" id="host-theme-toggle">Toggle theme</button></div>
<h1>{icon}{heading}</h1>
{subtitle}{intro}
{notice}
{frame}
<div class="host-sections">
{sections}
</div>
{footer}
</main>
</div>
<script>{script}</script>
</body>
</html>
"#,
        title = escape_html(&config.title),
        styles = HOST_STYLES,
        sidebar = sidebar.join("\n"),
        icon = icon,
        heading = escape_html(&config.heading),
        subtitle = subtitle,
        intro = intro,
        notice = notice,
        frame = render_frame(document),
        sections = sections.join("\n"),
        footer = footer,
        script = HOST_SCRIPT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeline_core::{RenderConfig, TimelineDataset, TimelineDate, TimelineEvent};

    fn sample_document() -> EmbeddedDocument {
        let dataset = TimelineDataset::new(vec![TimelineEvent::new(
            TimelineDate::year(2014),
            "Say \"GAN\" & <b>go</b>",
        )]);
        crate::build(&dataset, &RenderConfig::new(600, false, 150).unwrap()).unwrap()
    }

    #[test]
    fn frame_has_document_height_and_escaped_srcdoc() {
        let frame = render_frame(&sample_document());
        assert!(frame.contains(r#"style="height: 600px;" height="600""#));
        let srcdoc = frame
            .split_once("srcdoc=\"")
            .and_then(|(_, rest)| rest.strip_suffix("\"></iframe>"))
            .unwrap();
        assert!(!srcdoc.contains('"'));
        assert!(!srcdoc.contains('<'));
        assert!(srcdoc.starts_with("&lt;!DOCTYPE html&gt;"));
    }

    #[test]
    fn notice_precedes_frame_and_is_escaped() {
        let notice = Notice::error("timeline data file not found: <data>.json");
        let page = render_host_page(&PageConfig::default(), &sample_document(), Some(&notice));
        let notice_at = page
            .find(r#"data-level="error">timeline data file not found: &lt;data&gt;.json"#)
            .unwrap();
        let frame_at = page.find("<iframe").unwrap();
        assert!(notice_at < frame_at);
    }

    #[test]
    fn page_without_notice_has_no_alert() {
        let page = render_host_page(&PageConfig::default(), &sample_document(), None);
        assert!(!page.contains(r#"data-level="error""#));
        assert!(page.contains("<title>AI Video Generation Timeline</title>"));
    }

    #[test]
    fn sections_render_as_details() {
        let config = PageConfig {
            sections: vec![
                PageSection {
                    title: "2014-2018: GAN era".to_string(),
                    body_html: "<p>Mode collapse</p>".to_string(),
                    expanded: true,
                },
                PageSection {
                    title: "2023-now: DiT".to_string(),
                    body_html: "<p>World models</p>".to_string(),
                    expanded: false,
                },
            ],
            ..PageConfig::default()
        };
        let page = render_host_page(&config, &sample_document(), None);
        assert!(page.contains("<details open><summary>2014-2018: GAN era</summary>"));
        assert!(page.contains("<details><summary>2023-now: DiT</summary>"));
    }
}
