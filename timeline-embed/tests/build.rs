use serde_json::{json, Value};
use timeline_core::{RenderConfig, TimelineDataset, TimelineDate, TimelineEvent};
use timeline_embed::{build, EmbedBuilder, WidgetAssets, DATA_VARIABLE, MOUNT_POINT_ID};
use timeline_source::dataset_from_str;

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!(
        "{}/../timeline-source/tests/data/{name}",
        env!("CARGO_MANIFEST_DIR")
    ))
    .expect("fixture should exist")
}

/// Pull the dataset literal back out of the generated script.
fn embedded_payload(markup: &str) -> Value {
    let start_marker = format!("var {DATA_VARIABLE} = ");
    let start = markup.find(&start_marker).expect("data assignment") + start_marker.len();
    let end = start + markup[start..].find(";\n").expect("end of assignment");
    serde_json::from_str(&markup[start..end]).expect("literal should decode")
}

#[test]
fn payload_round_trips_fixture_events() {
    let text = fixture("timeline_data.json");
    let dataset = dataset_from_str(&text).unwrap();
    let doc = build(&dataset, &RenderConfig::default()).unwrap();

    let original: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(embedded_payload(doc.markup()), json!({ "events": original }));
    assert_eq!(
        serde_json::from_str::<Value>(doc.data_literal()).unwrap(),
        embedded_payload(doc.markup())
    );
    assert_eq!(doc.event_count(), 5);
}

#[test]
fn hostile_text_cannot_escape_the_script() {
    let headline = r#"</script><script>alert("x")</script>"#;
    let body = "quote \" apostrophe ' braces {} [] backslash \\ <!-- comment --> \u{2028}";
    let dataset = TimelineDataset::new(vec![
        TimelineEvent::new(TimelineDate::year(2023), headline).with_text(body),
    ]);
    let doc = build(&dataset, &RenderConfig::default()).unwrap();

    assert_eq!(doc.markup().matches("</script>").count(), 3);
    assert!(!doc.data_literal().contains("<!--"));

    let payload = embedded_payload(doc.markup());
    assert_eq!(payload["events"][0]["text"]["headline"], headline);
    assert_eq!(payload["events"][0]["text"]["text"], body);
}

#[test]
fn empty_dataset_builds_a_complete_document() {
    let doc = build(&TimelineDataset::default(), &RenderConfig::default()).unwrap();
    assert_eq!(embedded_payload(doc.markup()), json!({ "events": [] }));
    assert_eq!(doc.event_count(), 0);
    assert!(doc.markup().starts_with("<!DOCTYPE html>"));
    assert!(doc.markup().trim_end().ends_with("</html>"));
    assert!(doc
        .markup()
        .contains(&format!("new TL.Timeline('{MOUNT_POINT_ID}', {DATA_VARIABLE}, additionalOptions)")));
}

#[test]
fn mount_point_and_options_follow_config() {
    let config = RenderConfig::new(640, true, 120).unwrap();
    let doc = build(&TimelineDataset::default(), &config).unwrap();

    assert_eq!(doc.height(), 640);
    assert!(doc.markup().contains(&format!(
        r#"<div id="{MOUNT_POINT_ID}" style="width: 100%; height: 640px; margin: 0px;"></div>"#
    )));
    assert!(doc.markup().contains(
        r#"var additionalOptions = {"start_at_end":true,"is_embed":false,"timenav_height_min":120};"#
    ));
}

#[test]
fn stylesheet_and_script_come_from_one_release() {
    let builder = EmbedBuilder::new(WidgetAssets::new("https://cdn.knightlab.com/libs/timeline3", "3.8.12"));
    let doc = builder
        .build(&TimelineDataset::default(), &RenderConfig::default())
        .unwrap();

    assert!(doc.markup().contains(
        r#"<link title="timeline-styles" rel="stylesheet" href="https://cdn.knightlab.com/libs/timeline3/3.8.12/css/timeline.css">"#
    ));
    assert!(doc.markup().contains(
        r#"<script src="https://cdn.knightlab.com/libs/timeline3/3.8.12/js/timeline.js"></script>"#
    ));
}

#[test]
fn theme_pieces_are_embedded() {
    let doc = build(&TimelineDataset::default(), &RenderConfig::default()).unwrap();
    let markup = doc.markup();

    assert!(markup.contains("body.dark-mode .tl-timeline"));
    assert!(markup.contains("window.setInterval(updateTheme, 500);"));
    let widget_init = markup.find("new TL.Timeline").unwrap();
    let theme_loop = markup.find("function updateTheme").unwrap();
    assert!(widget_init < theme_loop);
}

#[test]
fn invalid_config_is_rejected_before_rendering() {
    let mut config = RenderConfig::default();
    config.height = 0;
    assert!(build(&TimelineDataset::default(), &config).is_err());
}

#[test]
fn build_leaves_dataset_untouched() {
    let dataset = dataset_from_str(&fixture("timeline_document.json")).unwrap();
    let before = dataset.clone();
    let first = build(&dataset, &RenderConfig::default()).unwrap();
    let second = build(&dataset, &RenderConfig::default()).unwrap();
    assert_eq!(dataset, before);
    assert_eq!(first, second);
}
