use std::path::PathBuf;

use serde_json::Value;
use timeline_core::{NoticeLevel, TimelineError};
use timeline_source::{load_or_notice, EventDataSource, JsonFileSource};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR")))
}

#[test]
fn loads_bare_event_array_in_file_order() {
    let dataset = JsonFileSource::new(fixture_path("timeline_data.json"))
        .load()
        .expect("fixture should load");

    let headlines: Vec<_> = dataset.events.iter().filter_map(|e| e.headline()).collect();
    assert_eq!(
        headlines,
        vec![
            "Generative Adversarial Networks",
            "VGAN",
            "MoCoGAN",
            "Make-A-Video & Imagen Video",
            "Sora",
        ]
    );
    let range = dataset
        .date_range()
        .map(|(from, to)| (from.to_string(), to.to_string()));
    assert_eq!(
        range,
        Some(("2014-06-01".to_string(), "2024-02-15".to_string()))
    );
    assert!(dataset.title.is_none());
}

#[test]
fn loads_widget_document_with_title_and_eras() {
    let dataset = JsonFileSource::new(fixture_path("timeline_document.json"))
        .load()
        .expect("fixture should load");

    assert_eq!(dataset.len(), 1);
    assert_eq!(
        dataset.title.as_ref().and_then(|title| title.headline()),
        Some("AI Video Generation")
    );
    assert_eq!(dataset.eras.len(), 1);

    let raw: Value =
        serde_json::from_str(&std::fs::read_to_string(fixture_path("timeline_document.json")).unwrap())
            .unwrap();
    assert_eq!(serde_json::to_value(&dataset).unwrap(), raw);
}

#[test]
fn empty_array_is_a_valid_dataset() {
    let outcome = load_or_notice(&JsonFileSource::new(fixture_path("empty.json")));
    assert!(outcome.dataset.is_empty());
    assert!(!outcome.is_fallback());
    assert_eq!(outcome.notice(), None);
}

#[test]
fn missing_file_is_data_not_found() {
    let source = JsonFileSource::new(fixture_path("does_not_exist.json"));
    let err = source.load().unwrap_err();
    assert!(matches!(err, TimelineError::DataNotFound { ref path } if path.ends_with("does_not_exist.json")));

    let outcome = load_or_notice(&source);
    assert!(outcome.dataset.is_empty());
    assert!(outcome.is_fallback());
    let notice = outcome.notice().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.message.contains("not found"));
}

#[test]
fn truncated_file_is_data_format_with_diagnostic() {
    let source = JsonFileSource::new(fixture_path("truncated.json"));
    let err = source.load().unwrap_err();
    let TimelineError::DataFormat { message, position } = &err else {
        panic!("expected a format error, got {err:?}");
    };
    assert!(!message.is_empty());
    assert_eq!(position.map(|p| p.line), Some(4));

    let outcome = load_or_notice(&source);
    assert!(outcome.dataset.is_empty());
    let notice = outcome.notice().unwrap();
    assert!(notice.message.contains(message.as_str()));
    assert!(notice.message.contains("line 4"));
}

#[test]
fn invalid_utf8_is_data_format_with_position() {
    let source = JsonFileSource::new(fixture_path("invalid_utf8.json"));
    let err = source.load().unwrap_err();
    let TimelineError::DataFormat { position, .. } = &err else {
        panic!("expected a format error, got {err:?}");
    };
    assert_eq!(position.map(|p| p.line), Some(1));

    let outcome = load_or_notice(&source);
    assert!(outcome.dataset.is_empty());
    assert_eq!(outcome.notice().map(|n| n.level), Some(NoticeLevel::Error));
}
