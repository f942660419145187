//! Loads the timeline dataset from its JSON document.
//!
//! The document is either a bare array of event records or the widget's own
//! `{"title": ..., "events": [...], "eras": [...]}` object. Individual events are not
//! validated here; the widget renders what it can.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use timeline_core::{Notice, SourcePosition, TimelineDataset, TimelineError, TimelineEvent};
use tracing::{debug, warn};

/// Conventional location of the data file, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "timeline_data.json";

/// Anything able to produce a dataset for one render pass.
pub trait EventDataSource {
    fn load(&self) -> Result<TimelineDataset, TimelineError>;

    /// Human readable origin, used in logs.
    fn describe(&self) -> String;
}

/// Reads the dataset from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonFileSource {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_PATH)
    }
}

impl EventDataSource for JsonFileSource {
    fn load(&self) -> Result<TimelineDataset, TimelineError> {
        let bytes = fs::read(&self.path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => TimelineError::DataNotFound {
                path: self.path.clone(),
            },
            _ => TimelineError::DataUnreadable {
                path: self.path.clone(),
                message: err.to_string(),
            },
        })?;
        dataset_from_slice(&bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A document already held in memory (bundled data, wasm callers).
#[derive(Debug, Clone)]
pub struct StaticSource {
    label: String,
    document: String,
}

impl StaticSource {
    pub fn new(label: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            document: document.into(),
        }
    }
}

impl EventDataSource for StaticSource {
    fn load(&self) -> Result<TimelineDataset, TimelineError> {
        dataset_from_str(&self.document)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

/// Parse a dataset from JSON text.
pub fn dataset_from_str(json: &str) -> Result<TimelineDataset, TimelineError> {
    dataset_from_slice(json.as_bytes())
}

/// Parse a dataset from raw file contents. Malformed UTF-8 is a format error with
/// the parser's position, like any other syntax problem.
pub fn dataset_from_slice(bytes: &[u8]) -> Result<TimelineDataset, TimelineError> {
    let value: Value = serde_json::from_slice(bytes).map_err(format_error)?;
    dataset_from_value(value)
}

/// Interpret an already parsed JSON value as a dataset.
pub fn dataset_from_value(value: Value) -> Result<TimelineDataset, TimelineError> {
    match value {
        Value::Array(records) => Ok(TimelineDataset::new(
            records.into_iter().map(TimelineEvent::from).collect(),
        )),
        Value::Object(ref document) if document.contains_key("events") => {
            serde_json::from_value(value).map_err(format_error)
        }
        other => Err(TimelineError::DataFormat {
            message: format!(
                "expected an array of events or an object with an `events` array, found {}",
                json_kind(&other)
            ),
            position: None,
        }),
    }
}

fn format_error(err: serde_json::Error) -> TimelineError {
    let full = err.to_string();
    if err.line() == 0 {
        return TimelineError::DataFormat {
            message: full,
            position: None,
        };
    }

    let suffix = format!(" at line {} column {}", err.line(), err.column());
    let message = full.strip_suffix(&suffix).unwrap_or(&full).to_string();
    TimelineError::DataFormat {
        message,
        position: Some(SourcePosition {
            line: err.line(),
            column: err.column(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object without `events`",
    }
}

/// Result of a load that never fails: the dataset to render plus the error, if any,
/// that forced the empty fallback.
#[derive(Debug)]
pub struct LoadOutcome {
    pub dataset: TimelineDataset,
    pub error: Option<TimelineError>,
}

impl LoadOutcome {
    /// Message to show above the timeline when the load failed.
    pub fn notice(&self) -> Option<Notice> {
        self.error.as_ref().map(Notice::from)
    }

    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}

/// Load from `source`, converting failures into an empty dataset plus a notice.
pub fn load_or_notice<S: EventDataSource + ?Sized>(source: &S) -> LoadOutcome {
    match source.load() {
        Ok(dataset) => {
            debug!(
                source = %source.describe(),
                events = dataset.len(),
                "timeline data loaded"
            );
            LoadOutcome {
                dataset,
                error: None,
            }
        }
        Err(err) => {
            warn!(source = %source.describe(), error = %err, "falling back to an empty timeline");
            LoadOutcome {
                dataset: TimelineDataset::default(),
                error: Some(err),
            }
        }
    }
}
