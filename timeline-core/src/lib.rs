//! Core model for the embedded timeline: events, datasets, render options and errors.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod theme;

pub use theme::{
    classify_background, luminance, luminance_milli, HostProbe, Rgb, Theme, ThemeDetectionError,
    ThemeState, ThemeSync, TickOutcome, TickSource,
};

/// Default pixel height of the embedded surface.
pub const DEFAULT_HEIGHT: u32 = 800;
/// Default minimum height of the widget's navigation strip.
pub const DEFAULT_MIN_NAV_HEIGHT: u32 = 150;
/// Default interval between two theme-detection ticks.
pub const DEFAULT_TICK_INTERVAL_MS: u32 = 500;
/// Class toggled on the embedded document's body while the host looks dark.
pub const DEFAULT_DARK_CLASS: &str = "dark-mode";

/// Options consumed by the embed builder. Constructed once per render pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    /// Height of the mount point and of the hosting surface, in pixels.
    pub height: u32,
    /// Whether the widget opens on the most recent event.
    pub start_at_end: bool,
    /// Minimum height of the navigation strip, in pixels.
    pub min_nav_height: u32,
    pub theme: ThemeSyncConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            height: DEFAULT_HEIGHT,
            start_at_end: false,
            min_nav_height: DEFAULT_MIN_NAV_HEIGHT,
            theme: ThemeSyncConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Build a validated configuration with the default theme settings.
    pub fn new(height: u32, start_at_end: bool, min_nav_height: u32) -> Result<Self, TimelineError> {
        let config = Self {
            height,
            start_at_end,
            min_nav_height,
            theme: ThemeSyncConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_theme(mut self, theme: ThemeSyncConfig) -> Self {
        self.theme = theme;
        self
    }

    /// Check the invariants that deserialization alone cannot enforce.
    pub fn validate(&self) -> Result<(), TimelineError> {
        if self.height == 0 {
            return Err(TimelineError::InvalidConfig(
                "height must be a positive number of pixels".to_string(),
            ));
        }
        if self.min_nav_height == 0 {
            return Err(TimelineError::InvalidConfig(
                "min_nav_height must be a positive number of pixels".to_string(),
            ));
        }
        self.theme.validate()
    }
}

/// Settings of the recurring theme-detection tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ThemeSyncConfig {
    pub interval_ms: u32,
    /// CSS class toggled on the embedded body. Must be a plain identifier.
    pub dark_class: String,
    pub fallback: FallbackPolicy,
}

impl Default for ThemeSyncConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_TICK_INTERVAL_MS,
            dark_class: DEFAULT_DARK_CLASS.to_string(),
            fallback: FallbackPolicy::default(),
        }
    }
}

impl ThemeSyncConfig {
    pub fn validate(&self) -> Result<(), TimelineError> {
        if self.interval_ms == 0 {
            return Err(TimelineError::InvalidConfig(
                "theme interval_ms must be positive".to_string(),
            ));
        }
        if !is_css_identifier(&self.dark_class) {
            return Err(TimelineError::InvalidConfig(format!(
                "dark_class {:?} is not a plain CSS class name",
                self.dark_class
            )));
        }
        Ok(())
    }
}

fn is_css_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '-' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Behaviour of a tick when the host background cannot be read.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Only ever add the dark class from the ambient preference; a light preference
    /// leaves the current state untouched.
    #[default]
    AddOnly,
    /// Mirror the ambient preference in both directions.
    Symmetric,
}

/// A calendar point in the widget's date shape. Components may arrive as numbers or
/// numeric strings; empty strings count as absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TimelineDate {
    #[serde(deserialize_with = "lenient::component")]
    pub year: i64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_component"
    )]
    pub month: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_component"
    )]
    pub day: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_component"
    )]
    pub hour: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_component"
    )]
    pub minute: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_component"
    )]
    pub second: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_component"
    )]
    pub millisecond: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_date: Option<String>,
}

impl TimelineDate {
    pub fn year(year: i64) -> Self {
        Self {
            year,
            ..Self::default()
        }
    }

    pub fn ymd(year: i64, month: u32, day: u32) -> Self {
        Self {
            year,
            month: Some(month),
            day: Some(day),
            ..Self::default()
        }
    }

    /// Calendar date, defaulting a missing month or day to the first one.
    pub fn as_naive_date(&self) -> Option<NaiveDate> {
        let year = i32::try_from(self.year).ok()?;
        NaiveDate::from_ymd_opt(year, self.month.unwrap_or(1), self.day.unwrap_or(1))
    }
}

mod lenient {
    use serde::{de::Error, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Component {
        Int(i64),
        Float(f64),
        Text(String),
    }

    fn parse<E: Error>(raw: Component) -> Result<Option<i64>, E> {
        match raw {
            Component::Int(value) => Ok(Some(value)),
            Component::Float(value) if value.fract() == 0.0 => Ok(Some(value as i64)),
            Component::Float(value) => Err(E::custom(format!("{value} is not a whole number"))),
            Component::Text(text) if text.trim().is_empty() => Ok(None),
            Component::Text(text) => text
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| E::custom(format!("{text:?} is not a number"))),
        }
    }

    fn narrow<T: TryFrom<i64>, E: Error>(value: i64) -> Result<T, E> {
        T::try_from(value).map_err(|_| E::custom(format!("{value} is out of range")))
    }

    pub fn component<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<i64>,
    {
        match parse::<D::Error>(Component::deserialize(deserializer)?)? {
            Some(value) => narrow::<T, D::Error>(value),
            None => Err(D::Error::custom("missing date component")),
        }
    }

    pub fn optional_component<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<i64>,
    {
        match Option::<Component>::deserialize(deserializer)? {
            Some(raw) => parse::<D::Error>(raw)?
                .map(narrow::<T, D::Error>)
                .transpose(),
            None => Ok(None),
        }
    }
}

/// One entry of the timeline, kept as the raw JSON record the widget will receive.
///
/// Loading never rejects an event for its shape; the accessors below read what they can
/// and return `None` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct TimelineEvent(Value);

impl TimelineEvent {
    /// Minimal well-formed event: a start date and a headline.
    pub fn new(start_date: TimelineDate, headline: impl Into<String>) -> Self {
        let mut record = Map::new();
        record.insert("start_date".to_string(), date_value(&start_date));
        record.insert(
            "text".to_string(),
            Value::Object(Map::from_iter([(
                "headline".to_string(),
                Value::String(headline.into()),
            )])),
        );
        Self(Value::Object(record))
    }

    pub fn with_end_date(mut self, end_date: TimelineDate) -> Self {
        self.set("end_date", date_value(&end_date));
        self
    }

    /// Body text. Rendered by the widget as author-trusted HTML.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        if let Some(Value::Object(block)) = self.object_mut().map(|record| {
            record
                .entry("text")
                .or_insert_with(|| Value::Object(Map::new()))
        }) {
            block.insert("text".to_string(), Value::String(text.into()));
        }
        self
    }

    pub fn with_media(mut self, url: impl Into<String>, caption: Option<String>) -> Self {
        let mut media = Map::new();
        media.insert("url".to_string(), Value::String(url.into()));
        if let Some(caption) = caption {
            media.insert("caption".to_string(), Value::String(caption));
        }
        self.set("media", Value::Object(media));
        self
    }

    pub fn start_date(&self) -> Option<TimelineDate> {
        self.date_field("start_date")
    }

    pub fn end_date(&self) -> Option<TimelineDate> {
        self.date_field("end_date")
    }

    pub fn headline(&self) -> Option<&str> {
        self.0.get("text")?.get("headline")?.as_str()
    }

    pub fn text(&self) -> Option<&str> {
        self.0.get("text")?.get("text")?.as_str()
    }

    pub fn media_url(&self) -> Option<&str> {
        self.0.get("media")?.get("url")?.as_str()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    fn date_field(&self, key: &str) -> Option<TimelineDate> {
        let raw = self.0.get(key)?;
        TimelineDate::deserialize(raw).ok()
    }

    fn object_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.0.as_object_mut()
    }

    fn set(&mut self, key: &str, value: Value) {
        if let Some(record) = self.object_mut() {
            record.insert(key.to_string(), value);
        }
    }
}

impl From<Value> for TimelineEvent {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn date_value(date: &TimelineDate) -> Value {
    serde_json::to_value(date).unwrap_or(Value::Null)
}

/// Ordered events plus the optional title slide and eras. Insertion order is the
/// display order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TimelineDataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<TimelineEvent>,
    pub events: Vec<TimelineEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub eras: Vec<TimelineEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,
}

impl TimelineDataset {
    pub fn new(events: Vec<TimelineEvent>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: TimelineEvent) -> Self {
        self.title = Some(title);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Earliest start and latest start-or-end date among events with a readable,
    /// valid calendar date.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.events
            .iter()
            .flat_map(|event| [event.start_date(), event.end_date()])
            .flatten()
            .filter_map(|date| date.as_naive_date())
            .fold(None, |range, date| match range {
                None => Some((date, date)),
                Some((lo, hi)) => Some((lo.min(date), hi.max(date))),
            })
    }
}

/// Line and column reported by the JSON parser, both 1-based.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

fn at_position(position: &Option<SourcePosition>) -> String {
    position
        .map(|position| format!(" at {position}"))
        .unwrap_or_default()
}

/// Errors raised while loading, embedding or theming a timeline.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("timeline data file not found: {}", .path.display())]
    DataNotFound { path: PathBuf },
    #[error("timeline data file {} could not be read: {message}", .path.display())]
    DataUnreadable { path: PathBuf, message: String },
    #[error("malformed timeline data{}: {message}", at_position(.position))]
    DataFormat {
        message: String,
        position: Option<SourcePosition>,
    },
    #[error("timeline data cannot be embedded: {0}")]
    Serialization(String),
    #[error("theme detection failed: {0}")]
    ThemeDetection(#[from] ThemeDetectionError),
    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),
}

impl TimelineError {
    /// Parser position carried by a format error.
    pub fn position(&self) -> Option<SourcePosition> {
        match self {
            Self::DataFormat { position, .. } => *position,
            _ => None,
        }
    }
}

/// Severity of a message shown above the timeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Error,
    Warning,
    Info,
}

/// A user-visible message rendered next to the timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

impl From<&TimelineError> for Notice {
    fn from(err: &TimelineError) -> Self {
        Notice::error(err.to_string())
    }
}
