//! Light/dark inference from the host document's computed background.
//!
//! The embedded document runs the same algorithm in script; this module is the
//! reference used by native hosts, the wasm bridge and the tests.

use serde::{Deserialize, Serialize};

use crate::FallbackPolicy;

/// Luminance (in thousandths) at and above which a background counts as light.
pub const DARK_THRESHOLD_MILLI: u32 = 128_000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a computed colour string of the form `rgb(r, g, b)` or `rgba(r, g, b, a)`.
    ///
    /// Accepts exactly what the embedded script's `COLOR` pattern accepts: channels are
    /// `-?[0-9.]+` separated by commas or whitespace, and alpha, if present, follows a
    /// `,` or `/`. Fully transparent colours are rejected: they say nothing about what
    /// the user sees.
    pub fn parse_css(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        let inner = value
            .strip_prefix("rgba(")
            .or_else(|| value.strip_prefix("rgb("))?
            .strip_suffix(')')?;

        let mut rest = inner.trim_start();
        let mut channels = [0u8; 3];
        for (index, channel) in channels.iter_mut().enumerate() {
            if index > 0 {
                let next = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
                if next.len() == rest.len() {
                    return None;
                }
                rest = next;
            }
            let (number, tail) = take_number(rest, true)?;
            *channel = parse_channel(number)?;
            rest = tail;
        }

        let rest = rest.trim_start();
        if let Some(alpha) = rest.strip_prefix(|c: char| c == ',' || c == '/') {
            let (number, tail) = take_number(alpha.trim_start(), false)?;
            if !tail.trim().is_empty() || parse_number(number)? <= 0.0 {
                return None;
            }
        } else if !rest.is_empty() {
            return None;
        }

        let [r, g, b] = channels;
        Some(Self { r, g, b })
    }
}

/// Split off a leading `-?[0-9.]+` token.
fn take_number(input: &str, signed: bool) -> Option<(&str, &str)> {
    let sign = usize::from(signed && input.starts_with('-'));
    let end = input[sign..]
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .map_or(input.len(), |end| end + sign);
    (end > sign).then(|| input.split_at(end))
}

fn parse_number(raw: &str) -> Option<f64> {
    let value: f64 = raw.parse().ok()?;
    value.is_finite().then_some(value)
}

fn parse_channel(raw: &str) -> Option<u8> {
    let value = parse_number(raw)?;
    Some(value.clamp(0.0, 255.0).round() as u8)
}

/// `299R + 587G + 114B`, i.e. perceptual luminance scaled by 1000 to keep the
/// threshold comparison exact.
pub fn luminance_milli(rgb: Rgb) -> u32 {
    299 * u32::from(rgb.r) + 587 * u32::from(rgb.g) + 114 * u32::from(rgb.b)
}

/// `Y = 0.299R + 0.587G + 0.114B`, in `0.0..=255.0`.
pub fn luminance(rgb: Rgb) -> f64 {
    f64::from(luminance_milli(rgb)) / 1000.0
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn from_luminance_milli(milli: u32) -> Self {
        if milli < DARK_THRESHOLD_MILLI {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn from_rgb(rgb: Rgb) -> Self {
        Self::from_luminance_milli(luminance_milli(rgb))
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Theme::Dark)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Classify a computed background colour string.
pub fn classify_background(css: &str) -> Result<Theme, ThemeDetectionError> {
    Rgb::parse_css(css)
        .map(Theme::from_rgb)
        .ok_or_else(|| ThemeDetectionError::UnrecognizedColor(css.to_string()))
}

/// Per-tick detection failures. Always recovered by the fallback branch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThemeDetectionError {
    #[error("host document is not readable: {0}")]
    HostUnavailable(String),
    #[error("unrecognised background colour {0:?}")]
    UnrecognizedColor(String),
}

/// What the embedded context can observe about its host.
pub trait HostProbe {
    /// Computed background colour of the host document's body.
    fn background_color(&self) -> Result<String, ThemeDetectionError>;

    /// Ambient `prefers-color-scheme: dark` signal of the embedding environment.
    fn prefers_dark(&self) -> bool;
}

/// Observable state of one embedded document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ThemeState {
    Uninitialized,
    Light,
    Dark,
}

/// Where a tick took its decision from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickSource {
    Host { theme: Theme, luminance_milli: u32 },
    Ambient {
        prefers_dark: bool,
        error: ThemeDetectionError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    pub source: TickSource,
    pub state: ThemeState,
    /// Whether the dark flag flipped during this tick.
    pub changed: bool,
}

/// The dark flag of one embedded document and the tick that maintains it.
#[derive(Debug, Clone)]
pub struct ThemeSync {
    policy: FallbackPolicy,
    dark: bool,
    ticks: u64,
}

impl ThemeSync {
    pub fn new(policy: FallbackPolicy) -> Self {
        Self {
            policy,
            dark: false,
            ticks: 0,
        }
    }

    pub fn is_dark(&self) -> bool {
        self.dark
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn state(&self) -> ThemeState {
        match (self.ticks, self.dark) {
            (0, _) => ThemeState::Uninitialized,
            (_, true) => ThemeState::Dark,
            (_, false) => ThemeState::Light,
        }
    }

    /// Run one detection tick against `probe`.
    ///
    /// A readable host background always sets the flag to match it. Otherwise the
    /// ambient preference decides; under [`FallbackPolicy::AddOnly`] it can only add
    /// the flag.
    pub fn tick<P: HostProbe + ?Sized>(&mut self, probe: &P) -> TickOutcome {
        let before = self.dark;
        let source = match probe.background_color().and_then(|css| {
            Rgb::parse_css(&css).ok_or(ThemeDetectionError::UnrecognizedColor(css))
        }) {
            Ok(rgb) => {
                let milli = luminance_milli(rgb);
                let theme = Theme::from_luminance_milli(milli);
                self.dark = theme.is_dark();
                TickSource::Host {
                    theme,
                    luminance_milli: milli,
                }
            }
            Err(error) => {
                let prefers_dark = probe.prefers_dark();
                match (prefers_dark, self.policy) {
                    (true, _) => self.dark = true,
                    (false, FallbackPolicy::Symmetric) => self.dark = false,
                    (false, FallbackPolicy::AddOnly) => {}
                }
                TickSource::Ambient {
                    prefers_dark,
                    error,
                }
            }
        };
        self.ticks += 1;

        TickOutcome {
            source,
            state: self.state(),
            changed: before != self.dark,
        }
    }
}

impl Default for ThemeSync {
    fn default() -> Self {
        Self::new(FallbackPolicy::default())
    }
}
