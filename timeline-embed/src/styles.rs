//! Stylesheet injected next to the widget's own CSS.

const DARK_CLASS_TOKEN: &str = "__DARK_CLASS__";

/// Dark rendering by inversion: the widget root is inverted and hue-rotated, media are
/// inverted a second time to look natural again, and slide panels get a white base so
/// the inverted page does not double-invert behind them.
const OVERRIDE_STYLES: &str = r#"html, body {
  margin: 0;
  padding: 0;
}

body.__DARK_CLASS__ .tl-timeline {
  filter: invert(100%) hue-rotate(180deg);
  background-color: #ffffff;
}

body.__DARK_CLASS__ img,
body.__DARK_CLASS__ video,
body.__DARK_CLASS__ iframe {
  filter: invert(100%) hue-rotate(180deg) !important;
}

body.__DARK_CLASS__ .tl-slide-content {
  background-color: #fff !important;
}"#;

/// Override stylesheet for the given theme-flag class.
pub fn override_styles(dark_class: &str) -> String {
    OVERRIDE_STYLES.replace(DARK_CLASS_TOKEN, dark_class)
}
