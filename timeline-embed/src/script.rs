//! Theme-sync script run inside the embedded document.
//!
//! Mirrors [`timeline_core::ThemeSync::tick`]: read the host body's computed background,
//! classify by integer luminance, otherwise fall back to `prefers-color-scheme`.

use timeline_core::theme::DARK_THRESHOLD_MILLI;
use timeline_core::{FallbackPolicy, ThemeSyncConfig};

const THEME_SYNC_TEMPLATE: &str = r#"(function () {
  var DARK_CLASS = __DARK_CLASS__;
  var THRESHOLD_MILLI = __THRESHOLD_MILLI__;
  var SYMMETRIC_FALLBACK = __SYMMETRIC_FALLBACK__;
  var COLOR = /^rgba?\(\s*(-?[\d.]+)[\s,]+(-?[\d.]+)[\s,]+(-?[\d.]+)\s*(?:[,\/]\s*([\d.]+)\s*)?\)$/i;

  function parseRgb(value) {
    var match = typeof value === "string" ? value.trim().match(COLOR) : null;
    if (!match) return null;
    if (match[4] !== undefined && !(Number(match[4]) > 0)) return null;
    var rgb = [match[1], match[2], match[3]].map(function (channel) {
      return Math.round(Math.min(255, Math.max(0, Number(channel))));
    });
    return rgb.some(isNaN) ? null : rgb;
  }

  function hostBackground() {
    var parentDoc = window.parent.document;
    return window.getComputedStyle(parentDoc.body).backgroundColor;
  }

  function ambientPrefersDark() {
    try {
      return !!(window.matchMedia && window.matchMedia("(prefers-color-scheme: dark)").matches);
    } catch (e) {
      return false;
    }
  }

  function updateTheme() {
    var rgb = null;
    try {
      rgb = parseRgb(hostBackground());
    } catch (e) {
      rgb = null;
    }

    var classes = document.body.classList;
    if (rgb) {
      var luma = 299 * rgb[0] + 587 * rgb[1] + 114 * rgb[2];
      classes.toggle(DARK_CLASS, luma < THRESHOLD_MILLI);
    } else if (ambientPrefersDark()) {
      classes.add(DARK_CLASS);
    } else if (SYMMETRIC_FALLBACK) {
      classes.remove(DARK_CLASS);
    }
  }

  updateTheme();
  window.setInterval(updateTheme, __INTERVAL_MS__);
})();"#;

/// Script body for the given tick settings.
pub fn theme_sync_script(config: &ThemeSyncConfig) -> String {
    let dark_class =
        serde_json::to_string(&config.dark_class).unwrap_or_else(|_| "\"dark-mode\"".to_string());
    let symmetric = matches!(config.fallback, FallbackPolicy::Symmetric);

    // Class name last: it may itself contain placeholder text.
    THEME_SYNC_TEMPLATE
        .replace("__THRESHOLD_MILLI__", &DARK_THRESHOLD_MILLI.to_string())
        .replace("__SYMMETRIC_FALLBACK__", if symmetric { "true" } else { "false" })
        .replace("__INTERVAL_MS__", &config.interval_ms.to_string())
        .replace("__DARK_CLASS__", &dark_class)
}
