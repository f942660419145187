use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use timeline_core::RenderConfig;
use timeline_embed::{PageConfig, WidgetAssets};
use timeline_source::DEFAULT_DATA_PATH;

/// Static configuration read once at startup. Every section is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    pub data_path: PathBuf,
    pub render: RenderConfig,
    pub assets: WidgetAssets,
    pub page: PageConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            render: RenderConfig::default(),
            assets: WidgetAssets::default(),
            page: PageConfig::default(),
        }
    }
}

impl CliConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }
}
