use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use timeline_core::{classify_background, luminance, FallbackPolicy, Rgb};
use timeline_embed::{render_host_page, EmbedBuilder};
use timeline_source::{load_or_notice, JsonFileSource};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;

use config::CliConfig;

#[derive(Parser, Debug)]
#[command(
    name = "timeline-cli",
    about = "Render a timeline data file into an embeddable, theme-aware document."
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the embedded document, or a full host page around it.
    Render(RenderArgs),
    /// Classify a computed background colour such as `rgb(14, 17, 23)`.
    Classify {
        /// Colour string as reported by getComputedStyle.
        colour: String,
    },
}

#[derive(clap::Args, Debug, Default)]
struct RenderArgs {
    /// Timeline JSON: an array of events or a `{"events": [...]}` document.
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Output file. Defaults to standard output.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// JSON configuration file (render options, widget assets, page content).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Height of the embedded surface in pixels.
    #[arg(long)]
    height: Option<u32>,
    /// Open the widget on the most recent event.
    #[arg(long)]
    start_at_end: bool,
    /// Minimum height of the navigation strip in pixels.
    #[arg(long)]
    min_nav_height: Option<u32>,
    /// What a tick does when the host background cannot be read.
    #[arg(long, value_enum)]
    fallback: Option<Fallback>,
    /// Widget release used for both stylesheet and script.
    #[arg(long)]
    widget_version: Option<String>,
    /// Wrap the embed in a standalone host page.
    #[arg(long)]
    page: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Fallback {
    AddOnly,
    Symmetric,
}

impl From<Fallback> for FallbackPolicy {
    fn from(value: Fallback) -> Self {
        match value {
            Fallback::AddOnly => FallbackPolicy::AddOnly,
            Fallback::Symmetric => FallbackPolicy::Symmetric,
        }
    }
}

impl RenderArgs {
    /// Command-line flags win over the configuration file.
    fn apply(&self, config: &mut CliConfig) {
        if let Some(input) = &self.input {
            config.data_path = input.clone();
        }
        if let Some(height) = self.height {
            config.render.height = height;
        }
        if self.start_at_end {
            config.render.start_at_end = true;
        }
        if let Some(min_nav_height) = self.min_nav_height {
            config.render.min_nav_height = min_nav_height;
        }
        if let Some(fallback) = self.fallback {
            config.render.theme.fallback = fallback.into();
        }
        if let Some(version) = &self.widget_version {
            config.assets.version = version.clone();
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Render(args) => render(args),
        Command::Classify { colour } => classify(&colour),
    }
}

fn render(args: RenderArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    args.apply(&mut config);
    config.render.validate()?;
    debug!(render = ?config.render, data = %config.data_path.display(), "render configuration");

    let outcome = load_or_notice(&JsonFileSource::new(&config.data_path));
    let notice = outcome.notice();
    if let Some(notice) = &notice {
        eprintln!("Warning: {}", notice.message);
    }

    let document = EmbedBuilder::new(config.assets.clone())
        .build(&outcome.dataset, &config.render)
        .context("Could not build the timeline embed")?;

    let html = if args.page {
        render_host_page(&config.page, &document, notice.as_ref())
    } else {
        document.markup().to_string()
    };

    let span = outcome
        .dataset
        .date_range()
        .map(|(from, to)| format!("{from} to {to}"))
        .unwrap_or_else(|| "--".to_string());
    let summary = format!(
        "Timeline events: {}\nSpan: {span}\nSurface height: {}px",
        document.event_count(),
        document.height()
    );

    match &args.output {
        Some(path) => {
            std::fs::write(path, html)
                .with_context(|| format!("Could not write {}", path.display()))?;
            info!(output = %path.display(), "timeline written");
            println!("{summary}\nOutput: {}", path.display());
        }
        None => {
            print!("{html}");
            eprintln!("{summary}");
        }
    }

    Ok(())
}

fn classify(colour: &str) -> anyhow::Result<()> {
    let theme = classify_background(colour)
        .with_context(|| format!("Cannot classify {colour:?}; expected rgb(r, g, b)"))?;
    let luma = Rgb::parse_css(colour).map(luminance).unwrap_or_default();
    println!("{} (luminance {luma:.1})", theme.as_str());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_file_values() {
        let mut config: CliConfig = serde_json::from_str(
            r#"{ "data_path": "data/events.json", "render": { "height": 600, "min_nav_height": 90 } }"#,
        )
        .unwrap();
        let args = RenderArgs {
            height: Some(720),
            fallback: Some(Fallback::Symmetric),
            widget_version: Some("3.8.12".to_string()),
            ..RenderArgs::default()
        };
        args.apply(&mut config);

        assert_eq!(config.data_path, PathBuf::from("data/events.json"));
        assert_eq!(config.render.height, 720);
        assert_eq!(config.render.min_nav_height, 90);
        assert!(!config.render.start_at_end);
        assert_eq!(config.render.theme.fallback, FallbackPolicy::Symmetric);
        assert_eq!(config.assets.version, "3.8.12");
    }

    #[test]
    fn cli_parses_render_flags() {
        let args = Args::try_parse_from([
            "timeline-cli",
            "render",
            "--input",
            "timeline_data.json",
            "--fallback",
            "add-only",
            "--start-at-end",
            "--page",
        ])
        .unwrap();
        let Command::Render(render) = args.command else {
            panic!("expected render");
        };
        assert_eq!(render.fallback, Some(Fallback::AddOnly));
        assert!(render.start_at_end);
        assert!(render.page);
    }

    #[test]
    fn demo_config_parses() {
        let path = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../demos/page.json"));
        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.render.height, 800);
        assert_eq!(config.page.sections.len(), 3);
        assert!(config.page.sections[0].expanded);
    }
}
