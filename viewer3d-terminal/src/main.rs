//! viewer3d terminal viewer
//!
//! Loads STL files onto the build plate and draws them with the ASCII
//! rasterizer. Run with `--help` for the flags.

use clap::Parser;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use viewer3d_core::{stl, ViewerSettings};
use viewer3d_terminal::TerminalApp;

#[derive(Parser)]
#[command(name = "viewer3d-terminal")]
#[command(about = "Terminal build-volume viewer for STL files", long_about = None)]
struct Cli {
    /// STL files to place on the build plate
    files: Vec<PathBuf>,

    /// TOML settings merged over the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fail on operations addressed at missing elements
    #[arg(long)]
    strict: bool,
}

/// Lifecycle `info!` lines would scroll over the ASCII view.
const DEFAULT_LOG_FILTER: &str = "warn";

fn load_settings(path: Option<&Path>) -> io::Result<ViewerSettings> {
    let Some(path) = path else {
        return Ok(ViewerSettings::default());
    };
    let text = fs::read_to_string(path)?;
    toml::from_str(&text).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to parse {}: {}", path.display(), e),
        )
    })
}

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER)).init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    settings.strict |= cli.strict;

    let mut app = TerminalApp::new(settings)?;
    for path in &cli.files {
        let data = fs::read(path)?;
        let triangles = stl::parse_stl(&data).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Failed to parse {}: {}", path.display(), e),
            )
        })?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        app.add_mesh(&name, &triangles)?;
    }
    if cli.files.is_empty() {
        log::warn!("no STL files given, starting with an empty plate");
    }

    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Metadata};

    #[test]
    fn test_default_filter_hides_lifecycle_logs() {
        let filter = env_logger::filter::Builder::new()
            .parse(DEFAULT_LOG_FILTER)
            .build();
        let at = |level| Metadata::builder().level(level).target("viewer3d_core").build();
        assert!(filter.enabled(&at(Level::Warn)));
        assert!(!filter.enabled(&at(Level::Info)));
    }
}
