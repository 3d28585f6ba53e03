//! `tiler` — CLI front-end for the `.iview2` pyramid tiling engine.
//!
//! Thin adapter over [`iview2_tiler::tile`]: resolves the output archive
//! path, opens real files, and reports the result. All tiling logic lives
//! in the library.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iview2_tiler::config::Cli;
use iview2_tiler::{path::resolve_archive_path, tile};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(1);
        }
    };

    init_logging(cli.verbose);

    if let Err(message) = cli.validate() {
        error!("invalid configuration: {message}");
        return ExitCode::from(1);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let (base_dir, relative_image_path) = resolve_input_context(&cli.image_path);
    let output_path = resolve_archive_path(&base_dir, cli.derivate.as_deref(), &relative_image_path);

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("failed to create output directory {parent:?}: {e}"))?;
    }

    let source = File::open(&cli.image_path)
        .map_err(|e| format!("failed to open {}: {e}", cli.image_path))?;
    let output = File::create(&output_path)
        .map_err(|e| format!("failed to create {output_path:?}: {e}"))?;

    info!(image = %cli.image_path, output = %output_path.display(), "starting pyramid build");

    let props = tile(
        source,
        output,
        cli.derivate.as_deref(),
        &relative_image_path,
        None,
        cli.strategy_override(),
        cli.jpeg_quality,
    )
    .map_err(|e| e.to_string())?;

    info!(
        width = props.width,
        height = props.height,
        zoom_level = props.zoom_level,
        tiles = props.tiles_count,
        "pyramid written to {}",
        output_path.display()
    );

    Ok(())
}

/// `(base_dir, relative_image_path)` per the CLI's path-resolution
/// contract: the output directory is the image's parent when the input
/// path is absolute, else the current directory; the relative path used
/// for archive resolution is the filename alone when the input was
/// absolute, else the input path verbatim.
fn resolve_input_context(image_path: &str) -> (PathBuf, String) {
    let path = Path::new(image_path);

    if path.is_absolute() {
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let relative = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| image_path.to_string());
        (base_dir, relative)
    } else {
        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        (base_dir, image_path.to_string())
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "iview2_tiler=debug"
    } else {
        "iview2_tiler=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_path_uses_parent_as_base_and_filename_as_relative() {
        let (base, relative) = resolve_input_context("/data/slides/foo/bar.tif");
        assert_eq!(base, Path::new("/data/slides/foo"));
        assert_eq!(relative, "bar.tif");
    }

    #[test]
    fn relative_path_uses_cwd_and_is_kept_verbatim() {
        let (base, relative) = resolve_input_context("foo/bar.tif");
        assert_eq!(base, std::env::current_dir().unwrap());
        assert_eq!(relative, "foo/bar.tif");
    }
}
