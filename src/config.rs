//! Configuration: CLI argument parsing for the `tiler` binary.
//!
//! Usage is `tiler <image-path> [derivative-id]`, exit code 1 on a missing
//! positional argument (produced for free by `clap`'s own required-argument
//! error path), plus the quality/tile-size knobs left implementation-defined
//! that a real CLI tool exposes for operators.

use clap::Parser;

use crate::pyramid::DEFAULT_MEGATILE_SIZE;
use crate::tile::DEFAULT_QUALITY_PERCENT;

/// Converts a source raster image into a multi-resolution `.iview2` tile
/// pyramid archive for deep-zoom viewers.
#[derive(Parser, Debug, Clone)]
#[command(name = "tiler")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the source raster image.
    pub image_path: String,

    /// Optional derivative identifier, used to fan the output archive out
    /// under a bucketed directory layout (see [`crate::path`]).
    pub derivate: Option<String>,

    /// JPEG quality for encoded tiles, 1-100.
    #[arg(long, default_value_t = DEFAULT_QUALITY_PERCENT, env = "IVIEW2_JPEG_QUALITY")]
    pub jpeg_quality: u8,

    /// Megatile strip height, in pixels, for the memory-saving builder.
    /// Must be a multiple of the tile size.
    #[arg(long, default_value_t = DEFAULT_MEGATILE_SIZE, env = "IVIEW2_MEGATILE_SIZE")]
    pub megatile_size: u32,

    /// Force the in-memory builder regardless of source image size.
    #[arg(long, conflicts_with = "force_memory_saving")]
    pub force_in_memory: bool,

    /// Force the memory-saving builder regardless of source image size.
    #[arg(long)]
    pub force_memory_saving: bool,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    /// Validate the parsed arguments, returning an error message if
    /// invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err("jpeg_quality must be between 1 and 100".to_string());
        }
        if self.megatile_size == 0 || self.megatile_size % crate::geometry::TILE_SIZE != 0 {
            return Err(format!(
                "megatile_size must be a positive multiple of {}",
                crate::geometry::TILE_SIZE
            ));
        }
        Ok(())
    }

    /// Resolve the strategy override, if any, from the force flags.
    pub fn strategy_override(&self) -> Option<crate::pyramid::Strategy> {
        if self.force_in_memory {
            Some(crate::pyramid::Strategy::InMemory)
        } else if self.force_memory_saving {
            Some(crate::pyramid::Strategy::MemorySaving {
                megatile_size: self.megatile_size,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cli() -> Cli {
        Cli {
            image_path: "x.tif".to_string(),
            derivate: None,
            jpeg_quality: DEFAULT_QUALITY_PERCENT,
            megatile_size: DEFAULT_MEGATILE_SIZE,
            force_in_memory: false,
            force_memory_saving: false,
            verbose: false,
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(test_cli().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_quality() {
        let mut cli = test_cli();
        cli.jpeg_quality = 0;
        assert!(cli.validate().is_err());

        let mut cli = test_cli();
        cli.jpeg_quality = 101;
        assert!(cli.validate().is_err());
    }

    #[test]
    fn rejects_megatile_size_not_a_multiple_of_tile_size() {
        let mut cli = test_cli();
        cli.megatile_size = 300;
        assert!(cli.validate().is_err());
    }

    #[test]
    fn force_in_memory_overrides_strategy_selection() {
        let mut cli = test_cli();
        cli.force_in_memory = true;
        assert_eq!(cli.strategy_override(), Some(crate::pyramid::Strategy::InMemory));
    }

    #[test]
    fn force_memory_saving_overrides_strategy_selection() {
        let mut cli = test_cli();
        cli.force_memory_saving = true;
        assert_eq!(
            cli.strategy_override(),
            Some(crate::pyramid::Strategy::MemorySaving {
                megatile_size: DEFAULT_MEGATILE_SIZE
            })
        );
    }

    #[test]
    fn no_force_flags_means_no_override() {
        assert_eq!(test_cli().strategy_override(), None);
    }
}
