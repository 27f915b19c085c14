//! Configuration for the lazy loader.

use serde::{Deserialize, Serialize};

use raster_io::ResampleMethod;
use stack_common::TileLimit;

use crate::catalog::DEFAULT_RASTER_EXTENSION;

/// Configuration for a [`LazyLoader`](crate::LazyLoader).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Upper bound on tile width in pixels.
    pub tile_width: usize,

    /// Upper bound on tile height in pixels.
    pub tile_height: usize,

    /// Resampling method used when warping sources onto the target grid.
    pub resample: ResampleMethod,

    /// Filename suffix accepted by directory scans.
    pub extension: String,

    /// chrono format string matching the whole raster filename,
    /// extension included.
    pub date_format: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            tile_width: 512,
            tile_height: 512,
            resample: ResampleMethod::Nearest,
            extension: DEFAULT_RASTER_EXTENSION.to_string(),
            date_format: "%Y%m%d.tif".to_string(),
        }
    }
}

impl LoaderConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("STACK_TILE_WIDTH") {
            if let Ok(width) = val.parse() {
                config.tile_width = width;
            }
        }

        if let Ok(val) = std::env::var("STACK_TILE_HEIGHT") {
            if let Ok(height) = val.parse() {
                config.tile_height = height;
            }
        }

        if let Ok(val) = std::env::var("STACK_RESAMPLE") {
            config.resample = ResampleMethod::from_str(&val);
        }

        if let Ok(val) = std::env::var("STACK_RASTER_EXTENSION") {
            config.extension = val;
        }

        if let Ok(val) = std::env::var("STACK_DATE_FORMAT") {
            config.date_format = val;
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.tile_width == 0 {
            return Err("tile_width must be > 0".to_string());
        }

        if self.tile_height == 0 {
            return Err("tile_height must be > 0".to_string());
        }

        if self.extension.is_empty() {
            return Err("extension must not be empty".to_string());
        }

        if self.date_format.is_empty() {
            return Err("date_format must not be empty".to_string());
        }

        Ok(())
    }

    /// The tile size ceiling as a [`TileLimit`].
    pub fn tile_limit(&self) -> TileLimit {
        TileLimit::new(self.tile_width, self.tile_height)
    }
}
