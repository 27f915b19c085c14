//! Common fixtures for exercising the loader pipeline.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use tempfile::TempDir;

use raster_io::MemoryRaster;
use stack_common::{Crs, Resolution};

use crate::generators::ramp_bands;

/// Shorthand for a calendar date that is known valid.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// Initialize env-filtered test logging; safe to call from every test.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Create a temporary directory containing one empty file per name.
///
/// Directory scans only look at names; pixel data lives in the in-memory
/// driver, registered under these same paths.
pub fn temp_raster_dir(names: &[&str]) -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    for name in names {
        fs::write(dir.path().join(name), b"").expect("create fixture file");
    }
    dir
}

/// Full path of a fixture file inside a [`temp_raster_dir`].
pub fn file_path(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

/// A north-up ramp raster: `value = base + band * 100 + row * 10 + col`.
pub fn ramp_raster(
    crs: &str,
    left: f64,
    top: f64,
    resolution: (f64, f64),
    bands: usize,
    rows: usize,
    cols: usize,
    base: f32,
) -> MemoryRaster {
    MemoryRaster::new(
        Crs::new(crs),
        left,
        top,
        Resolution::new(resolution.0, resolution.1),
        ramp_bands(bands, rows, cols, base),
    )
    .expect("valid fixture raster")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_raster_dir_creates_files() {
        let dir = temp_raster_dir(&["20240101.tif", "notes.txt"]);
        assert!(file_path(&dir, "20240101.tif").is_file());
        assert!(file_path(&dir, "notes.txt").is_file());
    }

    #[test]
    fn test_ramp_raster_bounds_follow_shape() {
        let raster = ramp_raster("EPSG:32633", 10.0, 20.0, (2.0, 2.0), 1, 3, 5, 0.0);
        let bounds = raster.bounds();
        assert_eq!(bounds.min_x, 10.0);
        assert_eq!(bounds.max_x, 20.0);
        assert_eq!(bounds.max_y, 20.0);
        assert_eq!(bounds.min_y, 14.0);
        assert_eq!(raster.shape(), (5, 3));
    }
}
