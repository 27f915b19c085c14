//! Collaborator traits for raster sources and aligned read-through views.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use ndarray::Array3;
use serde::{Deserialize, Serialize};

use stack_common::{BoundingBox, Crs, GridDescriptor, PixelWindow, Resolution};

use crate::error::Result;
use crate::scratch::ScratchStore;

/// Resampling method used when warping a source onto the target grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResampleMethod {
    /// Nearest neighbor (preserves exact values).
    #[default]
    Nearest,
    /// Bilinear interpolation (smooth, slight value changes).
    Bilinear,
    /// Bicubic interpolation (smoothest, more compute).
    Cubic,
}

impl ResampleMethod {
    /// Parse from string (case-insensitive); unknown strings fall back to
    /// nearest, the alignment default.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "bilinear" => Self::Bilinear,
            "cubic" | "bicubic" => Self::Cubic,
            _ => Self::Nearest,
        }
    }
}

impl fmt::Display for ResampleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::Bilinear => write!(f, "bilinear"),
            Self::Cubic => write!(f, "cubic"),
        }
    }
}

/// Metadata access to one opened source raster.
pub trait RasterDataset {
    /// Native coordinate reference system.
    fn crs(&self) -> Crs;

    /// Native extent in the native CRS.
    fn bounds(&self) -> BoundingBox;

    /// Native pixel resolution.
    fn resolution(&self) -> Resolution;

    /// `(width, height)` in pixels.
    fn shape(&self) -> (usize, usize);

    /// Number of bands.
    fn band_count(&self) -> usize;
}

/// An aligned, read-through view of one source raster on a target grid.
///
/// Windowed reads take `&self` and touch no shared mutable state, so a
/// published set of views can serve independent reads concurrently.
/// `release` frees the backing scratch resource and is idempotent;
/// implementations keep `Drop` as a best-effort backstop for abnormal
/// teardown paths.
pub trait AlignedView: Send + Sync {
    /// Number of bands served by every windowed read.
    fn band_count(&self) -> usize;

    /// Read one pixel window of the target grid, resampled through to the
    /// source. Returned array is `(bands, rows, cols)`; target pixels the
    /// source does not cover are NaN.
    fn read_window(&self, window: &PixelWindow) -> Result<Array3<f32>>;

    /// Release the backing scratch resource. Reads after release fail.
    fn release(&mut self) -> Result<()>;
}

/// Driver seam for the raster I/O / reprojection library.
pub trait RasterDriver: Send + Sync {
    /// Open a source raster for metadata access.
    fn open(&self, path: &Path) -> Result<Box<dyn RasterDataset>>;

    /// Transform a bounding box between reference systems. Pure coordinate
    /// transform; no resampling.
    fn transform_bounds(&self, src: &Crs, dst: &Crs, bounds: BoundingBox) -> Result<BoundingBox>;

    /// Open `path` and build an aligned read-through view of it on
    /// `target`, backed by one resource provisioned from `scratch`.
    fn build_aligned_view(
        &self,
        path: &Path,
        target: &GridDescriptor,
        method: ResampleMethod,
        scratch: &Arc<dyn ScratchStore>,
    ) -> Result<Box<dyn AlignedView>>;
}
