//! In-memory raster driver: the executable reference for the driver seam.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use ndarray::{Array3, ArrayView2, Axis};
use tracing::warn;

use stack_common::{BoundingBox, Crs, GeoTransform, GridDescriptor, PixelWindow, Resolution};

use crate::driver::{AlignedView, RasterDataset, RasterDriver, ResampleMethod};
use crate::error::{RasterIoError, Result};
use crate::resample::{sample_bilinear, sample_cubic, sample_nearest};
use crate::scratch::{ScratchHandle, ScratchStore};

/// A linear world-coordinate mapping between two reference systems:
/// `x' = x * scale_x + offset_x`, likewise for y.
///
/// Stands in for a projection database; tests register the CRS pairs they
/// need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTransform {
    pub scale_x: f64,
    pub offset_x: f64,
    pub scale_y: f64,
    pub offset_y: f64,
}

impl LinearTransform {
    pub const IDENTITY: Self = Self {
        scale_x: 1.0,
        offset_x: 0.0,
        scale_y: 1.0,
        offset_y: 0.0,
    };

    pub fn new(scale_x: f64, offset_x: f64, scale_y: f64, offset_y: f64) -> Self {
        Self {
            scale_x,
            offset_x,
            scale_y,
            offset_y,
        }
    }

    /// Pure translation.
    pub fn shift(offset_x: f64, offset_y: f64) -> Self {
        Self::new(1.0, offset_x, 1.0, offset_y)
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.scale_x + self.offset_x,
            y * self.scale_y + self.offset_y,
        )
    }

    /// The reverse mapping. Requires non-zero scales, which registration
    /// enforces.
    pub fn inverse(&self) -> Self {
        Self {
            scale_x: 1.0 / self.scale_x,
            offset_x: -self.offset_x / self.scale_x,
            scale_y: 1.0 / self.scale_y,
            offset_y: -self.offset_y / self.scale_y,
        }
    }

    /// Transform a box corner-wise; min/max are re-derived so negative
    /// scales stay well-formed.
    pub fn apply_bounds(&self, bounds: BoundingBox) -> BoundingBox {
        let (x0, y0) = self.apply(bounds.min_x, bounds.min_y);
        let (x1, y1) = self.apply(bounds.max_x, bounds.max_y);
        BoundingBox::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }
}

/// One synthetic source raster held in memory, north-up.
#[derive(Debug, Clone)]
pub struct MemoryRaster {
    crs: Crs,
    transform: GeoTransform,
    resolution: Resolution,
    bounds: BoundingBox,
    data: Array3<f32>,
}

impl MemoryRaster {
    /// Build from the top-left corner, per-axis resolution, and band data
    /// shaped `(bands, rows, cols)`; bounds follow from the data shape.
    pub fn new(
        crs: Crs,
        left: f64,
        top: f64,
        resolution: Resolution,
        data: Array3<f32>,
    ) -> Result<Self> {
        if !resolution.is_valid() {
            return Err(RasterIoError::open(format!(
                "invalid raster resolution ({}, {})",
                resolution.x, resolution.y
            )));
        }
        let (bands, rows, cols) = data.dim();
        if bands == 0 || rows == 0 || cols == 0 {
            return Err(RasterIoError::open(format!(
                "empty raster data ({}x{}x{})",
                bands, rows, cols
            )));
        }

        let bounds = BoundingBox::new(
            left,
            top - rows as f64 * resolution.y,
            left + cols as f64 * resolution.x,
            top,
        );
        Ok(Self {
            crs,
            transform: GeoTransform::from_origin(left, top, resolution.x, resolution.y),
            resolution,
            bounds,
            data,
        })
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// `(width, height)` in pixels.
    pub fn shape(&self) -> (usize, usize) {
        let (_, rows, cols) = self.data.dim();
        (cols, rows)
    }

    pub fn band_count(&self) -> usize {
        self.data.dim().0
    }

    pub fn band(&self, index: usize) -> ArrayView2<'_, f32> {
        self.data.index_axis(Axis(0), index)
    }
}

/// Driver over a registry of in-memory rasters and CRS-pair transforms.
#[derive(Default)]
pub struct MemoryDriver {
    rasters: RwLock<HashMap<PathBuf, Arc<MemoryRaster>>>,
    transforms: RwLock<HashMap<(Crs, Crs), LinearTransform>>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a raster under the path the engine will ask for.
    pub fn register(&self, path: impl Into<PathBuf>, raster: MemoryRaster) {
        self.rasters
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(path.into(), Arc::new(raster));
    }

    /// Register the world mapping from `src` to `dst`. The reverse
    /// direction is derived automatically on lookup.
    pub fn register_transform(
        &self,
        src: Crs,
        dst: Crs,
        transform: LinearTransform,
    ) -> Result<()> {
        if transform.scale_x == 0.0 || transform.scale_y == 0.0 {
            return Err(RasterIoError::transform(format!(
                "degenerate transform between '{}' and '{}' (zero scale)",
                src, dst
            )));
        }
        self.transforms
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert((src, dst), transform);
        Ok(())
    }

    fn lookup(&self, path: &Path) -> Result<Arc<MemoryRaster>> {
        self.rasters
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(path)
            .cloned()
            .ok_or_else(|| {
                RasterIoError::open(format!("no raster registered at '{}'", path.display()))
            })
    }

    fn world_transform(&self, src: &Crs, dst: &Crs) -> Result<LinearTransform> {
        if src == dst {
            return Ok(LinearTransform::IDENTITY);
        }
        let transforms = self
            .transforms
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(t) = transforms.get(&(src.clone(), dst.clone())) {
            return Ok(*t);
        }
        if let Some(t) = transforms.get(&(dst.clone(), src.clone())) {
            return Ok(t.inverse());
        }
        Err(RasterIoError::transform(format!(
            "no transform registered between '{}' and '{}'",
            src, dst
        )))
    }
}

struct MemoryDataset {
    raster: Arc<MemoryRaster>,
}

impl RasterDataset for MemoryDataset {
    fn crs(&self) -> Crs {
        self.raster.crs().clone()
    }

    fn bounds(&self) -> BoundingBox {
        self.raster.bounds()
    }

    fn resolution(&self) -> Resolution {
        self.raster.resolution()
    }

    fn shape(&self) -> (usize, usize) {
        self.raster.shape()
    }

    fn band_count(&self) -> usize {
        self.raster.band_count()
    }
}

impl RasterDriver for MemoryDriver {
    fn open(&self, path: &Path) -> Result<Box<dyn RasterDataset>> {
        Ok(Box::new(MemoryDataset {
            raster: self.lookup(path)?,
        }))
    }

    fn transform_bounds(&self, src: &Crs, dst: &Crs, bounds: BoundingBox) -> Result<BoundingBox> {
        Ok(self.world_transform(src, dst)?.apply_bounds(bounds))
    }

    fn build_aligned_view(
        &self,
        path: &Path,
        target: &GridDescriptor,
        method: ResampleMethod,
        scratch: &Arc<dyn ScratchStore>,
    ) -> Result<Box<dyn AlignedView>> {
        target
            .validate()
            .map_err(|e| RasterIoError::warp(format!("invalid target grid: {}", e)))?;
        let raster = self.lookup(path)?;
        let to_source = self.world_transform(&target.crs, raster.crs())?;

        let hint = format!(
            "{}.vrt",
            path.file_name().and_then(|n| n.to_str()).unwrap_or("source")
        );
        let handle = scratch.create(&hint)?;

        Ok(Box::new(MemoryAlignedView {
            source: raster,
            target: target.clone(),
            method,
            to_source,
            scratch: Arc::clone(scratch),
            handle: Some(handle),
        }))
    }
}

/// Read-through view of one memory raster on a target grid.
struct MemoryAlignedView {
    source: Arc<MemoryRaster>,
    target: GridDescriptor,
    method: ResampleMethod,
    /// World mapping from the target CRS into the source CRS.
    to_source: LinearTransform,
    scratch: Arc<dyn ScratchStore>,
    /// `None` once released.
    handle: Option<ScratchHandle>,
}

impl MemoryAlignedView {
    fn sample(&self, band: &[f32], width: usize, height: usize, x: f64, y: f64) -> Option<f32> {
        match self.method {
            ResampleMethod::Nearest => sample_nearest(band, width, height, x, y),
            ResampleMethod::Bilinear => sample_bilinear(band, width, height, x, y),
            ResampleMethod::Cubic => sample_cubic(band, width, height, x, y),
        }
    }

    /// World extent of a target-grid pixel window, in the target CRS.
    fn window_bounds(&self, window: &PixelWindow) -> BoundingBox {
        let t = &self.target.transform;
        let (x0, y0) = t.pixel_to_world(window.x_off as f64, window.y_off as f64);
        let (x1, y1) = t.pixel_to_world(
            (window.x_off + window.width) as f64,
            (window.y_off + window.height) as f64,
        );
        BoundingBox::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }
}

impl AlignedView for MemoryAlignedView {
    fn band_count(&self) -> usize {
        self.source.band_count()
    }

    fn read_window(&self, window: &PixelWindow) -> Result<Array3<f32>> {
        if self.handle.is_none() {
            return Err(RasterIoError::read("view has been released"));
        }
        if window.is_empty() {
            return Err(RasterIoError::read(format!(
                "empty pixel window {:?}",
                window
            )));
        }
        if window.x_off + window.width > self.target.width
            || window.y_off + window.height > self.target.height
        {
            return Err(RasterIoError::read(format!(
                "window {:?} exceeds target grid {}x{}",
                window, self.target.width, self.target.height
            )));
        }

        let bands = self.source.band_count();
        let (src_width, src_height) = self.source.shape();
        let mut out = Array3::from_elem((bands, window.height, window.width), f32::NAN);

        // When the window's footprint cannot touch the source at all, the
        // slab stays NaN and per-pixel sampling is skipped entirely.
        let footprint = self.to_source.apply_bounds(self.window_bounds(window));
        if !self.source.bounds().intersects(&footprint) {
            return Ok(out);
        }

        for b in 0..bands {
            let band = self.source.band(b);
            let band = band
                .to_slice()
                .ok_or_else(|| RasterIoError::read("non-contiguous band data"))?;

            for r in 0..window.height {
                for c in 0..window.width {
                    // Sample at the target pixel center, mapped through
                    // world coordinates into the source pixel space.
                    let gx = (window.x_off + c) as f64 + 0.5;
                    let gy = (window.y_off + r) as f64 + 0.5;
                    let (wx, wy) = self.target.transform.pixel_to_world(gx, gy);
                    let (sx, sy) = self.to_source.apply(wx, wy);
                    let (col, row) = self.source.transform.world_to_pixel(sx, sy);

                    if let Some(v) = self.sample(band, src_width, src_height, col - 0.5, row - 0.5)
                    {
                        out[[b, r, c]] = v;
                    }
                }
            }
        }

        Ok(out)
    }

    fn release(&mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => self.scratch.remove(&handle),
            None => Ok(()),
        }
    }
}

impl Drop for MemoryAlignedView {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(error) = self.scratch.remove(&handle) {
                warn!(
                    resource = handle.name(),
                    error = %error,
                    "failed to release aligned view backing resource"
                );
            }
        }
    }
}
