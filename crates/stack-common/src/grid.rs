//! Reference grid description: affine transform, shape, bounds, resolution.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{BoundingBox, Crs};

/// Tolerance used when checking that a stored shape matches the shape
/// implied by bounds and resolution. Guards against an exact pixel
/// multiple landing just below an integer in floating point.
const SHAPE_EPSILON: f64 = 1e-9;

/// Affine mapping from pixel `(col, row)` to world `(x, y)`.
///
/// Named fields instead of a positional tuple: axis-order swaps are the
/// classic silent bug in this domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// World x of the grid's top-left corner.
    pub origin_x: f64,
    /// World y of the grid's top-left corner.
    pub origin_y: f64,
    /// World units per pixel along x.
    pub pixel_width: f64,
    /// World units per pixel along y; negative for north-up grids.
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Build a north-up transform from the top-left corner and positive
    /// per-axis resolutions.
    pub fn from_origin(left: f64, top: f64, res_x: f64, res_y: f64) -> Self {
        Self {
            origin_x: left,
            origin_y: top,
            pixel_width: res_x,
            pixel_height: -res_y,
        }
    }

    /// Map a (fractional) pixel coordinate to world coordinates.
    pub fn pixel_to_world(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.origin_x + col * self.pixel_width,
            self.origin_y + row * self.pixel_height,
        )
    }

    /// Map world coordinates to a fractional pixel coordinate.
    ///
    /// Integer values land on pixel edges; pixel `(i, j)` covers
    /// `[i, i+1) x [j, j+1)` in the returned space.
    pub fn world_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.origin_x) / self.pixel_width,
            (y - self.origin_y) / self.pixel_height,
        )
    }
}

/// Pixel resolution along each axis, in world units per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub x: f64,
    pub y: f64,
}

impl Resolution {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both axes must be strictly positive.
    pub fn is_valid(&self) -> bool {
        self.x > 0.0 && self.y > 0.0
    }
}

/// Immutable description of a target spatial grid.
///
/// The shape is derived from bounds and resolution by integer truncation:
/// a fractional final row or column implied by `bounds / resolution` is
/// dropped, never rounded up. That is a deliberate extent policy, not an
/// accident, and it is pinned by tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDescriptor {
    /// Target coordinate reference system.
    pub crs: Crs,
    /// Pixel-to-world affine; origin sits at `(bounds.min_x, bounds.max_y)`.
    pub transform: GeoTransform,
    /// Grid width in pixels.
    pub width: usize,
    /// Grid height in pixels.
    pub height: usize,
    /// World extent of the grid.
    pub bounds: BoundingBox,
    /// Pixel resolution.
    pub resolution: Resolution,
}

impl GridDescriptor {
    /// Derive a grid from its extent and resolution.
    pub fn from_bounds(
        crs: Crs,
        bounds: BoundingBox,
        resolution: Resolution,
    ) -> Result<Self, GridError> {
        if !bounds.is_valid() {
            return Err(GridError::InvalidBounds(bounds));
        }
        if !resolution.is_valid() {
            return Err(GridError::InvalidResolution {
                x: resolution.x,
                y: resolution.y,
            });
        }

        let width = derive_extent(bounds.width(), resolution.x);
        let height = derive_extent(bounds.height(), resolution.y);
        if width == 0 || height == 0 {
            return Err(GridError::EmptyGrid { width, height });
        }

        Ok(Self {
            crs,
            transform: GeoTransform::from_origin(bounds.min_x, bounds.max_y, resolution.x, resolution.y),
            width,
            height,
            bounds,
            resolution,
        })
    }

    /// `(width, height)` in pixels.
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Check the internal consistency of an externally supplied descriptor.
    pub fn validate(&self) -> Result<(), GridError> {
        if !self.bounds.is_valid() {
            return Err(GridError::InvalidBounds(self.bounds));
        }
        if !self.resolution.is_valid() {
            return Err(GridError::InvalidResolution {
                x: self.resolution.x,
                y: self.resolution.y,
            });
        }
        if self.width == 0 || self.height == 0 {
            return Err(GridError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }

        let expected_width = derive_extent(self.bounds.width(), self.resolution.x);
        let expected_height = derive_extent(self.bounds.height(), self.resolution.y);
        if self.width != expected_width || self.height != expected_height {
            return Err(GridError::Inconsistent(format!(
                "shape {}x{} does not match bounds/resolution (expected {}x{})",
                self.width, self.height, expected_width, expected_height
            )));
        }

        let t = &self.transform;
        if (t.origin_x - self.bounds.min_x).abs() > SHAPE_EPSILON
            || (t.origin_y - self.bounds.max_y).abs() > SHAPE_EPSILON
        {
            return Err(GridError::Inconsistent(format!(
                "transform origin ({}, {}) is not the top-left corner ({}, {})",
                t.origin_x, t.origin_y, self.bounds.min_x, self.bounds.max_y
            )));
        }
        if (t.pixel_width - self.resolution.x).abs() > SHAPE_EPSILON
            || (t.pixel_height + self.resolution.y).abs() > SHAPE_EPSILON
        {
            return Err(GridError::Inconsistent(format!(
                "transform pixel size ({}, {}) does not match resolution ({}, {})",
                t.pixel_width, t.pixel_height, self.resolution.x, self.resolution.y
            )));
        }

        Ok(())
    }
}

fn derive_extent(span: f64, res: f64) -> usize {
    ((span / res) + SHAPE_EPSILON).floor() as usize
}

#[derive(Debug, Error)]
pub enum GridError {
    #[error("invalid bounds: ({0:?})")]
    InvalidBounds(BoundingBox),

    #[error("invalid resolution: ({x}, {y}); both axes must be > 0")]
    InvalidResolution { x: f64, y: f64 },

    #[error("grid extent is empty ({width}x{height} pixels)")]
    EmptyGrid { width: usize, height: usize },

    #[error("inconsistent grid: {0}")]
    Inconsistent(String),
}
