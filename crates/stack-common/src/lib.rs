//! Common value types shared across the raster-stack workspace.

pub mod bbox;
pub mod crs;
pub mod grid;
pub mod tile;
pub mod time;

pub use bbox::BoundingBox;
pub use crs::Crs;
pub use grid::{GeoTransform, GridDescriptor, GridError, Resolution};
pub use tile::{PixelWindow, Tile, TileError, TileLayout, TileLimit};
pub use time::{parse_filename_date, TimeParseError};
