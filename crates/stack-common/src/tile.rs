//! Deterministic tile partitioning of a pixel grid.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A tile coordinate within a [`TileLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// Tile column.
    pub x: usize,
    /// Tile row.
    pub y: usize,
}

impl Tile {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// A rectangular pixel region: offset plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelWindow {
    pub x_off: usize,
    pub y_off: usize,
    pub width: usize,
    pub height: usize,
}

impl PixelWindow {
    pub fn new(x_off: usize, y_off: usize, width: usize, height: usize) -> Self {
        Self {
            x_off,
            y_off,
            width,
            height,
        }
    }

    /// Number of pixels covered by the window.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Upper bound on tile size, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLimit {
    pub width: usize,
    pub height: usize,
}

impl TileLimit {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Deterministic partition of a pixel grid into fixed-size tiles.
///
/// Edge tiles are clipped to the remaining pixels. Enumeration order is a
/// contract consumers may rely on: x-major, `(0,0), (0,1), …, (1,0), …`,
/// stable and repeatable across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLayout {
    grid_width: usize,
    grid_height: usize,
    limit: TileLimit,
}

impl TileLayout {
    /// Partition a `(width, height)` pixel grid into tiles of at most
    /// `limit` pixels each.
    pub fn new(shape: (usize, usize), limit: TileLimit) -> Result<Self, TileError> {
        if !limit.is_valid() {
            return Err(TileError::ZeroLimit(limit));
        }
        if shape.0 == 0 || shape.1 == 0 {
            return Err(TileError::EmptyShape {
                width: shape.0,
                height: shape.1,
            });
        }
        Ok(Self {
            grid_width: shape.0,
            grid_height: shape.1,
            limit,
        })
    }

    /// Number of tile columns.
    pub fn count_x(&self) -> usize {
        (self.grid_width + self.limit.width - 1) / self.limit.width
    }

    /// Number of tile rows.
    pub fn count_y(&self) -> usize {
        (self.grid_height + self.limit.height - 1) / self.limit.height
    }

    /// Total number of tiles.
    pub fn len(&self) -> usize {
        self.count_x() * self.count_y()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// All tiles in the contractual enumeration order.
    pub fn tiles(&self) -> Vec<Tile> {
        let mut tiles = Vec::with_capacity(self.len());
        for x in 0..self.count_x() {
            for y in 0..self.count_y() {
                tiles.push(Tile::new(x, y));
            }
        }
        tiles
    }

    pub fn contains(&self, tile: Tile) -> bool {
        tile.x < self.count_x() && tile.y < self.count_y()
    }

    /// The pixel window a tile covers, clipped at the grid edge.
    /// Returns `None` for a tile outside the layout.
    pub fn window(&self, tile: Tile) -> Option<PixelWindow> {
        if !self.contains(tile) {
            return None;
        }
        let x_off = tile.x * self.limit.width;
        let y_off = tile.y * self.limit.height;
        Some(PixelWindow::new(
            x_off,
            y_off,
            self.limit.width.min(self.grid_width - x_off),
            self.limit.height.min(self.grid_height - y_off),
        ))
    }
}

#[derive(Debug, Error)]
pub enum TileError {
    #[error("tile limit must be positive on both axes, got {0:?}")]
    ZeroLimit(TileLimit),

    #[error("cannot tile an empty grid ({width}x{height})")]
    EmptyShape { width: usize, height: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_10x10_by_4x4() {
        let layout = TileLayout::new((10, 10), TileLimit::new(4, 4)).unwrap();
        assert_eq!(layout.count_x(), 3);
        assert_eq!(layout.count_y(), 3);

        let tiles = layout.tiles();
        let expected: Vec<Tile> = [
            (0, 0),
            (0, 1),
            (0, 2),
            (1, 0),
            (1, 1),
            (1, 2),
            (2, 0),
            (2, 1),
            (2, 2),
        ]
        .iter()
        .map(|&(x, y)| Tile::new(x, y))
        .collect();
        assert_eq!(tiles, expected);

        let sizes: Vec<(usize, usize)> = tiles
            .iter()
            .map(|&t| {
                let w = layout.window(t).unwrap();
                (w.width, w.height)
            })
            .collect();
        assert_eq!(
            sizes,
            vec![
                (4, 4),
                (4, 4),
                (4, 2),
                (4, 4),
                (4, 4),
                (4, 2),
                (2, 4),
                (2, 4),
                (2, 2),
            ]
        );
    }

    #[test]
    fn test_exact_multiple_has_no_clipped_tiles() {
        let layout = TileLayout::new((8, 8), TileLimit::new(4, 4)).unwrap();
        for tile in layout.tiles() {
            let w = layout.window(tile).unwrap();
            assert_eq!((w.width, w.height), (4, 4));
        }
    }

    #[test]
    fn test_limit_larger_than_grid() {
        let layout = TileLayout::new((10, 10), TileLimit::new(256, 256)).unwrap();
        assert_eq!(layout.len(), 1);

        let w = layout.window(Tile::new(0, 0)).unwrap();
        assert_eq!(w, PixelWindow::new(0, 0, 10, 10));
    }

    #[test]
    fn test_window_offsets() {
        let layout = TileLayout::new((10, 10), TileLimit::new(4, 4)).unwrap();
        let w = layout.window(Tile::new(2, 1)).unwrap();
        assert_eq!(w, PixelWindow::new(8, 4, 2, 4));
    }

    #[test]
    fn test_window_pixel_count_and_emptiness() {
        let window = PixelWindow::new(8, 4, 4, 2);
        assert_eq!(window.len(), 8);
        assert!(!window.is_empty());

        assert!(PixelWindow::new(0, 0, 0, 2).is_empty());
        assert!(PixelWindow::new(0, 0, 2, 0).is_empty());
    }

    #[test]
    fn test_out_of_range_tile_has_no_window() {
        let layout = TileLayout::new((10, 10), TileLimit::new(4, 4)).unwrap();
        assert!(layout.window(Tile::new(3, 0)).is_none());
        assert!(layout.window(Tile::new(0, 3)).is_none());
    }

    #[test]
    fn test_rejects_zero_limit() {
        assert!(matches!(
            TileLayout::new((10, 10), TileLimit::new(0, 4)),
            Err(TileError::ZeroLimit(_))
        ));
    }

    #[test]
    fn test_rejects_empty_shape() {
        assert!(matches!(
            TileLayout::new((0, 10), TileLimit::new(4, 4)),
            Err(TileError::EmptyShape { .. })
        ));
    }
}
