//! Synthetic band data generators.
//!
//! These generators create predictable, verifiable data patterns that can
//! be used across the test suite.

use ndarray::Array3;

/// Band data shaped `(bands, rows, cols)` where
/// `value = base + band * 100 + row * 10 + col`.
///
/// On grids up to 10x10 every pixel value reads back as its own
/// coordinates, which keeps windowed-read assertions legible.
pub fn ramp_bands(bands: usize, rows: usize, cols: usize, base: f32) -> Array3<f32> {
    Array3::from_shape_fn((bands, rows, cols), |(b, r, c)| {
        base + (b * 100 + r * 10 + c) as f32
    })
}

/// Band data where every pixel shares one value.
pub fn constant_bands(bands: usize, rows: usize, cols: usize, value: f32) -> Array3<f32> {
    Array3::from_elem((bands, rows, cols), value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_encodes_coordinates() {
        let data = ramp_bands(2, 3, 4, 1000.0);
        assert_eq!(data.dim(), (2, 3, 4));
        assert_eq!(data[[0, 0, 0]], 1000.0);
        assert_eq!(data[[1, 2, 3]], 1123.0);
    }

    #[test]
    fn test_constant_bands() {
        let data = constant_bands(1, 2, 2, 7.5);
        assert!(data.iter().all(|&v| v == 7.5));
    }
}
