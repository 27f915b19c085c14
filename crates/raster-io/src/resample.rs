//! Point sampling kernels over row-major band data.
//!
//! Sample positions are center-based fractional indices: `0.0` is the
//! center of pixel 0, `width - 1` the center of the last column. Positions
//! outside the sampleable domain return `None` and callers fill with NaN.

/// Nearest neighbor sampling.
pub fn sample_nearest(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> Option<f32> {
    let col = x.round();
    let row = y.round();
    if col < 0.0 || row < 0.0 {
        return None;
    }
    let (col, row) = (col as usize, row as usize);
    if col >= width || row >= height {
        return None;
    }
    Some(data[row * width + col])
}

/// Bilinear sampling over the four surrounding pixel centers.
///
/// Any NaN corner poisons the result to NaN rather than inventing data.
pub fn sample_bilinear(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> Option<f32> {
    if x < 0.0 || y < 0.0 || x > (width - 1) as f64 || y > (height - 1) as f64 {
        return None;
    }

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);

    let xf = (x - x0 as f64) as f32;
    let yf = (y - y0 as f64) as f32;

    let v00 = data[y0 * width + x0];
    let v10 = data[y0 * width + x1];
    let v01 = data[y1 * width + x0];
    let v11 = data[y1 * width + x1];

    if v00.is_nan() || v10.is_nan() || v01.is_nan() || v11.is_nan() {
        return Some(f32::NAN);
    }

    let top = v00 * (1.0 - xf) + v10 * xf;
    let bottom = v01 * (1.0 - xf) + v11 * xf;
    Some(top * (1.0 - yf) + bottom * yf)
}

/// Bicubic sampling over the 16 surrounding pixel centers (Catmull-Rom),
/// clamped at the grid edge. Falls back to bilinear when the neighborhood
/// contains NaN.
pub fn sample_cubic(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> Option<f32> {
    if x < 0.0 || y < 0.0 || x > (width - 1) as f64 || y > (height - 1) as f64 {
        return None;
    }

    let xi = x.floor() as i64;
    let yi = y.floor() as i64;
    let xf = (x - xi as f64) as f32;
    let yf = (y - yi as f64) as f32;

    let mut values = [[0.0f32; 4]; 4];
    for (j, row) in values.iter_mut().enumerate() {
        for (i, value) in row.iter_mut().enumerate() {
            let px = (xi + i as i64 - 1).clamp(0, width as i64 - 1) as usize;
            let py = (yi + j as i64 - 1).clamp(0, height as i64 - 1) as usize;
            *value = data[py * width + px];
            if value.is_nan() {
                return sample_bilinear(data, width, height, x, y);
            }
        }
    }

    let mut rows = [0.0f32; 4];
    for (j, row) in values.iter().enumerate() {
        rows[j] = cubic_1d(row[0], row[1], row[2], row[3], xf);
    }
    Some(cubic_1d(rows[0], rows[1], rows[2], rows[3], yf))
}

/// 1D cubic interpolation using a Catmull-Rom spline.
fn cubic_1d(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;

    let a = -0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3;
    let b = p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3;
    let c = -0.5 * p0 + 0.5 * p2;
    let d = p1;

    a * t3 + b * t2 + c * t + d
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3x3 grid: value = row * 10 + col.
    fn grid() -> Vec<f32> {
        vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0, 20.0, 21.0, 22.0]
    }

    #[test]
    fn test_nearest_picks_closest_center() {
        let data = grid();
        assert_eq!(sample_nearest(&data, 3, 3, 0.0, 0.0), Some(0.0));
        assert_eq!(sample_nearest(&data, 3, 3, 0.4, 0.4), Some(0.0));
        assert_eq!(sample_nearest(&data, 3, 3, 0.6, 1.4), Some(11.0));
        assert_eq!(sample_nearest(&data, 3, 3, 2.0, 2.0), Some(22.0));
    }

    #[test]
    fn test_nearest_outside_grid() {
        let data = grid();
        assert_eq!(sample_nearest(&data, 3, 3, -1.0, 0.0), None);
        assert_eq!(sample_nearest(&data, 3, 3, 0.0, 2.6), None);
    }

    #[test]
    fn test_bilinear_midpoint() {
        let data = grid();
        let v = sample_bilinear(&data, 3, 3, 0.5, 0.5).unwrap();
        assert!((v - 5.5).abs() < 1e-6);
    }

    #[test]
    fn test_bilinear_at_centers_is_exact() {
        let data = grid();
        assert_eq!(sample_bilinear(&data, 3, 3, 1.0, 1.0), Some(11.0));
    }

    #[test]
    fn test_bilinear_propagates_nan() {
        let mut data = grid();
        data[4] = f32::NAN;
        assert!(sample_bilinear(&data, 3, 3, 0.5, 0.5).unwrap().is_nan());
    }

    #[test]
    fn test_cubic_matches_linear_data() {
        // Catmull-Rom reproduces linear ramps exactly.
        let data: Vec<f32> = (0..25).map(|i| (i % 5) as f32).collect();
        let v = sample_cubic(&data, 5, 5, 2.5, 2.0).unwrap();
        assert!((v - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_cubic_nan_falls_back_to_bilinear() {
        let mut data: Vec<f32> = vec![1.0; 25];
        data[0] = f32::NAN;
        // The 4x4 neighborhood of (1.5, 1.5) touches index 0.
        let v = sample_cubic(&data, 5, 5, 1.5, 1.5).unwrap();
        assert_eq!(v, 1.0);
    }
}
