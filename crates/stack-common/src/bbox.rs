//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A rectangular extent in world coordinates.
///
/// Units follow the CRS the box is expressed in: degrees for geographic
/// systems, meters for projected ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Horizontal span in world units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Vertical span in world units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// A box is valid when it has positive area.
    pub fn is_valid(&self) -> bool {
        self.min_x < self.max_x && self.min_y < self.max_y
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Whether the two boxes share interior area. Boxes that only touch
    /// along an edge or at a corner do not count.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        let separated_x = other.max_x <= self.min_x || self.max_x <= other.min_x;
        let separated_y = other.max_y <= self.min_y || self.max_y <= other.min_y;
        !(separated_x || separated_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        let bbox = BoundingBox::new(-100.0, 30.0, -90.0, 40.0);
        assert!((bbox.width() - 10.0).abs() < f64::EPSILON);
        assert!((bbox.height() - 10.0).abs() < f64::EPSILON);
        assert!(bbox.is_valid());
    }

    #[test]
    fn test_degenerate_box_is_invalid() {
        assert!(!BoundingBox::new(0.0, 0.0, 0.0, 10.0).is_valid());
        assert!(!BoundingBox::new(0.0, 10.0, 10.0, 0.0).is_valid());
    }

    #[test]
    fn test_union() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, -5.0, 15.0, 8.0);

        let u = a.union(&b);
        assert_eq!(u.min_x, 0.0);
        assert_eq!(u.min_y, -5.0);
        assert_eq!(u.max_x, 15.0);
        assert_eq!(u.max_y, 10.0);
    }

    #[test]
    fn test_union_of_disjoint_boxes() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let b = BoundingBox::new(20.0, 20.0, 30.0, 30.0);

        assert!(!a.intersects(&b));
        let u = a.union(&b);
        assert_eq!(u, BoundingBox::new(0.0, 0.0, 30.0, 30.0));
    }

    #[test]
    fn test_intersects() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&BoundingBox::new(5.0, 5.0, 15.0, 15.0)));
        assert!(a.intersects(&BoundingBox::new(2.0, 2.0, 3.0, 3.0)));
        assert!(!a.intersects(&BoundingBox::new(20.0, 0.0, 30.0, 10.0)));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        // Shares the x = 10 edge only.
        assert!(!a.intersects(&BoundingBox::new(10.0, 0.0, 20.0, 10.0)));
        // Shares the (10, 10) corner only.
        assert!(!a.intersects(&BoundingBox::new(10.0, 10.0, 20.0, 20.0)));
    }
}
