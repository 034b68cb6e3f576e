//! Page-local geometry.
//!
//! Origin is the top-left corner of the page, x grows right, y grows down,
//! units are PDF points.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle.
///
/// Constructors normalize the corners so `x0 <= x1` and `y0 <= y1`;
/// the area is therefore never negative. Serialized as `[x0, y0, x1, y1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    /// Create a bounding box from two corners in any order.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// All four coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Union over an iterator of boxes; `None` when empty.
    pub fn union_all<'a, I>(boxes: I) -> Option<BoundingBox>
    where
        I: IntoIterator<Item = &'a BoundingBox>,
    {
        boxes
            .into_iter()
            .fold(None, |acc: Option<BoundingBox>, b| {
                Some(acc.map_or(*b, |a| a.union(b)))
            })
    }

    /// Grow (or shrink, with a negative margin) on every side.
    pub fn expand(&self, margin: f32) -> BoundingBox {
        BoundingBox::new(
            self.x0 - margin,
            self.y0 - margin,
            self.x1 + margin,
            self.y1 + margin,
        )
    }

    /// Clamp this box into `outer`.
    pub fn clamp_to(&self, outer: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.x0.clamp(outer.x0, outer.x1),
            self.y0.clamp(outer.y0, outer.y1),
            self.x1.clamp(outer.x0, outer.x1),
            self.y1.clamp(outer.y0, outer.y1),
        )
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    /// `other` lies fully inside this box grown by `tolerance`.
    pub fn contains(&self, other: &BoundingBox, tolerance: f32) -> bool {
        other.x0 >= self.x0 - tolerance
            && other.y0 >= self.y0 - tolerance
            && other.x1 <= self.x1 + tolerance
            && other.y1 <= self.y1 + tolerance
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }

    /// Length of the shared x-range (0 when disjoint).
    pub fn horizontal_overlap(&self, other: &BoundingBox) -> f32 {
        (self.x1.min(other.x1) - self.x0.max(other.x0)).max(0.0)
    }

    /// Empty space between the two boxes along y (0 when they overlap).
    pub fn vertical_gap(&self, other: &BoundingBox) -> f32 {
        if other.y0 >= self.y1 {
            other.y0 - self.y1
        } else if self.y0 >= other.y1 {
            self.y0 - other.y1
        } else {
            0.0
        }
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from(c: [f32; 4]) -> Self {
        BoundingBox::new(c[0], c[1], c[2], c[3])
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_corners() {
        let b = BoundingBox::new(10.0, 50.0, 0.0, 20.0);
        assert_eq!(b, BoundingBox::new(0.0, 20.0, 10.0, 50.0));
        assert!(b.area() >= 0.0);
        assert_eq!(b.width(), 10.0);
        assert_eq!(b.height(), 30.0);
    }

    #[test]
    fn test_union_and_contains() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 20.0, 15.0);
        let u = a.union(&b);
        assert_eq!(u, BoundingBox::new(0.0, 0.0, 20.0, 15.0));
        assert!(u.contains(&a, 0.0));
        assert!(!a.contains(&b, 0.0));
        assert!(a.contains(&BoundingBox::new(-1.0, 0.0, 10.0, 11.0), 1.0));
    }

    #[test]
    fn test_union_all_empty() {
        let none: Vec<BoundingBox> = vec![];
        assert!(BoundingBox::union_all(&none).is_none());
    }

    #[test]
    fn test_overlap_and_gap() {
        let a = BoundingBox::new(0.0, 0.0, 100.0, 10.0);
        let b = BoundingBox::new(50.0, 30.0, 150.0, 40.0);
        assert_eq!(a.horizontal_overlap(&b), 50.0);
        assert_eq!(a.vertical_gap(&b), 20.0);
        assert_eq!(b.vertical_gap(&a), 20.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_clamp_to() {
        let outer = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let b = BoundingBox::new(-10.0, 20.0, 120.0, 80.0).clamp_to(&outer);
        assert_eq!(b, BoundingBox::new(0.0, 20.0, 100.0, 80.0));
    }

    #[test]
    fn test_serde_array_form() {
        let b: BoundingBox = serde_json::from_str("[30, 40, 10, 20]").unwrap();
        assert_eq!(b, BoundingBox::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(serde_json::to_string(&b).unwrap(), "[10.0,20.0,30.0,40.0]");
    }
}
