//!
//! # Rectangular Bounding Boxes and Associated Trait
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::geom::{Path, Point, Polygon, Rect, Shape, ShapeTrait};

/// # Rectangular Bounding Box
///
/// Points `p0` and `p1` represent opposite corners of a bounding rectangle.
/// `p0` is always closest to negative-infinity, in both x and y,
/// and `p1` is always closest to positive-infinity.
///
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BoundBox {
    pub p0: Point,
    pub p1: Point,
}
impl BoundBox {
    /// Create a new [BoundBox] from two [Point]s.
    /// Callers are responsible for ensuring that p0.x <= p1.x, and p0.y <= p1.y.
    fn new(p0: Point, p1: Point) -> Self {
        Self { p0, p1 }
    }
    /// Create a new [BoundBox] from a single [Point].
    /// The resultant [BoundBox] comprises solely the point, having zero area.
    pub fn from_point(pt: Point) -> Self {
        Self { p0: pt, p1: pt }
    }
    /// Create a new [BoundBox] from two points
    pub fn from_points(p0: Point, p1: Point) -> Self {
        Self {
            p0: Point::new(p0.x.min(p1.x), p0.y.min(p1.y)),
            p1: Point::new(p0.x.max(p1.x), p0.y.max(p1.y)),
        }
    }
    /// Create an empty, otherwise invalid [BoundBox]
    pub fn empty() -> Self {
        Self {
            p0: Point::new(f64::INFINITY, f64::INFINITY),
            p1: Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }
    /// Boolean indication of whether a box is empty
    pub fn is_empty(&self) -> bool {
        self.p0.x > self.p1.x || self.p0.y > self.p1.y
    }
    /// Boolean indication of whether [Point] `pt` lies inside out box.
    pub fn contains(&self, pt: &Point) -> bool {
        self.p0.x <= pt.x && self.p1.x >= pt.x && self.p0.y <= pt.y && self.p1.y >= pt.y
    }
    /// Expand an existing [BoundBox] in all directions by `delta`
    pub fn expand(&mut self, delta: f64) {
        self.p0.x -= delta;
        self.p0.y -= delta;
        self.p1.x += delta;
        self.p1.y += delta;
    }
    /// Get the box's size as an (x,y) tuple
    pub fn size(&self) -> (f64, f64) {
        (self.p1.x - self.p0.x, self.p1.y - self.p0.y)
    }
    /// Get the box's center
    pub fn center(&self) -> Point {
        Point::new((self.p0.x + self.p1.x) / 2., (self.p0.y + self.p1.y) / 2.)
    }
}

///
/// # Bounding Box Trait
///
/// Methods for interacting with [BoundBox]s.
/// Implementations for [Point]s, [Shape]s, and [BoundBox]s
/// enable geometric transformations such as union and intersection.
///
pub trait BoundBoxTrait {
    /// Compute the intersection with rectangular bounding box `bbox`.
    /// Creates and returns a new [BoundBox].
    fn intersection(&self, bbox: &BoundBox) -> BoundBox {
        let own = self.bbox();
        let pmin = Point::new(own.p0.x.max(bbox.p0.x), own.p0.y.max(bbox.p0.y));
        let pmax = Point::new(own.p1.x.min(bbox.p1.x), own.p1.y.min(bbox.p1.y));
        if pmin.x > pmax.x || pmin.y > pmax.y {
            return BoundBox::empty();
        }
        BoundBox::new(pmin, pmax)
    }
    /// Compute the union with rectangular bounding box `bbox`.
    /// Creates and returns a new [BoundBox].
    fn union(&self, bbox: &BoundBox) -> BoundBox {
        let own = self.bbox();
        BoundBox::new(
            Point::new(own.p0.x.min(bbox.p0.x), own.p0.y.min(bbox.p0.y)),
            Point::new(own.p1.x.max(bbox.p1.x), own.p1.y.max(bbox.p1.y)),
        )
    }
    /// Compute a rectangular bounding box around the implementing type.
    fn bbox(&self) -> BoundBox;
}

impl BoundBoxTrait for BoundBox {
    fn bbox(&self) -> BoundBox {
        self.clone()
    }
}
impl BoundBoxTrait for Point {
    fn bbox(&self) -> BoundBox {
        BoundBox::from_point(*self)
    }
}
impl BoundBoxTrait for Vec<Point> {
    fn bbox(&self) -> BoundBox {
        let mut bbox = BoundBox::empty();
        for pt in self {
            bbox = pt.union(&bbox);
        }
        bbox
    }
}
impl BoundBoxTrait for Rect {
    fn bbox(&self) -> BoundBox {
        BoundBox::from_points(self.p0, self.p1)
    }
}
impl BoundBoxTrait for Polygon {
    fn bbox(&self) -> BoundBox {
        self.points.bbox()
    }
}
impl BoundBoxTrait for Path {
    /// Bounds of the outlined path, including its width
    fn bbox(&self) -> BoundBox {
        self.to_poly().bbox()
    }
}
impl BoundBoxTrait for Shape {
    fn bbox(&self) -> BoundBox {
        match self {
            Shape::Rect(r) => r.bbox(),
            Shape::Polygon(p) => p.bbox(),
            Shape::Path(p) => p.bbox(),
        }
    }
}
