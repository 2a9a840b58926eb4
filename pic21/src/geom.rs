//!
//! # Geometry Module
//!
//! Defines the core geometric types including [Point], [Shape], and [Transform],
//! and their core operations.
//!

// Crates.io
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

// Local imports
use crate::bbox::BoundBoxTrait;

/// Numeric slop for comparisons against values produced by trigonometry
pub(crate) const EPSILON: f64 = 1e-9;

/// # Point in two-dimensional layout-space
///
/// Coordinates are in the library's user units (see [crate::Units]).
///
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, PartialOrd)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}
impl Point {
    /// Create a new [Point] from (x,y) coordinates
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
    /// Create a new point shifted by `x` in the x-dimension and by `y` in the y-dimension
    pub fn shift(&self, p: &Point) -> Point {
        Point {
            x: p.x + self.x,
            y: p.y + self.y,
        }
    }
    /// Euclidean distance to `other`
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
    /// Create a new [Point] rounded to the nearest multiple of `grid` in each dimension
    pub fn snap(&self, grid: f64) -> Point {
        Point {
            x: snap_to_grid(self.x, grid),
            y: snap_to_grid(self.y, grid),
        }
    }
    /// Create a new [Point], transformed from our original location by `trans`
    pub fn transform(&self, trans: &Transform) -> Point {
        let x = trans.a[0][0] * self.x + trans.a[0][1] * self.y + trans.b[0];
        let y = trans.a[1][0] * self.x + trans.a[1][1] * self.y + trans.b[1];
        Self { x, y }
    }
}
impl From<(f64, f64)> for Point {
    fn from(xy: (f64, f64)) -> Self {
        Self::new(xy.0, xy.1)
    }
}
impl std::ops::Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}
impl std::ops::Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Round `val` to the nearest multiple of `grid`.
/// Non-positive grids leave `val` unchanged.
pub fn snap_to_grid(val: f64, grid: f64) -> f64 {
    if grid <= 0.0 {
        return val;
    }
    let snapped = (val / grid).round() * grid;
    // Avoid handing out negative zeros
    if snapped == 0.0 {
        0.0
    } else {
        snapped
    }
}

/// Normalize angle `deg` (in degrees) to the range [0, 360).
/// Values within [EPSILON] of a whole degree are rounded onto it,
/// so that e.g. 90 + 180 + 90 lands exactly on zero.
pub fn normalize_angle(deg: f64) -> f64 {
    let mut a = deg.rem_euclid(360.0);
    if (a - a.round()).abs() < EPSILON {
        a = a.round();
    }
    if a >= 360.0 {
        a -= 360.0;
    }
    a
}

/// Cosine and sine of `deg` degrees.
/// Exact for multiples of 90 degrees, which dominate real layouts.
fn cos_sin(deg: f64) -> (f64, f64) {
    let a = normalize_angle(deg);
    if a == 0.0 {
        (1., 0.)
    } else if a == 90.0 {
        (0., 1.)
    } else if a == 180.0 {
        (-1., 0.)
    } else if a == 270.0 {
        (0., -1.)
    } else {
        let r = a.to_radians();
        (r.cos(), r.sin())
    }
}

/// # Path
///
/// Open-ended geometric path with non-zero width.
/// Primarily consists of a series of ordered [Point]s along its centerline.
///
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct Path {
    pub points: Vec<Point>,
    pub width: f64,
}
impl Path {
    pub fn new(points: Vec<Point>, width: f64) -> Self {
        Self { points, width }
    }
}
/// # Polygon
///
/// Closed n-sided polygon with arbitrary number of vertices.
/// Primarily consists of a series of ordered [Point]s.
///
/// Closure from the last point back to the first is implied;
/// the initial point need not be repeated at the end.
///
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct Polygon {
    pub points: Vec<Point>,
}
impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }
}
/// # Rectangle
///
/// Axis-aligned rectangle, specified by two opposite corners.
///
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub p0: Point,
    pub p1: Point,
}
impl Rect {
    pub fn new(p0: Point, p1: Point) -> Self {
        Self { p0, p1 }
    }
    /// Calculate our center-point
    pub fn center(&self) -> Point {
        Point::new((self.p0.x + self.p1.x) / 2., (self.p0.y + self.p1.y) / 2.)
    }
}

/// # ShapeTrait
///
/// Common shape operations, dispatched from the [Shape] enum to its variants by [enum_dispatch].
///
#[enum_dispatch]
pub trait ShapeTrait {
    /// Shift coordinates by the (x,y) values specified in `pt`
    fn shift(&mut self, pt: &Point);
    /// Boolean indication of whether the [Shape] contains [Point] `pt`.
    /// Containment is *inclusive* for all [Shape] types.
    /// [Point]s on their boundary are regarded as "inside" the shape.
    fn contains(&self, pt: &Point) -> bool;
    /// Convert to a [Polygon], our most general of shapes
    fn to_poly(&self) -> Polygon;
}

/// # Shape
///
/// The primary geometric primitive comprising layout.
/// Variants include [Rect], [Polygon], and [Path].
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[enum_dispatch(ShapeTrait)]
pub enum Shape {
    Rect(Rect),
    Polygon(Polygon),
    Path(Path),
}

impl ShapeTrait for Rect {
    fn shift(&mut self, pt: &Point) {
        self.p0 = self.p0.shift(pt);
        self.p1 = self.p1.shift(pt);
    }
    fn contains(&self, pt: &Point) -> bool {
        let (p0, p1) = (&self.p0, &self.p1);
        p0.x.min(p1.x) <= pt.x
            && p0.x.max(p1.x) >= pt.x
            && p0.y.min(p1.y) <= pt.y
            && p0.y.max(p1.y) >= pt.y
    }
    fn to_poly(&self) -> Polygon {
        Polygon {
            points: vec![
                self.p0,
                Point::new(self.p1.x, self.p0.y),
                self.p1,
                Point::new(self.p0.x, self.p1.y),
            ],
        }
    }
}
impl ShapeTrait for Polygon {
    fn shift(&mut self, pt: &Point) {
        for p in self.points.iter_mut() {
            *p = p.shift(pt);
        }
    }
    fn contains(&self, pt: &Point) -> bool {
        // Fast way out: outside the bounding box is outside the polygon
        if self.points.is_empty() || !self.points.bbox().contains(pt) {
            return false;
        }
        // Winding-number test, with an inclusive check for points on any edge
        let mut winding_num: isize = 0;
        for idx in 0..self.points.len() {
            // Closes the polygon back at its first point
            let past = &self.points[idx];
            let next = &self.points[(idx + 1) % self.points.len()];
            let cross = (next.x - past.x) * (pt.y - past.y) - (pt.x - past.x) * (next.y - past.y);
            if cross.abs() < EPSILON
                && past.x.min(next.x) - EPSILON <= pt.x
                && past.x.max(next.x) + EPSILON >= pt.x
                && past.y.min(next.y) - EPSILON <= pt.y
                && past.y.max(next.y) + EPSILON >= pt.y
            {
                return true;
            }
            if past.y <= pt.y {
                if next.y > pt.y && cross > 0.0 {
                    winding_num += 1;
                }
            } else if next.y <= pt.y && cross < 0.0 {
                winding_num -= 1;
            }
        }
        winding_num != 0
    }
    fn to_poly(&self) -> Polygon {
        self.clone()
    }
}
impl ShapeTrait for Path {
    fn shift(&mut self, pt: &Point) {
        for p in self.points.iter_mut() {
            *p = p.shift(pt);
        }
    }
    fn contains(&self, pt: &Point) -> bool {
        self.to_poly().contains(pt)
    }
    /// Outline the path, with square (un-extended) ends and mitered corners.
    fn to_poly(&self) -> Polygon {
        // Drop repeated points, which have no direction
        let mut pts: Vec<Point> = Vec::with_capacity(self.points.len());
        for p in self.points.iter() {
            if pts.last().map_or(true, |last| last.distance(p) > EPSILON) {
                pts.push(*p);
            }
        }
        if pts.len() < 2 {
            return Polygon::default();
        }
        let half = self.width / 2.;
        // Unit normal of the segment from `a` to `b`, pointing to its left
        let normal = |a: &Point, b: &Point| {
            let len = a.distance(b);
            Point::new(-(b.y - a.y) / len, (b.x - a.x) / len)
        };
        let mut left = Vec::with_capacity(pts.len());
        let mut right = Vec::with_capacity(pts.len());
        for k in 0..pts.len() {
            let offset = if k == 0 {
                let n = normal(&pts[0], &pts[1]);
                Point::new(n.x * half, n.y * half)
            } else if k == pts.len() - 1 {
                let n = normal(&pts[k - 1], &pts[k]);
                Point::new(n.x * half, n.y * half)
            } else {
                let n0 = normal(&pts[k - 1], &pts[k]);
                let n1 = normal(&pts[k], &pts[k + 1]);
                let m = Point::new(n0.x + n1.x, n0.y + n1.y);
                let mlen = m.x.hypot(m.y);
                if mlen < EPSILON {
                    // Full reversal; no sensible miter
                    Point::new(n0.x * half, n0.y * half)
                } else {
                    let m = Point::new(m.x / mlen, m.y / mlen);
                    let scale = half / (m.x * n0.x + m.y * n0.y);
                    Point::new(m.x * scale, m.y * scale)
                }
            };
            left.push(pts[k] + offset);
            right.push(pts[k] - offset);
        }
        right.reverse();
        left.extend(right);
        Polygon { points: left }
    }
}

/// # Matrix-Vector Transformation
///
/// 2x2 rotation/reflection/scaling matrix and two-entry translation vector,
/// used for relative movement of [Point]s and [Shape]s.
///
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Rotation / Transformation Matrix
    /// Represented in row-major order
    pub a: [[f64; 2]; 2],
    /// X-Y Translation
    pub b: [f64; 2],
}
impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
impl Transform {
    /// The identity transform, leaving any transformed object unmodified
    pub fn identity() -> Self {
        Self {
            a: [[1., 0.], [0., 1.]],
            b: [0., 0.],
        }
    }
    /// Translation by (x,y)
    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            a: [[1., 0.], [0., 1.]],
            b: [x, y],
        }
    }
    /// A transform to rotate counter-clockwise by `angle` degrees
    pub fn rotate(angle: f64) -> Self {
        let (cos, sin) = cos_sin(angle);
        Self {
            a: [[cos, -sin], [sin, cos]],
            b: [0., 0.],
        }
    }
    /// A transform to reflect about the x-axis
    pub fn reflect_vert() -> Self {
        Self {
            a: [[1., 0.], [0., -1.]],
            b: [0., 0.],
        }
    }
    /// Uniform scaling by `factor`
    pub fn scale(factor: f64) -> Self {
        Self {
            a: [[factor, 0.], [0., factor]],
            b: [0., 0.],
        }
    }
    /// Create a transform from placement fields.
    /// Applied in the order: scale, mirror about the x-axis, rotate, then translate.
    pub fn from_placement(origin: &Point, rotation: f64, mirror: bool, scale: f64) -> Self {
        let (cos, sin) = cos_sin(rotation);
        let m = if mirror { -1. } else { 1. };
        let a = [
            [scale * cos, -scale * sin * m],
            [scale * sin, scale * cos * m],
        ];
        Self {
            a,
            b: [origin.x, origin.y],
        }
    }
    /// Create a new [Transform] that is the cascade of `parent` and `child`.
    ///
    /// "Parents" and "children" refer to typical layout-instance hierarchies,
    /// in which each layer of instance has a nested set of transformations relative to its top-level parent.
    ///
    /// Note this operation *is not* commutative.
    /// For example the set of transformations:
    /// * (a) Reflect vertically, then
    /// * (b) Translate by (1,1)
    /// * (c) Place a point at (local coordinate) (1,1)
    /// Lands said point at (2,-2) in top-level space,
    /// whereas reversing the order of (a) and (b) lands it at (2,0).
    ///
    pub fn cascade(parent: &Transform, child: &Transform) -> Transform {
        // The result-transform's origin is the parent's origin,
        // plus the parent-transformed child's origin
        let mut b = matvec(&parent.a, &child.b);
        b[0] += parent.b[0];
        b[1] += parent.b[1];
        // And the cascade-matrix is the product of the parent's and child's
        let a = matmul(&parent.a, &child.a);
        Self { a, b }
    }
    /// Matrix determinant. Negative for mirroring transforms.
    pub fn det(&self) -> f64 {
        self.a[0][0] * self.a[1][1] - self.a[0][1] * self.a[1][0]
    }
    /// Boolean indication of whether we reflect
    pub fn is_mirrored(&self) -> bool {
        self.det() < 0.0
    }
    /// Uniform scale factor
    pub fn magnification(&self) -> f64 {
        self.det().abs().sqrt()
    }
    /// Rotation angle in degrees, normalized to [0, 360).
    /// Mirroring is applied before rotation, and does not alter this angle.
    pub fn rotation(&self) -> f64 {
        normalize_angle(self.a[1][0].atan2(self.a[0][0]).to_degrees())
    }
    /// Boolean indication of whether axis-aligned shapes remain axis-aligned
    pub fn is_manhattan(&self) -> bool {
        let diag = self.a[0][1].abs() < EPSILON && self.a[1][0].abs() < EPSILON;
        let anti = self.a[0][0].abs() < EPSILON && self.a[1][1].abs() < EPSILON;
        diag || anti
    }
    /// Map direction-angle `deg` through our rotation and reflection
    pub fn angle(&self, deg: f64) -> f64 {
        if self.is_mirrored() {
            normalize_angle(self.rotation() - deg)
        } else {
            normalize_angle(self.rotation() + deg)
        }
    }
}
/// Multiply 2x2 matrices, returning a new 2x2 matrix
fn matmul(a: &[[f64; 2]; 2], b: &[[f64; 2]; 2]) -> [[f64; 2]; 2] {
    [
        [
            a[0][0] * b[0][0] + a[0][1] * b[1][0],
            a[0][0] * b[0][1] + a[0][1] * b[1][1],
        ],
        [
            a[1][0] * b[0][0] + a[1][1] * b[1][0],
            a[1][0] * b[0][1] + a[1][1] * b[1][1],
        ],
    ]
}
/// Multiply a 2x2 matrix by a 2-entry vector, returning a new 2-entry vector
fn matvec(a: &[[f64; 2]; 2], b: &[f64; 2]) -> [f64; 2] {
    [
        a[0][0] * b[0] + a[0][1] * b[1],
        a[1][0] * b[0] + a[1][1] * b[1],
    ]
}
pub trait TransformTrait {
    /// Apply matrix-vector [Transform] `trans`.
    /// Creates a new shape at a location equal to the transformation of our own.
    fn transform(&self, trans: &Transform) -> Self;
}
impl TransformTrait for Shape {
    /// Rectangles stay rectangles under manhattan transforms, and become [Polygon]s otherwise.
    fn transform(&self, trans: &Transform) -> Self {
        match self {
            Shape::Rect(r) if trans.is_manhattan() => Shape::Rect(Rect {
                p0: r.p0.transform(trans),
                p1: r.p1.transform(trans),
            }),
            Shape::Rect(r) => Shape::Polygon(r.to_poly().transform(trans)),
            Shape::Polygon(p) => Shape::Polygon(p.transform(trans)),
            Shape::Path(p) => Shape::Path(p.transform(trans)),
        }
    }
}
impl TransformTrait for Polygon {
    fn transform(&self, trans: &Transform) -> Self {
        Polygon {
            points: self.points.iter().map(|p| p.transform(trans)).collect(),
        }
    }
}
impl TransformTrait for Path {
    fn transform(&self, trans: &Transform) -> Self {
        Path {
            points: self.points.iter().map(|p| p.transform(trans)).collect(),
            width: self.width * trans.magnification(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(p: Point, x: f64, y: f64) {
        assert!(
            (p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9,
            "{:?} != ({}, {})",
            p,
            x,
            y
        );
    }
    #[test]
    fn transform_identity() {
        let shape1 = Shape::Rect(Rect {
            p0: Point::new(0., 0.),
            p1: Point::new(1., 1.),
        });
        let trans = Transform::identity();
        let shape2 = shape1.transform(&trans);
        assert_eq!(shape2, shape1);
    }
    #[test]
    fn transform_rotate() {
        let shape1 = Shape::Rect(Rect {
            p0: Point::new(0., 0.),
            p1: Point::new(1., 1.),
        });
        let trans = Transform::rotate(90.);
        let shape2 = shape1.transform(&trans);
        assert_eq!(
            shape2,
            Shape::Rect(Rect {
                p0: Point::new(0., 0.),
                p1: Point::new(-1., 1.),
            })
        );
        let shape3 = shape2.transform(&trans);
        assert_eq!(
            shape3,
            Shape::Rect(Rect {
                p0: Point::new(0., 0.),
                p1: Point::new(-1., -1.),
            })
        );
        let shape4 = shape3.transform(&trans);
        let shape0 = shape4.transform(&trans);
        assert_eq!(shape0, shape1);
    }
    #[test]
    fn transform_rotate_off_grid() {
        // Non-manhattan rotations turn rectangles into polygons
        let rect = Shape::Rect(Rect::new(Point::new(0., 0.), Point::new(1., 1.)));
        let rotated = rect.transform(&Transform::rotate(45.));
        match rotated {
            Shape::Polygon(p) => {
                assert_eq!(p.points.len(), 4);
                assert_close(p.points[2], 0., 2f64.sqrt());
            }
            _ => panic!("Expected a Polygon"),
        }
    }
    #[test]
    fn test_cascade1() {
        let trans1 = Transform::reflect_vert();
        let trans2 = Transform::translate(1., 1.);

        let p = Point::new(1., 1.);
        let cascade1 = Transform::cascade(&trans1, &trans2);
        let pc1 = p.transform(&cascade1);
        assert_eq!(pc1, Point::new(2., -2.));

        let cascade2 = Transform::cascade(&trans2, &trans1);
        let pc1 = p.transform(&cascade2);
        assert_eq!(pc1, Point::new(2., 0.));
    }
    #[test]
    fn test_cascade_associative() {
        let t1 = Transform::from_placement(&Point::new(3., -2.), 30., true, 2.);
        let t2 = Transform::from_placement(&Point::new(-1., 5.), 115., false, 0.5);
        let t3 = Transform::from_placement(&Point::new(7., 7.), 270., true, 1.);
        let left = Transform::cascade(&Transform::cascade(&t1, &t2), &t3);
        let right = Transform::cascade(&t1, &Transform::cascade(&t2, &t3));
        let p = Point::new(1.5, -4.25);
        let (pl, pr) = (p.transform(&left), p.transform(&right));
        assert_close(pl, pr.x, pr.y);
    }
    #[test]
    fn test_placement_order() {
        // Scale, then mirror, then rotate, then translate
        let t = Transform::from_placement(&Point::new(10., 0.), 90., true, 2.);
        // (1, 1) -> scale (2, 2) -> mirror (2, -2) -> rotate (2, 2) -> translate (12, 2)
        assert_close(Point::new(1., 1.).transform(&t), 12., 2.);
        assert!(t.is_mirrored());
        assert_eq!(t.rotation(), 90.);
        assert!((t.magnification() - 2.).abs() < 1e-12);
        // Mirrored transforms reflect direction-angles before rotating them
        assert_eq!(t.angle(0.), 90.);
        assert_eq!(t.angle(90.), 0.);
    }
    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(0.), 0.);
        assert_eq!(normalize_angle(360.), 0.);
        assert_eq!(normalize_angle(-90.), 270.);
        assert_eq!(normalize_angle(720. + 45.), 45.);
        assert_eq!(normalize_angle(359.9999999999), 0.);
    }
    #[test]
    fn test_snap() {
        let p = Point::new(1.00049, -0.0004).snap(0.001);
        assert_close(p, 1.0, 0.0);
        assert_eq!(p.y.to_bits(), 0f64.to_bits());
    }
    #[test]
    fn test_path_to_poly() {
        // An L-shaped path of width 2
        let path = Path::new(
            vec![Point::new(0., 0.), Point::new(10., 0.), Point::new(10., 10.)],
            2.,
        );
        let poly = path.to_poly();
        assert_eq!(poly.points.len(), 6);
        assert_close(poly.points[0], 0., 1.);
        assert_close(poly.points[1], 9., 1.);
        assert_close(poly.points[2], 9., 10.);
        assert_close(poly.points[3], 11., 10.);
        assert_close(poly.points[4], 11., -1.);
        assert_close(poly.points[5], 0., -1.);
        assert!(path.contains(&Point::new(5., 0.5)));
        assert!(path.contains(&Point::new(10.5, 5.)));
        assert!(!path.contains(&Point::new(5., 5.)));
    }
    #[test]
    fn test_polygon_contains() {
        // Create a right triangle at the origin
        let triangle = Polygon::new(vec![
            Point::new(0., 0.),
            Point::new(2., 0.),
            Point::new(0., 2.),
        ]);
        assert!(triangle.contains(&Point::new(0., 0.)));
        assert!(triangle.contains(&Point::new(1., 0.)));
        assert!(triangle.contains(&Point::new(2., 0.)));
        assert!(triangle.contains(&Point::new(0., 1.)));
        assert!(triangle.contains(&Point::new(1., 1.)));
        assert!(!triangle.contains(&Point::new(2., 2.)));

        // A U-shaped polygon, inside a 10x10 square
        let u = Polygon::new(vec![
            Point::new(0., 0.),
            Point::new(0., 10.),
            Point::new(2., 10.),
            Point::new(2., 2.),
            Point::new(8., 2.),
            Point::new(8., 10.),
            Point::new(10., 10.),
            Point::new(10., 0.),
        ]);
        for pt in &u.points {
            assert!(u.contains(pt));
        }
        assert!(u.contains(&Point::new(1., 1.)));
        assert!(u.contains(&Point::new(1., 9.)));
        assert!(u.contains(&Point::new(9., 9.)));
        assert!(u.contains(&Point::new(9., 1.)));
        // Points "inside" the u-part, i.e. "outside" the polygon
        assert!(!u.contains(&Point::new(3., 3.)));
        assert!(!u.contains(&Point::new(3., 9.)));
        assert!(!u.contains(&Point::new(7., 3.)));
        assert!(!u.contains(&Point::new(7., 9.)));
    }
}
