//!
//! # Polygon Operations
//!
//! Boolean and offsetting operations on polygon sets.
//! Implemented by an external geometry engine; see [crate::Library::merged_layer].
//!

use crate::error::LayoutResult;
use crate::geom::Polygon;

pub trait PolygonOps {
    /// Union of all polygons in `polys`
    fn union(&self, polys: &[Polygon]) -> LayoutResult<Vec<Polygon>>;
    /// Area covered by `a` and not by `b`
    fn difference(&self, a: &[Polygon], b: &[Polygon]) -> LayoutResult<Vec<Polygon>>;
    /// Grow (positive `delta`) or shrink (negative) each polygon
    fn offset(&self, polys: &[Polygon], delta: f64) -> LayoutResult<Vec<Polygon>>;
}
