//!
//! # Components
//!
//! Named, reusable units of layout: shapes per layer, ports, and references to other components.
//!

// Std-Lib
use std::collections::BTreeMap;

// Local imports
use crate::bbox::{BoundBox, BoundBoxTrait};
use crate::error::{LayoutError, LayoutResult};
use crate::geom::{Path, Point, Polygon, Rect, Shape};
use crate::layers::Layer;
use crate::port::{Port, PortType};
use crate::reference::Reference;

/// # Component
///
/// Created empty, mutated, and then locked.
/// Every mutator fails with [LayoutError::LockedComponent] once locked,
/// leaving the component unchanged.
///
/// Adding [Reference]s requires the surrounding [crate::Library], which checks for cycles.
/// See [crate::Library::add_reference].
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Component {
    /// Component Name
    name: String,
    /// Shapes, keyed by layer, in insertion order within each layer
    pub(crate) shapes: BTreeMap<Layer, Vec<Shape>>,
    /// Ports, in insertion order
    pub(crate) ports: Vec<Port>,
    /// References to other components, in insertion order
    pub(crate) refs: Vec<Reference>,
    /// Locked (finalized) flag
    locked: bool,
}
impl Component {
    /// Create a new and empty [Component] named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Fail if we are locked
    pub(crate) fn check_unlocked(&self) -> LayoutResult<()> {
        if self.locked {
            return Err(LayoutError::LockedComponent {
                component: self.name.clone(),
            });
        }
        Ok(())
    }
    /// Add a [Polygon] with vertices `points` on `layer`
    pub fn add_polygon(&mut self, layer: impl Into<Layer>, points: Vec<Point>) -> LayoutResult<()> {
        self.check_unlocked()?;
        if points.len() < 3 {
            return Err(LayoutError::validation(format!(
                "Polygon on `{}` requires at least three points, got {}",
                self.name,
                points.len()
            )));
        }
        self.push_shape(layer.into(), Shape::Polygon(Polygon::new(points)))
    }
    /// Add a [Rect] with corners `p0` and `p1` on `layer`
    pub fn add_rect(
        &mut self,
        layer: impl Into<Layer>,
        p0: impl Into<Point>,
        p1: impl Into<Point>,
    ) -> LayoutResult<()> {
        self.check_unlocked()?;
        self.push_shape(layer.into(), Shape::Rect(Rect::new(p0.into(), p1.into())))
    }
    /// Add a [Path] along `points`, of width `width`, on `layer`
    pub fn add_path(
        &mut self,
        layer: impl Into<Layer>,
        points: Vec<Point>,
        width: f64,
    ) -> LayoutResult<()> {
        self.check_unlocked()?;
        if points.len() < 2 {
            return Err(LayoutError::validation(format!(
                "Path on `{}` requires at least two points",
                self.name
            )));
        }
        if !(width.is_finite() && width > 0.) {
            return Err(LayoutError::validation(format!(
                "Invalid path width {} on `{}`",
                width, self.name
            )));
        }
        self.push_shape(layer.into(), Shape::Path(Path::new(points, width)))
    }
    /// Add an arbitrary [Shape] on `layer`
    pub fn add_shape(&mut self, layer: impl Into<Layer>, shape: impl Into<Shape>) -> LayoutResult<()> {
        self.check_unlocked()?;
        self.push_shape(layer.into(), shape.into())
    }
    /// Append `shape`, after checking its coordinates are finite
    fn push_shape(&mut self, layer: Layer, shape: Shape) -> LayoutResult<()> {
        let finite = |p: &Point| p.x.is_finite() && p.y.is_finite();
        let ok = match &shape {
            Shape::Rect(r) => finite(&r.p0) && finite(&r.p1),
            Shape::Polygon(p) => p.points.iter().all(finite),
            Shape::Path(p) => p.points.iter().all(finite) && p.width.is_finite(),
        };
        if !ok {
            return Err(LayoutError::validation(format!(
                "Non-finite coordinates in shape on `{}`",
                self.name
            )));
        }
        self.shapes.entry(layer).or_default().push(shape);
        Ok(())
    }
    /// Add a [Port]. Its orientation is normalized to [0, 360).
    pub fn add_port(&mut self, port: Port) -> LayoutResult<()> {
        self.check_unlocked()?;
        if self.port(&port.name).is_some() {
            return Err(LayoutError::DuplicatePort {
                component: self.name.clone(),
                port: port.name,
            });
        }
        if !(port.loc.x.is_finite() && port.loc.y.is_finite() && port.orientation.is_finite()) {
            return Err(LayoutError::validation(format!(
                "Non-finite location or orientation of port `{}` on `{}`",
                port.name, self.name
            )));
        }
        if !(port.width.is_finite() && port.width >= 0.) {
            return Err(LayoutError::validation(format!(
                "Invalid width {} of port `{}` on `{}`",
                port.width, port.name, self.name
            )));
        }
        let orientation = crate::geom::normalize_angle(port.orientation);
        self.ports.push(Port { orientation, ..port });
        Ok(())
    }
    /// Append reference `r`. Callers check locking, naming and cycles.
    pub(crate) fn push_reference(&mut self, r: Reference) {
        self.refs.push(r);
    }
    /// Lock (finalize) the component. Idempotent.
    pub fn lock(&mut self) {
        self.locked = true;
    }
    pub fn is_locked(&self) -> bool {
        self.locked
    }
    /// Ports, in insertion order
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }
    /// Get the port named `name`
    pub fn port(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.name == name)
    }
    /// Iterate over ports of type `port_type`
    pub fn ports_of_type<'a>(&'a self, port_type: &'a PortType) -> impl Iterator<Item = &'a Port> {
        self.ports.iter().filter(move |p| p.port_type == *port_type)
    }
    /// References, in insertion order
    pub fn references(&self) -> &[Reference] {
        &self.refs
    }
    /// Get the reference named `name`
    pub fn reference(&self, name: &str) -> Option<&Reference> {
        self.refs.iter().find(|r| r.name == name)
    }
    /// Our own shapes on `layer`. Excludes those of referenced components.
    pub fn polygons(&self, layer: impl Into<Layer>) -> &[Shape] {
        self.shapes
            .get(&layer.into())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
    /// Layers on which we have shapes, in order
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.shapes.keys()
    }
    /// Iterate over all (layer, shapes) pairs, in layer order
    pub fn shapes(&self) -> impl Iterator<Item = (&Layer, &[Shape])> {
        self.shapes.iter().map(|(l, v)| (l, v.as_slice()))
    }
    /// Boolean indication of whether we have no shapes, ports, or references
    pub fn is_empty(&self) -> bool {
        self.shapes.values().all(|v| v.is_empty()) && self.ports.is_empty() && self.refs.is_empty()
    }
}
impl BoundBoxTrait for Component {
    /// Bounds of our own shapes, in local coordinates.
    /// See [crate::Library::bbox] for bounds including referenced components.
    fn bbox(&self) -> BoundBox {
        let mut bbox = BoundBox::empty();
        for shape in self.shapes.values().flatten() {
            bbox = shape.union(&bbox);
        }
        bbox
    }
}
