//!
//! # References
//!
//! Placed instances of [crate::Component]s.
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::geom::{normalize_angle, Point, Transform};
use crate::library::ComponentKey;
use crate::port::Port;

/// # Placement
///
/// Location and orientation of a [Reference] in its parent's coordinates.
/// Applied in the order: scale, mirror (about the local x-axis), rotate, translate.
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Placement {
    /// Translation of the child's origin
    pub origin: Point,
    /// Counter-clockwise rotation, in degrees
    pub rotation: f64,
    /// Reflection about the x-axis, before rotation
    pub mirror: bool,
    /// Uniform magnification
    pub scale: f64,
}
impl Default for Placement {
    fn default() -> Self {
        Self {
            origin: Point::default(),
            rotation: 0.,
            mirror: false,
            scale: 1.,
        }
    }
}
impl Placement {
    /// Placement at `origin`, with no rotation, reflection or magnification
    pub fn at(origin: impl Into<Point>) -> Self {
        Self {
            origin: origin.into(),
            ..Default::default()
        }
    }
    /// Builder-style setter of our rotation
    pub fn rotated(mut self, rotation: f64) -> Self {
        self.rotation = normalize_angle(rotation);
        self
    }
    /// Builder-style setter of our reflection
    pub fn mirrored(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }
    /// Builder-style setter of our magnification
    pub fn scaled(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
    /// Create a copy shifted by (dx, dy)
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            origin: self.origin.shift(&Point::new(dx, dy)),
            ..self.clone()
        }
    }
    /// Our affine [Transform]
    pub fn transform(&self) -> Transform {
        Transform::from_placement(&self.origin, self.rotation, self.mirror, self.scale)
    }
    /// The unit-scale placement which lands `child_port` on `destination`, facing it.
    pub fn connecting(child_port: &Port, destination: &Port, mirror: bool) -> Self {
        let facing = destination.orientation + 180.;
        let rotation = if mirror {
            normalize_angle(facing + child_port.orientation)
        } else {
            normalize_angle(facing - child_port.orientation)
        };
        let oriented = Self {
            origin: Point::default(),
            rotation,
            mirror,
            scale: 1.,
        };
        let moved = child_port.loc.transform(&oriented.transform());
        Self {
            origin: destination.loc - moved,
            ..oriented
        }
    }
    /// Validate our contents. Magnification must be finite and positive.
    pub(crate) fn is_valid(&self) -> bool {
        self.scale.is_finite()
            && self.scale > 0.
            && self.rotation.is_finite()
            && self.origin.x.is_finite()
            && self.origin.y.is_finite()
    }
}

/// # Reference
///
/// A placed instance of a child Component, held by handle.
/// Geometry is never copied into the parent.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    /// Reference Name, unique within its parent
    pub name: String,
    /// Child Component
    pub component: ComponentKey,
    /// Placement in the parent
    pub placement: Placement,
}
impl Reference {
    /// Our affine [Transform]
    pub fn transform(&self) -> Transform {
        self.placement.transform()
    }
}
