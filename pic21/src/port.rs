//!
//! # Ports
//!
//! Named, typed, oriented connection points on a [crate::Component].
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::geom::{normalize_angle, Point, Transform};
use crate::layers::Layer;

/// # Port Connection Type
///
/// Ports connect only to ports of a compatible type.
///
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PortType {
    /// Optical waveguide port
    #[default]
    Optical,
    /// Electrical (metal) port
    Electrical,
    /// Alignment-only port, e.g. for placing labels or markers
    Placement,
    /// Vertical (grating) coupler, TE polarization
    VerticalTe,
    /// Vertical (grating) coupler, TM polarization
    VerticalTm,
    /// Anything else, by name
    Custom(String),
}
impl PortType {
    /// Boolean indication of whether ports of types `self` and `other` may connect.
    /// Same variant only, and for [PortType::Custom], the same name.
    pub fn is_compatible(&self, other: &PortType) -> bool {
        self == other
    }
}
impl std::fmt::Display for PortType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Optical => write!(f, "optical"),
            Self::Electrical => write!(f, "electrical"),
            Self::Placement => write!(f, "placement"),
            Self::VerticalTe => write!(f, "vertical_te"),
            Self::VerticalTm => write!(f, "vertical_tm"),
            Self::Custom(s) => write!(f, "{}", s),
        }
    }
}

/// # Port
///
/// Orientation is the direction, in degrees counter-clockwise from +x,
/// in which the port faces *out* of its component.
/// Two ports connect when they coincide and face each other.
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Port {
    /// Port Name, unique within its Component
    pub name: String,
    /// Location, in the owning component's coordinates
    pub loc: Point,
    /// Orientation in degrees, in [0, 360)
    pub orientation: f64,
    /// Width
    pub width: f64,
    /// Layer
    pub layer: Layer,
    /// Connection Type
    #[serde(default)]
    pub port_type: PortType,
    /// Optional cross-section name, e.g. a waveguide profile
    #[serde(default)]
    pub cross_section: Option<String>,
}
impl Port {
    /// Create a new [Port] of the default (optical) type
    pub fn new(
        name: impl Into<String>,
        loc: impl Into<Point>,
        orientation: f64,
        width: f64,
        layer: impl Into<Layer>,
    ) -> Self {
        Self {
            name: name.into(),
            loc: loc.into(),
            orientation: normalize_angle(orientation),
            width,
            layer: layer.into(),
            port_type: PortType::default(),
            cross_section: None,
        }
    }
    /// Builder-style setter of our [PortType]
    pub fn with_type(mut self, port_type: PortType) -> Self {
        self.port_type = port_type;
        self
    }
    /// Builder-style setter of our cross-section
    pub fn with_cross_section(mut self, xs: impl Into<String>) -> Self {
        self.cross_section = Some(xs.into());
        self
    }
    /// Create a copy transformed by `trans`.
    /// Location maps as a point, orientation through the rotation and any reflection,
    /// and width scales by the transform's magnification.
    pub fn transform(&self, trans: &Transform) -> Self {
        Self {
            loc: self.loc.transform(trans),
            orientation: trans.angle(self.orientation),
            width: self.width * trans.magnification(),
            ..self.clone()
        }
    }
    /// Distance between our location and that of `other`
    pub fn distance(&self, other: &Port) -> f64 {
        self.loc.distance(&other.loc)
    }
    /// Boolean indication of whether we and `other` point in opposite directions,
    /// within `angle_tol` degrees
    pub fn is_facing(&self, other: &Port, angle_tol: f64) -> bool {
        let diff = normalize_angle(self.orientation - other.orientation + 180.);
        diff.min(360. - diff) <= angle_tol
    }
    /// Unit vector in our direction of orientation
    pub fn direction(&self) -> Point {
        let t = Transform::rotate(self.orientation);
        Point::new(t.a[0][0], t.a[1][0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_new_normalizes() {
        let p = Port::new("o1", (0., 0.), -90., 0.5, (1, 0));
        assert_eq!(p.orientation, 270.);
        let p = Port::new("o1", (0., 0.), 450., 0.5, (1, 0));
        assert_eq!(p.orientation, 90.);
        assert_eq!(p.port_type, PortType::Optical);
    }
    #[test]
    fn test_port_facing() {
        let a = Port::new("a", (0., 0.), 0., 0.5, (1, 0));
        let b = Port::new("b", (0., 0.), 180., 0.5, (1, 0));
        let c = Port::new("c", (0., 0.), 90., 0.5, (1, 0));
        let d = Port::new("d", (0., 0.), 359.5, 0.5, (1, 0));
        assert!(a.is_facing(&b, 0.1));
        assert!(b.is_facing(&a, 0.1));
        assert!(!a.is_facing(&c, 0.1));
        assert!(!a.is_facing(&d, 0.1));
        // Across the 0/360 seam
        assert!(b.is_facing(&d, 1.0));
        assert!(!b.is_facing(&d, 0.1));
    }
    #[test]
    fn test_port_transform() {
        let p = Port::new("a", (1., 0.), 0., 0.5, (1, 0));
        let t = Transform::from_placement(&Point::new(10., 0.), 90., false, 2.);
        let q = p.transform(&t);
        assert_eq!(q.loc, Point::new(10., 2.));
        assert_eq!(q.orientation, 90.);
        assert_eq!(q.width, 1.0);
        // Mirroring flips the orientation before rotating
        let p = Port::new("b", (0., 0.), 90., 0.5, (1, 0));
        let t = Transform::from_placement(&Point::new(0., 0.), 0., true, 1.);
        assert_eq!(p.transform(&t).orientation, 270.);
    }
    #[test]
    fn test_port_type_compat() {
        use PortType::*;
        assert!(Optical.is_compatible(&Optical));
        assert!(!Optical.is_compatible(&Electrical));
        assert!(!Placement.is_compatible(&Optical));
        assert!(Custom("dc".into()).is_compatible(&Custom("dc".into())));
        assert!(!Custom("dc".into()).is_compatible(&Custom("rf".into())));
        assert!(!VerticalTe.is_compatible(&VerticalTm));
    }
}
