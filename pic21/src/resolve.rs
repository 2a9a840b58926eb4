//!
//! # Hierarchy Resolution
//!
//! Flattens the reference graph under a root [crate::Component]
//! into world-space (root-coordinate) shapes and ports.
//! Results are computed on demand, and never stored on components.
//!

// Std-Lib
use std::collections::BTreeMap;

// Crates.io
use log::debug;
use serde::{Deserialize, Serialize};

// Local imports
use crate::bbox::{BoundBox, BoundBoxTrait};
use crate::error::{LayoutError, LayoutResult};
use crate::geom::{Shape, Transform, TransformTrait};
use crate::layers::Layer;
use crate::library::{ComponentKey, Library};
use crate::port::Port;

/// # Instance Path
///
/// Sequence of reference names from the resolution root down to an instance.
/// The root itself has the empty path.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstancePath(pub Vec<String>);
impl InstancePath {
    /// The root's (empty) path
    pub fn root() -> Self {
        Self(Vec::new())
    }
    /// Create the path of child-reference `name`, one level below us
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut v = self.0.clone();
        v.push(name.into());
        Self(v)
    }
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
    /// Number of references between us and the root
    pub fn depth(&self) -> usize {
        self.0.len()
    }
}
impl std::fmt::Display for InstancePath {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}
impl From<&[&str]> for InstancePath {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|s| s.to_string()).collect())
    }
}
impl<const N: usize> From<[&str; N]> for InstancePath {
    fn from(names: [&str; N]) -> Self {
        Self::from(&names[..])
    }
}

/// A [Shape] in root coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPolygon {
    /// Path of the instance which defines the shape
    pub path: InstancePath,
    /// Name of the defining component
    pub component: String,
    pub layer: Layer,
    pub shape: Shape,
}
/// A [Port] in root coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPort {
    /// Path of the instance which defines the port
    pub path: InstancePath,
    /// Name of the defining component
    pub component: String,
    pub port: Port,
}
/// An instance and its accumulated [Transform]
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInstance {
    pub path: InstancePath,
    pub component: String,
    pub transform: Transform,
}

/// # Resolved Hierarchy
///
/// Everything reachable from a root, in depth-first, reference-insertion order.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolved {
    /// Root component name
    pub root: String,
    pub polygons: Vec<ResolvedPolygon>,
    pub ports: Vec<ResolvedPort>,
    /// Every instance below the root
    pub instances: Vec<ResolvedInstance>,
}
impl Resolved {
    /// Flattened shapes, grouped by layer
    pub fn by_layer(&self) -> BTreeMap<Layer, Vec<Shape>> {
        let mut map: BTreeMap<Layer, Vec<Shape>> = BTreeMap::new();
        for p in self.polygons.iter() {
            map.entry(p.layer).or_default().push(p.shape.clone());
        }
        map
    }
    /// Get the port named `name` on the instance at `path`
    pub fn port(&self, path: &InstancePath, name: &str) -> Option<&ResolvedPort> {
        self.ports
            .iter()
            .find(|p| &p.path == path && p.port.name == name)
    }
    /// Boolean indication of whether we contain no shapes and no ports
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.ports.is_empty()
    }
}
impl BoundBoxTrait for Resolved {
    /// Bounds of all shapes. Ports are not included.
    fn bbox(&self) -> BoundBox {
        let mut bbox = BoundBox::empty();
        for p in self.polygons.iter() {
            bbox = p.shape.union(&bbox);
        }
        bbox
    }
}

/// # Resolution Options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveOptions {
    /// Maximum depth of references to descend. `None` descends all the way.
    pub max_depth: Option<usize>,
    /// Whether to collect ports
    pub include_ports: bool,
    /// Whether to collect shapes
    pub include_polygons: bool,
}
impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            include_ports: true,
            include_polygons: true,
        }
    }
}

/// # Resolver
///
/// Depth-first walker over a [Library]'s reference graph.
/// Tracks the components on its active path, and fails with [LayoutError::CyclicReference]
/// upon revisiting one, regardless of any checks made as references were added.
///
pub struct Resolver<'lib> {
    lib: &'lib Library,
    opts: ResolveOptions,
    /// Components on the active path, root first
    active: Vec<ComponentKey>,
    out: Resolved,
}
impl<'lib> Resolver<'lib> {
    pub fn new(lib: &'lib Library, opts: &ResolveOptions) -> Self {
        Self {
            lib,
            opts: opts.clone(),
            active: Vec::new(),
            out: Resolved::default(),
        }
    }
    /// Resolve everything under `root`, in its own coordinates
    pub fn resolve(self, root: ComponentKey) -> LayoutResult<Resolved> {
        self.resolve_transformed(root, &Transform::identity())
    }
    /// Resolve everything under `root`, with `trans` applied at the top
    pub fn resolve_transformed(
        mut self,
        root: ComponentKey,
        trans: &Transform,
    ) -> LayoutResult<Resolved> {
        self.out.root = self.lib.get(root)?.name().to_string();
        self.resolve_helper(root, trans, InstancePath::root())?;
        debug!(
            "Resolved `{}`: {} shapes, {} ports, {} instances",
            self.out.root,
            self.out.polygons.len(),
            self.out.ports.len(),
            self.out.instances.len()
        );
        Ok(self.out)
    }
    /// Internal helper and core logic for [Resolver::resolve]
    fn resolve_helper(
        &mut self,
        key: ComponentKey,
        trans: &Transform,
        path: InstancePath,
    ) -> LayoutResult<()> {
        if let Some(pos) = self.active.iter().position(|k| *k == key) {
            let mut names: Vec<String> = self.active[pos..]
                .iter()
                .map(|k| self.lib.name_of(*k))
                .collect();
            names.push(self.lib.name_of(key));
            return Err(LayoutError::CyclicReference { path: names });
        }
        let lib = self.lib;
        let comp = lib.get(key)?;
        self.active.push(key);

        if self.opts.include_polygons {
            for (layer, shapes) in comp.shapes() {
                for shape in shapes {
                    self.out.polygons.push(ResolvedPolygon {
                        path: path.clone(),
                        component: comp.name().to_string(),
                        layer: *layer,
                        shape: shape.transform(trans),
                    });
                }
            }
        }
        if self.opts.include_ports {
            for port in comp.ports() {
                self.out.ports.push(ResolvedPort {
                    path: path.clone(),
                    component: comp.name().to_string(),
                    port: port.transform(trans),
                });
            }
        }
        let descend = match self.opts.max_depth {
            Some(max) => path.depth() < max,
            None => true,
        };
        if descend {
            for r in comp.references() {
                // Cascade the parent's and reference's transforms
                let child_trans = Transform::cascade(trans, &r.transform());
                let child_path = path.child(&r.name);
                self.out.instances.push(ResolvedInstance {
                    path: child_path.clone(),
                    component: lib.name_of(r.component),
                    transform: child_trans,
                });
                self.resolve_helper(r.component, &child_trans, child_path)?;
            }
        }
        self.active.pop();
        Ok(())
    }
}
