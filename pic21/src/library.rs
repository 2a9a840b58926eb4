//!
//! # Component Library
//!
//! Arena of [Component]s, addressed by stable [ComponentKey] handles.
//! Operations which span more than one component, such as adding references, live here.
//!

// Std-Lib
use std::collections::{HashMap, HashSet};

// Crates.io
use log::debug;
use slotmap::{new_key_type, SlotMap};

// Local imports
use crate::bbox::{BoundBox, BoundBoxTrait};
use crate::component::Component;
use crate::config::{NetlistConfig, Units};
use crate::error::{LayoutError, LayoutResult};
use crate::geom::{Polygon, ShapeTrait};
use crate::layers::{Layer, Layers};
use crate::netlist::Netlist;
use crate::ops::PolygonOps;
use crate::port::Port;
use crate::reference::{Placement, Reference};
use crate::resolve::{ResolveOptions, Resolved, Resolver};
use crate::utils::{DepOrder, Ptr};

new_key_type! {
    /// Keys for [Component] entries
    pub struct ComponentKey;
}

/// # Library
///
/// Owns every [Component] in a design.
/// References hold [ComponentKey]s into the same library,
/// so a single component may be instanced any number of times without copying.
/// Components are never removed, and so outlive every reference to them.
///
#[derive(Debug, Clone)]
pub struct Library {
    /// Library Name
    pub name: String,
    /// Distance Units
    pub units: Units,
    /// Snapping resolution, in `units`, applied to flattened geometry on export
    pub grid: f64,
    /// Layer Definitions
    pub layers: Ptr<Layers>,
    /// Component Arena
    components: SlotMap<ComponentKey, Component>,
    /// Name to key lookup
    names: HashMap<String, ComponentKey>,
    /// Keys in insertion order
    order: Vec<ComponentKey>,
}
impl Library {
    /// Create a new and empty [Library]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_layers(name, Ptr::new(Layers::default()))
    }
    /// Create a new and empty [Library], sharing layer-table `layers`
    pub fn with_layers(name: impl Into<String>, layers: Ptr<Layers>) -> Self {
        Self {
            name: name.into(),
            units: Units::default(),
            grid: 0.001,
            layers,
            components: SlotMap::with_key(),
            names: HashMap::new(),
            order: Vec::new(),
        }
    }
    /// Add [Component] `component`, returning its key.
    /// Fails if its name is already in use, or if it references components absent from this library.
    pub fn add_component(&mut self, component: Component) -> LayoutResult<ComponentKey> {
        if self.names.contains_key(component.name()) {
            return Err(LayoutError::DuplicateName(component.name().to_string()));
        }
        for r in component.references() {
            if !self.components.contains_key(r.component) {
                return Err(LayoutError::not_found(format!(
                    "Component referenced by `{}`",
                    r.name
                )));
            }
        }
        let name = component.name().to_string();
        let key = self.components.insert(component);
        self.names.insert(name, key);
        self.order.push(key);
        Ok(key)
    }
    /// Create and add a new, empty [Component] named `name`
    pub fn create(&mut self, name: impl Into<String>) -> LayoutResult<ComponentKey> {
        self.add_component(Component::new(name))
    }
    /// Get a reference to the [Component] at `key`
    pub fn component(&self, key: ComponentKey) -> Option<&Component> {
        self.components.get(key)
    }
    /// Get a mutable reference to the [Component] at `key`
    pub fn component_mut(&mut self, key: ComponentKey) -> Option<&mut Component> {
        self.components.get_mut(key)
    }
    /// Get the [Component] at `key`, or fail with [LayoutError::NotFound]
    pub fn get(&self, key: ComponentKey) -> LayoutResult<&Component> {
        self.components
            .get(key)
            .ok_or_else(|| LayoutError::not_found(format!("Component {:?}", key)))
    }
    /// Get the [Component] at `key` mutably, or fail with [LayoutError::NotFound]
    pub fn get_mut(&mut self, key: ComponentKey) -> LayoutResult<&mut Component> {
        self.components
            .get_mut(key)
            .ok_or_else(|| LayoutError::not_found(format!("Component {:?}", key)))
    }
    /// Get the key of the component named `name`
    pub fn key(&self, name: &str) -> Option<ComponentKey> {
        self.names.get(name).copied()
    }
    /// Get the component named `name`
    pub fn named(&self, name: &str) -> Option<&Component> {
        self.key(name).and_then(|k| self.components.get(k))
    }
    /// Iterate over (key, component) pairs, in insertion order
    pub fn components(&self) -> impl Iterator<Item = (ComponentKey, &Component)> {
        self.order
            .iter()
            .filter_map(move |k| self.components.get(*k).map(|c| (*k, c)))
    }
    pub fn len(&self) -> usize {
        self.components.len()
    }
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
    /// Name of the component at `key`, for error messages
    pub(crate) fn name_of(&self, key: ComponentKey) -> String {
        self.components
            .get(key)
            .map(|c| c.name().to_string())
            .unwrap_or_else(|| format!("{:?}", key))
    }
    /// Look up layer `name` in our layer table
    pub fn layer(&self, name: &str) -> LayoutResult<Layer> {
        let layers = self.layers.read()?;
        layers
            .get(name)
            .ok_or_else(|| LayoutError::not_found(format!("Layer `{}`", name)))
    }

    /// Find a path of references from `from` to `to`, if one exists.
    /// The returned path includes both endpoints.
    fn find_path(&self, from: ComponentKey, to: ComponentKey) -> Option<Vec<ComponentKey>> {
        let mut seen = HashSet::new();
        let mut path = Vec::new();
        if self.find_path_helper(from, to, &mut seen, &mut path) {
            return Some(path);
        }
        None
    }
    fn find_path_helper(
        &self,
        node: ComponentKey,
        to: ComponentKey,
        seen: &mut HashSet<ComponentKey>,
        path: &mut Vec<ComponentKey>,
    ) -> bool {
        path.push(node);
        if node == to {
            return true;
        }
        if seen.insert(node) {
            if let Some(comp) = self.components.get(node) {
                for r in comp.references() {
                    if self.find_path_helper(r.component, to, seen, path) {
                        return true;
                    }
                }
            }
        }
        path.pop();
        false
    }
    /// Boolean indication of whether `from` is, or transitively references, `to`
    pub fn reaches(&self, from: ComponentKey, to: ComponentKey) -> bool {
        self.find_path(from, to).is_some()
    }

    /// Add a reference to `child` into `parent`, named `{child}_{n}`, where `n` counts up from the number of existing references to `child`.
    /// Returns the new reference's name.
    ///
    /// Fails with:
    /// * [LayoutError::NotFound] for keys not in this library
    /// * [LayoutError::CyclicReference] if `child` is, or transitively references, `parent`
    /// * [LayoutError::LockedComponent] if `parent` is locked
    ///
    /// Cycles are checked before locking.
    /// Failures leave the library unchanged.
    ///
    pub fn add_reference(
        &mut self,
        parent: ComponentKey,
        child: ComponentKey,
        placement: Placement,
    ) -> LayoutResult<String> {
        let child_name = self.get(child)?.name().to_string();
        let parent_comp = self.get(parent)?;
        let mut n = parent_comp
            .references()
            .iter()
            .filter(|r| r.component == child)
            .count();
        let name = loop {
            let candidate = format!("{}_{}", child_name, n);
            if parent_comp.reference(&candidate).is_none() {
                break candidate;
            }
            n += 1;
        };
        self.add_named_reference(parent, name.clone(), child, placement)?;
        Ok(name)
    }
    /// Add a reference to `child` into `parent`, named `name`.
    /// Fails as [Library::add_reference], plus [LayoutError::DuplicateName] if `name` is in use.
    pub fn add_named_reference(
        &mut self,
        parent: ComponentKey,
        name: impl Into<String>,
        child: ComponentKey,
        placement: Placement,
    ) -> LayoutResult<()> {
        let name = name.into();
        self.get(child)?;
        self.get(parent)?;
        if let Some(path) = self.find_path(child, parent) {
            // Report the cycle starting and ending at `parent`
            let mut names = vec![self.name_of(parent)];
            names.extend(path.into_iter().map(|k| self.name_of(k)));
            return Err(LayoutError::CyclicReference { path: names });
        }
        let parent_comp = self.get_mut(parent)?;
        parent_comp.check_unlocked()?;
        if !placement.is_valid() {
            return Err(LayoutError::validation(format!(
                "Invalid placement of `{}` in `{}`: {:?}",
                name,
                parent_comp.name(),
                placement
            )));
        }
        if parent_comp.reference(&name).is_some() {
            return Err(LayoutError::DuplicateName(name));
        }
        debug!("Adding reference `{}` to `{}`", name, parent_comp.name());
        parent_comp.push_reference(Reference {
            name,
            component: child,
            placement,
        });
        Ok(())
    }
    /// Add a reference to `child` into `parent`,
    /// placed such that its port `child_port` connects to `destination`.
    /// `destination` is in `parent`'s coordinates, e.g. as returned by [Library::reference_port].
    ///
    /// Fails with [LayoutError::TypeMismatch] if the two port types are incompatible,
    /// and otherwise as [Library::add_reference].
    ///
    pub fn add_reference_connected(
        &mut self,
        parent: ComponentKey,
        child: ComponentKey,
        child_port: &str,
        destination: &Port,
    ) -> LayoutResult<String> {
        let comp = self.get(child)?;
        let port = comp.port(child_port).ok_or_else(|| {
            LayoutError::not_found(format!("Port `{}` on `{}`", child_port, comp.name()))
        })?;
        if !port.port_type.is_compatible(&destination.port_type) {
            return Err(LayoutError::TypeMismatch {
                a: format!("{}.{} ({})", comp.name(), port.name, port.port_type),
                b: format!("{} ({})", destination.name, destination.port_type),
            });
        }
        let placement = Placement::connecting(port, destination, false);
        self.add_reference(parent, child, placement)
    }
    /// Get the reference named `reference` in `parent`
    fn reference_of(&self, parent: ComponentKey, reference: &str) -> LayoutResult<&Reference> {
        let comp = self.get(parent)?;
        comp.reference(reference).ok_or_else(|| {
            LayoutError::not_found(format!("Reference `{}` in `{}`", reference, comp.name()))
        })
    }
    /// Port `port` of reference `reference`, mapped into `parent`'s coordinates
    pub fn reference_port(
        &self,
        parent: ComponentKey,
        reference: &str,
        port: &str,
    ) -> LayoutResult<Port> {
        let r = self.reference_of(parent, reference)?;
        let child = self.get(r.component)?;
        let p = child.port(port).ok_or_else(|| {
            LayoutError::not_found(format!(
                "Port `{}` on `{}` (via reference `{}`)",
                port,
                child.name(),
                reference
            ))
        })?;
        Ok(p.transform(&r.transform()))
    }
    /// Re-export port `port` of reference `reference` as a port of `parent`, named `new_name`
    pub fn add_port_from_reference(
        &mut self,
        parent: ComponentKey,
        reference: &str,
        port: &str,
        new_name: impl Into<String>,
    ) -> LayoutResult<()> {
        let p = self.reference_port(parent, reference, port)?;
        let p = Port {
            name: new_name.into(),
            ..p
        };
        self.get_mut(parent)?.add_port(p)
    }
    /// Shift reference `reference` in `parent` by (dx, dy)
    pub fn move_reference(
        &mut self,
        parent: ComponentKey,
        reference: &str,
        dx: f64,
        dy: f64,
    ) -> LayoutResult<()> {
        if !(dx.is_finite() && dy.is_finite()) {
            return Err(LayoutError::validation(format!(
                "Non-finite move ({}, {}) of `{}`",
                dx, dy, reference
            )));
        }
        let comp = self.get_mut(parent)?;
        comp.check_unlocked()?;
        let name = comp.name().to_string();
        let r = comp
            .refs
            .iter_mut()
            .find(|r| r.name == reference)
            .ok_or_else(|| {
                LayoutError::not_found(format!("Reference `{}` in `{}`", reference, name))
            })?;
        r.placement = r.placement.translated(dx, dy);
        Ok(())
    }
    /// Replace reference `reference` in `parent` with copies of its flattened geometry.
    /// Ports of the absorbed hierarchy are dropped.
    pub fn absorb(&mut self, parent: ComponentKey, reference: &str) -> LayoutResult<()> {
        self.get(parent)?.check_unlocked()?;
        let r = self.reference_of(parent, reference)?.clone();
        let opts = ResolveOptions {
            include_ports: false,
            ..Default::default()
        };
        let resolved = Resolver::new(self, &opts).resolve_transformed(r.component, &r.transform())?;
        debug!(
            "Absorbing `{}` into `{}`: {} shapes",
            reference,
            self.name_of(parent),
            resolved.polygons.len()
        );
        let comp = self.get_mut(parent)?;
        comp.refs.retain(|x| x.name != reference);
        for p in resolved.polygons {
            comp.shapes.entry(p.layer).or_default().push(p.shape);
        }
        Ok(())
    }

    /// Flatten the hierarchy under `root` into world-space geometry and ports
    pub fn resolve(&self, root: ComponentKey) -> LayoutResult<Resolved> {
        self.resolve_with(root, &ResolveOptions::default())
    }
    /// Flatten the hierarchy under `root`, with options `opts`
    pub fn resolve_with(&self, root: ComponentKey, opts: &ResolveOptions) -> LayoutResult<Resolved> {
        Resolver::new(self, opts).resolve(root)
    }
    /// Bounding box of everything under `root`, in its coordinates
    pub fn bbox(&self, root: ComponentKey) -> LayoutResult<BoundBox> {
        let opts = ResolveOptions {
            include_ports: false,
            ..Default::default()
        };
        Ok(self.resolve_with(root, &opts)?.bbox())
    }
    /// Extract the connectivity of the hierarchy under `root`
    pub fn netlist(&self, root: ComponentKey, config: &NetlistConfig) -> LayoutResult<Netlist> {
        Netlist::extract(self, root, config)
    }
    /// Union of all geometry on `layer` under `root`, as computed by `ops`
    pub fn merged_layer(
        &self,
        root: ComponentKey,
        layer: impl Into<Layer>,
        ops: &impl PolygonOps,
    ) -> LayoutResult<Vec<Polygon>> {
        let layer = layer.into();
        let opts = ResolveOptions {
            include_ports: false,
            ..Default::default()
        };
        let resolved = self.resolve_with(root, &opts)?;
        let polys: Vec<Polygon> = resolved
            .polygons
            .iter()
            .filter(|p| p.layer == layer)
            .map(|p| p.shape.to_poly())
            .collect();
        ops.union(&polys)
    }
    /// All components in dependency order: each after every component it references
    pub fn dep_order(&self) -> LayoutResult<Vec<ComponentKey>> {
        ComponentOrder(self).order(&self.order)
    }
    /// `root` and everything it references, in dependency order. `root` comes last.
    pub fn dep_order_from(&self, root: ComponentKey) -> LayoutResult<Vec<ComponentKey>> {
        self.get(root)?;
        ComponentOrder(self).order(&[root])
    }
    /// Lock every component
    pub fn lock_all(&mut self) {
        for comp in self.components.values_mut() {
            comp.lock();
        }
    }
}

/// Dependency-ordering of a [Library]'s components
struct ComponentOrder<'lib>(&'lib Library);
impl DepOrder for ComponentOrder<'_> {
    type Item = ComponentKey;
    type Error = LayoutError;

    fn deps(&self, item: &ComponentKey) -> LayoutResult<Vec<ComponentKey>> {
        let comp = self.0.get(*item)?;
        Ok(comp.references().iter().map(|r| r.component).collect())
    }
    fn cycle(&self, path: &[ComponentKey]) -> LayoutError {
        LayoutError::CyclicReference {
            path: path.iter().map(|k| self.0.name_of(*k)).collect(),
        }
    }
}
