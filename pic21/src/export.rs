//!
//! # Export & Import
//!
//! Conversion between a [Library] and its serializable form, [ExportLibrary].
//! Encoding into binary layout formats happens downstream, from this form.
//!

// Crates.io
use log::info;
use serde::{Deserialize, Serialize};

// Local imports
use crate::component::Component;
use crate::config::Units;
use crate::error::{ErrorContext, LayoutError, LayoutResult};
use crate::geom::{Path, Point, Polygon, Rect, Shape};
use crate::layers::Layer;
use crate::library::{ComponentKey, Library};
use crate::port::Port;
use crate::reference::Placement;
use crate::utils::{ErrorHelper, SerdeFile, Unwrapper};

/// # Exported Library
///
/// Components are listed in dependency order: each after everything it references.
///
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportLibrary {
    pub name: String,
    pub units: Units,
    pub grid: f64,
    /// Name of the top-level component, if exported from one
    #[serde(default)]
    pub top: Option<String>,
    /// Layer names
    #[serde(default)]
    pub layers: Vec<ExportLayerName>,
    pub components: Vec<ExportComponent>,
    /// Flattened, grid-snapped geometry of `top`
    #[serde(default)]
    pub flat: Vec<ExportLayer>,
}
impl SerdeFile for ExportLibrary {}

/// A named [Layer]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportLayerName {
    pub name: String,
    pub layer: Layer,
}
/// Shapes on a single [Layer]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportLayer {
    pub layer: Layer,
    pub shapes: Vec<Shape>,
}
/// A reference, with its child by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReference {
    pub name: String,
    pub component: String,
    pub placement: Placement,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportComponent {
    pub name: String,
    #[serde(default)]
    pub layers: Vec<ExportLayer>,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub references: Vec<ExportReference>,
}

/// # Exporter
/// Converts a [Library] into an [ExportLibrary]
#[derive(Debug)]
pub struct Exporter<'lib> {
    lib: &'lib Library,
    ctx: Vec<ErrorContext>,
}
impl<'lib> Exporter<'lib> {
    /// Export `root`, everything it references, and its flattened geometry
    pub fn export(lib: &'lib Library, root: ComponentKey) -> LayoutResult<ExportLibrary> {
        let mut exporter = Self::new(lib);
        let order = lib.dep_order_from(root)?;
        let mut rv = exporter.export_components(&order)?;
        let resolved = lib.resolve(root)?;
        rv.top = Some(resolved.root.clone());
        rv.flat = resolved
            .by_layer()
            .into_iter()
            .map(|(layer, shapes)| ExportLayer {
                layer,
                shapes: shapes.iter().map(|s| snap_shape(s, lib.grid)).collect(),
            })
            .collect();
        info!(
            "Exported `{}` from library `{}`: {} components, {} flattened layers",
            resolved.root,
            lib.name,
            rv.components.len(),
            rv.flat.len()
        );
        Ok(rv)
    }
    /// Export every component in `lib`, without flattening
    pub fn export_all(lib: &'lib Library) -> LayoutResult<ExportLibrary> {
        let mut exporter = Self::new(lib);
        let order = lib.dep_order()?;
        let rv = exporter.export_components(&order)?;
        info!(
            "Exported library `{}`: {} components",
            lib.name,
            rv.components.len()
        );
        Ok(rv)
    }
    fn new(lib: &'lib Library) -> Self {
        Self {
            lib,
            ctx: vec![ErrorContext::Library(lib.name.clone())],
        }
    }
    /// Export the library-level data, and components `order`
    fn export_components(&mut self, order: &[ComponentKey]) -> LayoutResult<ExportLibrary> {
        let layers: Vec<ExportLayerName> = {
            let table = self.lib.layers.read()?;
            let named = table
                .iter()
                .map(|(name, layer)| ExportLayerName {
                    name: name.to_string(),
                    layer: *layer,
                })
                .collect();
            named
        };
        let components = order
            .iter()
            .map(|key| self.export_component(*key))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ExportLibrary {
            name: self.lib.name.clone(),
            units: self.lib.units,
            grid: self.lib.grid,
            top: None,
            layers,
            components,
            flat: Vec::new(),
        })
    }
    /// Export a single [Component]
    fn export_component(&mut self, key: ComponentKey) -> LayoutResult<ExportComponent> {
        let lib = self.lib;
        let comp = lib.component(key).unwrapper(&*self, "Component not found")?;
        self.ctx.push(ErrorContext::Component(comp.name().to_string()));
        let layers = comp
            .shapes()
            .map(|(layer, shapes)| ExportLayer {
                layer: *layer,
                shapes: shapes.to_vec(),
            })
            .collect();
        let mut references = Vec::with_capacity(comp.references().len());
        for r in comp.references() {
            let child = lib
                .component(r.component)
                .unwrapper(&*self, format!("Reference `{}` to missing component", r.name))?;
            references.push(ExportReference {
                name: r.name.clone(),
                component: child.name().to_string(),
                placement: r.placement.clone(),
            });
        }
        self.ctx.pop();
        Ok(ExportComponent {
            name: comp.name().to_string(),
            layers,
            ports: comp.ports().to_vec(),
            references,
        })
    }
}
impl ErrorHelper for Exporter<'_> {
    type Error = LayoutError;
    fn err(&self, msg: impl Into<String>) -> LayoutError {
        LayoutError::Export {
            message: msg.into(),
            stack: self.ctx.clone(),
        }
    }
}

/// # Importer
/// Rebuilds a [Library] from an [ExportLibrary]. Imported components are locked.
#[derive(Debug, Default)]
pub struct Importer {
    ctx: Vec<ErrorContext>,
}
impl Importer {
    pub fn import(src: &ExportLibrary) -> LayoutResult<Library> {
        let mut importer = Self {
            ctx: vec![ErrorContext::Library(src.name.clone())],
        };
        let lib = importer.import_lib(src)?;
        info!(
            "Imported library `{}`: {} components",
            lib.name,
            lib.len()
        );
        Ok(lib)
    }
    fn import_lib(&mut self, src: &ExportLibrary) -> LayoutResult<Library> {
        self.assert(
            src.grid.is_finite() && src.grid >= 0.,
            format!("Invalid grid {}", src.grid),
        )?;
        let mut lib = Library::new(&src.name);
        lib.units = src.units;
        lib.grid = src.grid;
        {
            let mut layers = lib.layers.write()?;
            for l in src.layers.iter() {
                self.ctx.push(ErrorContext::Layer(l.name.clone()));
                if layers.add(&l.name, l.layer).is_err() {
                    return self.fail("Conflicting layer definition");
                }
                self.ctx.pop();
            }
        }
        for c in src.components.iter() {
            self.ctx.push(ErrorContext::Component(c.name.clone()));
            self.import_component(&mut lib, c)?;
            self.ctx.pop();
        }
        Ok(lib)
    }
    /// Import a single component. Everything it references must already be in `lib`.
    fn import_component(&mut self, lib: &mut Library, src: &ExportComponent) -> LayoutResult<()> {
        let mut comp = Component::new(&src.name);
        for l in src.layers.iter() {
            for shape in l.shapes.iter() {
                comp.add_shape(l.layer, shape.clone())?;
            }
        }
        for port in src.ports.iter() {
            self.ctx.push(ErrorContext::Port(port.name.clone()));
            comp.add_port(port.clone())?;
            self.ctx.pop();
        }
        // Check all children before adding anything
        let mut children = Vec::with_capacity(src.references.len());
        for r in src.references.iter() {
            self.ctx.push(ErrorContext::Reference(r.name.clone()));
            let child = lib
                .key(&r.component)
                .unwrapper(&*self, format!("Unknown component `{}`", r.component))?;
            self.ctx.pop();
            children.push(child);
        }
        let key = lib.add_component(comp)?;
        for (r, child) in src.references.iter().zip(children) {
            lib.add_named_reference(key, &r.name, child, r.placement.clone())?;
        }
        lib.get_mut(key)?.lock();
        Ok(())
    }
}
impl ErrorHelper for Importer {
    type Error = LayoutError;
    fn err(&self, msg: impl Into<String>) -> LayoutError {
        LayoutError::Import {
            message: msg.into(),
            stack: self.ctx.clone(),
        }
    }
}

impl ExportLibrary {
    /// Rebuild a [Library]. Shorthand for [Importer::import].
    pub fn import(&self) -> LayoutResult<Library> {
        Importer::import(self)
    }
}

/// Snap every coordinate of `shape` to `grid`
fn snap_shape(shape: &Shape, grid: f64) -> Shape {
    let snap = |pts: &[Point]| pts.iter().map(|p| p.snap(grid)).collect::<Vec<_>>();
    match shape {
        Shape::Rect(r) => Shape::Rect(Rect::new(r.p0.snap(grid), r.p1.snap(grid))),
        Shape::Polygon(p) => Shape::Polygon(Polygon::new(snap(&p.points))),
        Shape::Path(p) => Shape::Path(Path::new(snap(&p.points), p.width)),
    }
}
