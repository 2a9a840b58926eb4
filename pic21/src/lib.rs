//!
//! # pic21
//!
//! Hierarchical composition and connectivity for photonic and electronic IC layout.
//!
//! Layout is organized into [Component]s, each owning shapes on a set of [Layer]s,
//! typed and oriented [Port]s, and [Reference]s to other components.
//! Components live in a [Library], and are addressed by [ComponentKey].
//!
//! Hierarchies are flattened to root coordinates by [Library::resolve],
//! and their connectivity extracted by [Library::netlist].
//!
//! Conversion to and from a serializable form is supported via [Exporter] and [Importer].
//!

// Internal modules & re-exports
pub use pic21utils as utils;
pub use utils::{Ptr, SerdeFile, SerializationFormat};

pub mod error;
pub use error::*;

pub mod geom;
pub use geom::*;

pub mod bbox;
pub use bbox::*;

pub mod layers;
pub use layers::*;

pub mod port;
pub use port::*;

pub mod reference;
pub use reference::*;

pub mod component;
pub use component::*;

pub mod library;
pub use library::*;

pub mod resolve;
pub use resolve::*;

pub mod netlist;
pub use netlist::*;

pub mod config;
pub use config::*;

pub mod export;
pub use export::*;

pub mod ops;
pub use ops::*;
