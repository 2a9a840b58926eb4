//!
//! # Layers and Layer Tables
//!

// Std-Lib
use std::collections::BTreeMap;

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::error::{LayoutError, LayoutResult};

/// # Layer Identifier
///
/// GDSII-style (layer-number, datatype) pair.
/// Ordered, so that per-layer content iterates deterministically.
///
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Layer {
    /// Layer Number
    pub layer: i16,
    /// Data-Type Number
    pub datatype: i16,
}
impl Layer {
    /// Create a new [Layer]
    pub fn new(layer: i16, datatype: i16) -> Self {
        Self { layer, datatype }
    }
}
impl From<(i16, i16)> for Layer {
    fn from(pair: (i16, i16)) -> Self {
        Self::new(pair.0, pair.1)
    }
}
impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.layer, self.datatype)
    }
}

/// # Layer Table
///
/// Name to [Layer] mapping.
/// Typically shared between libraries through a [crate::utils::Ptr].
///
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Layers {
    names: BTreeMap<String, Layer>,
}
impl Layers {
    /// Add [Layer] `layer` under `name`.
    /// Re-adding an identical binding is a no-op; re-binding `name` to a different layer fails.
    pub fn add(&mut self, name: impl Into<String>, layer: impl Into<Layer>) -> LayoutResult<Layer> {
        let name = name.into();
        let layer = layer.into();
        match self.names.get(&name) {
            Some(existing) if *existing != layer => Err(LayoutError::DuplicateName(name)),
            _ => {
                self.names.insert(name, layer);
                Ok(layer)
            }
        }
    }
    /// Get the [Layer] named `name`
    pub fn get(&self, name: &str) -> Option<Layer> {
        self.names.get(name).copied()
    }
    /// Get the first name bound to `layer`
    pub fn name_of(&self, layer: &Layer) -> Option<&str> {
        self.names
            .iter()
            .find(|(_, l)| *l == layer)
            .map(|(name, _)| name.as_str())
    }
    /// Iterate over (name, layer) pairs, in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Layer)> {
        self.names.iter().map(|(n, l)| (n.as_str(), l))
    }
    pub fn len(&self) -> usize {
        self.names.len()
    }
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
