//!
//! # Configuration
//!

// Std-Lib
use std::path::Path;

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::error::{LayoutError, LayoutResult};
use crate::utils::SerdeFile;

/// # Distance Units
/// Physical size of one unit of [crate::Point] coordinates
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Units {
    /// Micrometers, or microns
    #[default]
    Micro,
    /// Nanometers
    Nano,
}
impl Units {
    /// Size of one unit, in meters
    pub fn meters(&self) -> f64 {
        match self {
            Self::Micro => 1e-6,
            Self::Nano => 1e-9,
        }
    }
}

/// # Netlist Extraction Configuration
///
/// Both tolerances must be supplied; neither has a default.
///
/// ```text
/// position_tolerance = 0.001
/// angle_tolerance = 0.1
/// ```
///
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NetlistConfig {
    /// Maximum distance between connected ports, in library units
    pub position_tolerance: f64,
    /// Maximum deviation from anti-parallel of connected ports, in degrees
    pub angle_tolerance: f64,
}
impl SerdeFile for NetlistConfig {}
impl NetlistConfig {
    /// Create a new and validated [NetlistConfig]
    pub fn new(position_tolerance: f64, angle_tolerance: f64) -> LayoutResult<Self> {
        let cfg = Self {
            position_tolerance,
            angle_tolerance,
        };
        cfg.validate()?;
        Ok(cfg)
    }
    /// Check both tolerances are finite and positive
    pub fn validate(&self) -> LayoutResult<()> {
        if !(self.position_tolerance.is_finite() && self.position_tolerance > 0.) {
            return Err(LayoutError::validation(format!(
                "Invalid position tolerance {}",
                self.position_tolerance
            )));
        }
        if !(self.angle_tolerance.is_finite() && self.angle_tolerance > 0.) {
            return Err(LayoutError::validation(format!(
                "Invalid angle tolerance {}",
                self.angle_tolerance
            )));
        }
        Ok(())
    }
    /// Load and validate from the JSON, YAML, or TOML file at `fname`
    pub fn load(fname: impl AsRef<Path>) -> LayoutResult<Self> {
        let cfg = Self::open_path(fname)?;
        cfg.validate()?;
        Ok(cfg)
    }
}
