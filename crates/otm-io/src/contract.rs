//! Input deck contract types.
//!
//! These types define the configuration boundary of the meshfree core.
//! They are serializable for CLI configuration files.

use std::path::Path;

use otm_meshless::{MaxEntConfig, SearchConfig};
use otm_types::{OtmError, OtmResult};
use serde::{Deserialize, Serialize};

/// Complete input deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDeck {
    /// Shape-function solver parameters.
    #[serde(default)]
    pub maxent: MaxEntConfig,

    /// Neighbor search parameters.
    #[serde(default)]
    pub search: SearchConfig,

    /// Step sequence driven by the CLI.
    #[serde(default)]
    pub run: RunParams,

    /// Materials, addressed by position (material id 0, 1, ...).
    pub materials: Vec<MaterialInput>,
}

impl InputDeck {
    /// Parses a deck from TOML text.
    pub fn from_toml_str(text: &str) -> OtmResult<Self> {
        toml::from_str(text).map_err(|e| OtmError::Serialization(e.to_string()))
    }

    /// Reads and parses a deck file.
    pub fn from_path(path: impl AsRef<Path>) -> OtmResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Renders the deck as TOML.
    pub fn to_toml_string(&self) -> OtmResult<String> {
        toml::to_string(self).map_err(|e| OtmError::Serialization(e.to_string()))
    }
}

/// Per-material parameters with boolean model selectors.
///
/// Exactly one selector must be enabled. Plasticity parameters are only
/// read by the J2 branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialInput {
    /// Human-readable name.
    pub name: String,

    pub bulk_modulus: f64,
    pub shear_modulus: f64,

    #[serde(default)]
    pub yield_stress: f64,
    #[serde(default)]
    pub hardening_exponent: f64,
    #[serde(default)]
    pub reference_plastic_strain: f64,
    #[serde(default)]
    pub viscous_stress: f64,
    #[serde(default)]
    pub rate_sensitivity: f64,
    #[serde(default)]
    pub reference_strain_rate: f64,

    #[serde(default)]
    pub enable_neo_hookean: bool,
    #[serde(default)]
    pub enable_variational_j2: bool,
}

/// Parameters of the demonstration step sequence.
///
/// The run loads a `cells` block of Kuhn tetrahedra spanning `extent`
/// and stretches it along x at a constant engineering strain rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunParams {
    /// Time increment (seconds).
    pub dt: f64,
    /// Number of steps.
    pub steps: u32,
    /// Locality length scale `h` as a multiple of the cell size.
    pub length_scale_factor: f64,
    /// Initial mass density.
    pub density: f64,
    /// Applied strain rate along x (1/s).
    pub strain_rate: f64,
    /// Cells per axis.
    pub cells: [usize; 3],
    /// Box size.
    pub extent: [f64; 3],
    /// Rebuild the support by grid search every this many steps (0 = never).
    pub search_interval: u32,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            dt: 1.0e-6,
            steps: 10,
            length_scale_factor: 1.0,
            density: 7800.0,
            strain_rate: 100.0,
            cells: [4, 2, 2],
            extent: [0.02, 0.01, 0.01],
            search_interval: 0,
        }
    }
}
