//! Material sets indexed by material id, plus named presets.
//!
//! Presets use handbook values (SI units) for a few common
//! engineering solids.

use otm_types::{MaterialId, OtmError, OtmResult};

use crate::model::MaterialModel;
use crate::properties::{ElasticProperties, J2Properties};

/// Materials of a simulation, addressed by dense [`MaterialId`].
#[derive(Debug, Clone, Default)]
pub struct MaterialSet {
    names: Vec<String>,
    models: Vec<MaterialModel>,
}

impl MaterialSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set holding a single material with id 0.
    pub fn single(name: impl Into<String>, model: MaterialModel) -> Self {
        let mut set = Self::new();
        set.push(name, model);
        set
    }

    /// Appends a material and returns its id.
    pub fn push(&mut self, name: impl Into<String>, model: MaterialModel) -> MaterialId {
        let id = MaterialId(self.models.len() as u16);
        self.names.push(name.into());
        self.models.push(model);
        id
    }

    /// Looks up a material. Returns `None` for unknown ids.
    pub fn get(&self, id: MaterialId) -> Option<&MaterialModel> {
        self.models.get(id.index())
    }

    /// Looks up a material, failing with `InvalidMaterial` for unknown ids.
    pub fn require(&self, id: MaterialId) -> OtmResult<&MaterialModel> {
        self.get(id).ok_or_else(|| {
            OtmError::InvalidMaterial(format!(
                "material id {} not defined ({} materials)",
                id.0,
                self.len()
            ))
        })
    }

    /// Name given to a material at registration.
    pub fn name(&self, id: MaterialId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    /// All material ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = MaterialId> + '_ {
        (0..self.models.len()).map(|i| MaterialId(i as u16))
    }

    /// Returns the number of materials.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns true if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Looks up a named preset.
    pub fn preset(name: &str) -> Option<MaterialModel> {
        let model = match name {
            "steel_j2" => MaterialModel::variational_j2(steel()),
            "aluminum_j2" => MaterialModel::variational_j2(aluminum()),
            "copper_j2" => MaterialModel::variational_j2(copper()),
            "rubber_neo_hookean" => MaterialModel::neo_hookean(rubber()),
            _ => return None,
        };
        model.ok()
    }

    /// Names accepted by [`preset`](Self::preset).
    pub fn preset_names() -> &'static [&'static str] {
        &["steel_j2", "aluminum_j2", "copper_j2", "rubber_neo_hookean"]
    }
}

// ─── Presets ──────────────────────────────────────────────────

/// Mild steel, rate-sensitive.
fn steel() -> J2Properties {
    J2Properties {
        elastic: ElasticProperties::from_young_poisson(200.0e9, 0.3),
        yield_stress: 250.0e6,
        hardening_exponent: 4.0,
        reference_plastic_strain: 0.01,
        viscous_stress: 50.0e6,
        rate_sensitivity: 5.0,
        reference_strain_rate: 1.0e3,
    }
}

/// Aluminum 6061-T6, rate-insensitive.
fn aluminum() -> J2Properties {
    J2Properties {
        elastic: ElasticProperties::from_young_poisson(69.0e9, 0.33),
        yield_stress: 276.0e6,
        hardening_exponent: 10.0,
        reference_plastic_strain: 0.005,
        viscous_stress: 0.0,
        rate_sensitivity: 1.0,
        reference_strain_rate: 1.0,
    }
}

/// Annealed OFHC copper.
fn copper() -> J2Properties {
    J2Properties {
        elastic: ElasticProperties::from_young_poisson(117.0e9, 0.34),
        yield_stress: 70.0e6,
        hardening_exponent: 2.5,
        reference_plastic_strain: 0.02,
        viscous_stress: 20.0e6,
        rate_sensitivity: 10.0,
        reference_strain_rate: 1.0e3,
    }
}

/// Nearly incompressible natural rubber.
fn rubber() -> ElasticProperties {
    ElasticProperties {
        bulk_modulus: 2.0e9,
        shear_modulus: 0.6e6,
    }
}
