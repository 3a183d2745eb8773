//! Input deck validation.
//!
//! Validates a deck before the kernels see it, catching configuration
//! errors at startup with clear diagnostics.

use otm_material::{ElasticProperties, J2Properties, MaterialModel, MaterialSet};
use otm_meshless::{MaxEntConfig, SearchConfig};
use otm_types::{OtmError, OtmResult};
use tracing::debug;

use crate::contract::{InputDeck, MaterialInput, RunParams};

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub maxent: MaxEntConfig,
    pub search: SearchConfig,
    pub run: RunParams,
    pub materials: MaterialSet,
}

/// Validates a deck and builds the runtime configuration.
///
/// Checks:
/// - max-ent and search parameters
/// - run parameters are physically reasonable
/// - at least one material; each enables exactly one model with valid parameters
pub fn validate_deck(deck: &InputDeck) -> OtmResult<RuntimeConfig> {
    deck.maxent.validate()?;
    deck.search.validate()?;
    validate_run(&deck.run)?;

    if deck.materials.is_empty() {
        return Err(OtmError::InvalidMaterial(
            "deck defines no materials".into(),
        ));
    }
    if deck.materials.len() > usize::from(u16::MAX) {
        return Err(OtmError::InvalidMaterial(format!(
            "deck defines {} materials, at most {} supported",
            deck.materials.len(),
            u16::MAX
        )));
    }

    let mut materials = MaterialSet::new();
    for input in &deck.materials {
        let model = material_model(input)?;
        let id = materials.push(input.name.clone(), model);
        debug!(material = id.0, name = %input.name, "validated material");
    }

    Ok(RuntimeConfig {
        maxent: deck.maxent,
        search: deck.search,
        run: deck.run,
        materials,
    })
}

/// Converts a material's selectors into a tagged model.
pub fn material_model(input: &MaterialInput) -> OtmResult<MaterialModel> {
    let elastic = ElasticProperties {
        bulk_modulus: input.bulk_modulus,
        shear_modulus: input.shear_modulus,
    };
    let result = match (input.enable_neo_hookean, input.enable_variational_j2) {
        (true, false) => MaterialModel::neo_hookean(elastic),
        (false, true) => MaterialModel::variational_j2(J2Properties {
            elastic,
            yield_stress: input.yield_stress,
            hardening_exponent: input.hardening_exponent,
            reference_plastic_strain: input.reference_plastic_strain,
            viscous_stress: input.viscous_stress,
            rate_sensitivity: input.rate_sensitivity,
            reference_strain_rate: input.reference_strain_rate,
        }),
        (false, false) => Err(OtmError::InvalidMaterial(
            "no constitutive model enabled".into(),
        )),
        (true, true) => Err(OtmError::InvalidMaterial(
            "more than one constitutive model enabled".into(),
        )),
    };
    result.map_err(|e| match e {
        OtmError::InvalidMaterial(msg) => {
            OtmError::InvalidMaterial(format!("material `{}`: {msg}", input.name))
        }
        other => other,
    })
}

/// Validates run parameters.
fn validate_run(run: &RunParams) -> OtmResult<()> {
    if !(run.dt > 0.0 && run.dt.is_finite()) {
        return Err(OtmError::InvalidConfig("run.dt must be positive".into()));
    }
    if !(run.length_scale_factor > 0.0 && run.length_scale_factor.is_finite()) {
        return Err(OtmError::InvalidConfig(
            "run.length_scale_factor must be positive".into(),
        ));
    }
    if !(run.density > 0.0 && run.density.is_finite()) {
        return Err(OtmError::InvalidConfig("run.density must be positive".into()));
    }
    if !run.strain_rate.is_finite() {
        return Err(OtmError::InvalidConfig("run.strain_rate must be finite".into()));
    }
    if run.cells.iter().any(|&c| c == 0) {
        return Err(OtmError::InvalidConfig(
            "run.cells must be at least 1 along every axis".into(),
        ));
    }
    if run.extent.iter().any(|&e| !(e > 0.0 && e.is_finite())) {
        return Err(OtmError::InvalidConfig(
            "run.extent must be positive along every axis".into(),
        ));
    }
    Ok(())
}
