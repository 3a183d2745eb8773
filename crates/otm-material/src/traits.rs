//! Constitutive model trait and its per-point state.
//!
//! Every material model implements this trait, enabling the dispatcher
//! to swap material strategies without changing its per-point loop.

use otm_math::DMat3;

/// Plastic internal variables carried by every material point.
///
/// Elastic models leave them untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlasticState {
    /// Plastic deformation gradient since simulation start.
    pub deformation_gradient: DMat3,
    /// Equivalent plastic strain.
    pub equivalent_strain: f64,
}

impl Default for PlasticState {
    fn default() -> Self {
        Self {
            deformation_gradient: DMat3::IDENTITY,
            equivalent_strain: 0.0,
        }
    }
}

/// Output of one constitutive evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstitutiveResponse {
    /// Cauchy stress.
    pub stress: DMat3,
    /// Tangent (effective) bulk modulus.
    pub bulk_modulus: f64,
    /// Tangent (effective) shear modulus.
    pub shear_modulus: f64,
    /// Stored (Helmholtz) energy per unit reference volume.
    pub energy_density: f64,
}

/// The deformation handed to a model is not admissible (J ≤ 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstitutiveFailure {
    /// Determinant of the offending deformation gradient.
    pub jacobian: f64,
}

/// Trait for constitutive models (material behavior).
///
/// # Strategy Pattern
///
/// - `NeoHookean`: compressible hyperelastic solid
/// - `VariationalJ2`: finite-strain J2 plasticity with power-law
///   hardening and rate sensitivity
pub trait ConstitutiveModel: Send + Sync {
    /// Evaluate the response at cumulative deformation gradient `f`.
    ///
    /// # Arguments
    /// - `f`: deformation gradient since simulation start
    /// - `dt`: time increment (rate-dependent models only)
    /// - `plastic`: plastic state, updated in place
    fn update(
        &self,
        f: &DMat3,
        dt: f64,
        plastic: &mut PlasticState,
    ) -> Result<ConstitutiveResponse, ConstitutiveFailure>;

    /// Returns the name of this constitutive model.
    fn name(&self) -> &str;

    /// Returns true if the model evolves the plastic state.
    fn is_plastic(&self) -> bool {
        false
    }
}
