//! Compressible neo-Hookean solid.
//!
//! ```text
//! W = K/4 (J² − 1 − 2 ln J) + G/2 (J^(−2/3) tr b − 3)
//! σ = K/2 (J − 1/J) I + G J^(−5/3) dev b,   b = F Fᵀ
//! ```

use otm_math::tensor::{deviator, trace};
use otm_math::DMat3;

use crate::properties::ElasticProperties;
use crate::traits::{ConstitutiveFailure, ConstitutiveModel, ConstitutiveResponse, PlasticState};

/// Hyperelastic neo-Hookean model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeoHookean {
    pub properties: ElasticProperties,
}

impl NeoHookean {
    pub fn new(properties: ElasticProperties) -> Self {
        Self { properties }
    }
}

impl ConstitutiveModel for NeoHookean {
    fn update(
        &self,
        f: &DMat3,
        _dt: f64,
        _plastic: &mut PlasticState,
    ) -> Result<ConstitutiveResponse, ConstitutiveFailure> {
        let ElasticProperties {
            bulk_modulus: k,
            shear_modulus: g,
        } = self.properties;
        let j = f.determinant();
        if !(j > 0.0 && j.is_finite()) {
            return Err(ConstitutiveFailure { jacobian: j });
        }

        let b = *f * f.transpose();
        let pressure = 0.5 * k * (j - 1.0 / j);
        let stress = DMat3::IDENTITY * pressure + deviator(&b) * (g * j.powf(-5.0 / 3.0));

        let energy_density = 0.25 * k * (j * j - 1.0 - 2.0 * j.ln())
            + 0.5 * g * (j.powf(-2.0 / 3.0) * trace(&b) - 3.0);

        Ok(ConstitutiveResponse {
            stress,
            // J dp/dJ of the volumetric pressure.
            bulk_modulus: 0.5 * k * (j + 1.0 / j),
            shear_modulus: g,
            energy_density,
        })
    }

    fn name(&self) -> &str {
        "Neo-Hookean"
    }
}
