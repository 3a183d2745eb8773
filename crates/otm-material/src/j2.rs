//! Finite-strain variational J2 plasticity.
//!
//! Multiplicative split `F = Fe Fp` with a Hencky elastic energy
//!
//! ```text
//! W(Fe, ep) = K/2 θ² + G ‖dev εe‖² + Wp(ep),   εe = ½ log(Fe Feᵀ),  θ = tr εe
//! ```
//!
//! The plastic increment Δep minimizes the incremental energy. For an
//! isotropic Hencky law this reduces to a radial return in logarithmic
//! strain space with a scalar equation
//!
//! ```text
//! q_trial − 3G Δep = Y0 (1 + ep/ε0)^(1/n) + Svis0 (Δep / (Δt ε̇0))^(1/m)
//! ```
//!
//! solved by Newton's method safeguarded with bisection. The plastic
//! flow updates `Fp` through the exponential map.

use otm_math::decomposition::{exp_symmetric, log_spd};
use otm_math::pivot::inverse_full_pivot;
use otm_math::tensor::{contract, deviator, trace};
use otm_math::DMat3;

use crate::properties::J2Properties;
use crate::traits::{ConstitutiveFailure, ConstitutiveModel, ConstitutiveResponse, PlasticState};

const RETURN_MAX_ITERATIONS: usize = 64;
const RETURN_TOLERANCE: f64 = 1.0e-12;

/// Rate-dependent J2 plasticity with power-law hardening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariationalJ2 {
    pub properties: J2Properties,
}

impl VariationalJ2 {
    pub fn new(properties: J2Properties) -> Self {
        Self { properties }
    }

    /// Solves the consistency condition for the plastic strain increment.
    ///
    /// The residual is strictly decreasing on `[0, q_trial / 3G]` and
    /// changes sign there, so the bracket always holds a root.
    fn plastic_increment(&self, trial_stress: f64, plastic_strain: f64, dt: f64) -> f64 {
        let props = &self.properties;
        let g = props.elastic.shear_modulus;
        let residual = |delta: f64| {
            let (viscous, viscous_slope) = if dt > 0.0 {
                let (s, ds) = props.viscous_overstress(delta / dt);
                (s, ds / dt)
            } else {
                (0.0, 0.0)
            };
            let value = trial_stress
                - 3.0 * g * delta
                - props.flow_stress(plastic_strain + delta)
                - viscous;
            let slope = -3.0 * g - props.hardening_modulus(plastic_strain + delta) - viscous_slope;
            (value, slope)
        };

        let (mut lo, mut hi) = (0.0, trial_stress / (3.0 * g));
        let scale = props.yield_stress;
        let mut delta = (trial_stress - props.flow_stress(plastic_strain))
            / (3.0 * g + props.hardening_modulus(plastic_strain));
        delta = delta.clamp(lo, hi);

        for _ in 0..RETURN_MAX_ITERATIONS {
            let (value, slope) = residual(delta);
            if value.abs() <= RETURN_TOLERANCE * scale {
                break;
            }
            if value > 0.0 {
                lo = delta;
            } else {
                hi = delta;
            }
            let newton = delta - value / slope;
            delta = if slope < 0.0 && newton > lo && newton < hi {
                newton
            } else {
                0.5 * (lo + hi)
            };
            if hi - lo <= f64::EPSILON * hi {
                break;
            }
        }
        delta
    }
}

impl ConstitutiveModel for VariationalJ2 {
    fn update(
        &self,
        f: &DMat3,
        dt: f64,
        plastic: &mut PlasticState,
    ) -> Result<ConstitutiveResponse, ConstitutiveFailure> {
        let props = &self.properties;
        let (k, g) = (props.elastic.bulk_modulus, props.elastic.shear_modulus);

        let j = f.determinant();
        if !(j > 0.0 && j.is_finite()) {
            return Err(ConstitutiveFailure { jacobian: j });
        }
        let fp_inv = inverse_full_pivot(&plastic.deformation_gradient)
            .ok_or(ConstitutiveFailure { jacobian: j })?;

        // Trial elastic state with frozen plastic flow.
        let fe_trial = *f * fp_inv;
        let strain = log_spd(&(fe_trial * fe_trial.transpose()))
            .ok_or(ConstitutiveFailure { jacobian: j })?
            * 0.5;
        let theta = trace(&strain);
        let dev_trial = deviator(&strain);
        let trial_stress = (6.0 * g * g * contract(&dev_trial, &dev_trial)).sqrt();

        let ep = plastic.equivalent_strain;
        let mut dev_strain = dev_trial;
        let mut shear_modulus = g;
        if trial_stress > props.flow_stress(ep) {
            let delta = self.plastic_increment(trial_stress, ep, dt);
            // Flow direction with N:N = 3/2.
            let direction = dev_trial * (3.0 * g / trial_stress);
            dev_strain = dev_trial - direction * delta;
            shear_modulus = g * (1.0 - 3.0 * g * delta / trial_stress);

            let fe = exp_symmetric(&(direction * -delta)) * fe_trial;
            let fe_inv = inverse_full_pivot(&fe).ok_or(ConstitutiveFailure { jacobian: j })?;
            plastic.deformation_gradient = fe_inv * *f;
            plastic.equivalent_strain = ep + delta;
        }

        // Kirchhoff stress τ = K θ I + 2G dev εe, Cauchy σ = τ / J.
        let kirchhoff = DMat3::IDENTITY * (k * theta) + dev_strain * (2.0 * g);
        let energy_density = 0.5 * k * theta * theta
            + g * contract(&dev_strain, &dev_strain)
            + props.stored_plastic_energy(plastic.equivalent_strain);

        Ok(ConstitutiveResponse {
            stress: kirchhoff * (1.0 / j),
            bulk_modulus: k,
            shear_modulus,
            energy_density,
        })
    }

    fn name(&self) -> &str {
        "Variational J2"
    }

    fn is_plastic(&self) -> bool {
        true
    }
}
