//! Material parameters.
//!
//! Parameters are plain serde records so they can be read straight
//! from an input deck and validated before any model is built.

use otm_types::{OtmError, OtmResult};
use serde::{Deserialize, Serialize};

/// Isotropic elastic moduli.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticProperties {
    /// Bulk modulus K.
    pub bulk_modulus: f64,
    /// Shear modulus G.
    pub shear_modulus: f64,
}

impl ElasticProperties {
    /// Builds moduli from Young's modulus and Poisson's ratio.
    pub fn from_young_poisson(young: f64, poisson: f64) -> Self {
        Self {
            bulk_modulus: young / (3.0 * (1.0 - 2.0 * poisson)),
            shear_modulus: young / (2.0 * (1.0 + poisson)),
        }
    }

    /// Rejects non-positive or non-finite moduli.
    pub fn validate(&self) -> OtmResult<()> {
        positive("bulk_modulus", self.bulk_modulus)?;
        positive("shear_modulus", self.shear_modulus)
    }
}

/// Parameters of rate-dependent J2 plasticity with power-law hardening.
///
/// | Symbol | Field |
/// |---|---|
/// | K, G | `elastic` |
/// | Y0 | `yield_stress` |
/// | n | `hardening_exponent` |
/// | ε0 | `reference_plastic_strain` |
/// | Svis0 | `viscous_stress` |
/// | m | `rate_sensitivity` |
/// | ε̇0 | `reference_strain_rate` |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct J2Properties {
    pub elastic: ElasticProperties,
    pub yield_stress: f64,
    pub hardening_exponent: f64,
    pub reference_plastic_strain: f64,
    /// Zero disables rate sensitivity.
    pub viscous_stress: f64,
    pub rate_sensitivity: f64,
    pub reference_strain_rate: f64,
}

impl J2Properties {
    /// Static flow stress `Y0 (1 + ep/ε0)^(1/n)`.
    pub fn flow_stress(&self, plastic_strain: f64) -> f64 {
        self.yield_stress
            * (1.0 + plastic_strain / self.reference_plastic_strain).powf(1.0 / self.hardening_exponent)
    }

    /// Derivative of [`flow_stress`](Self::flow_stress) with respect to ep.
    pub fn hardening_modulus(&self, plastic_strain: f64) -> f64 {
        let n = self.hardening_exponent;
        let ratio = 1.0 + plastic_strain / self.reference_plastic_strain;
        self.yield_stress / (n * self.reference_plastic_strain) * ratio.powf(1.0 / n - 1.0)
    }

    /// Viscous overstress `Svis0 (rate/ε̇0)^(1/m)` and its derivative
    /// with respect to the rate.
    pub fn viscous_overstress(&self, rate: f64) -> (f64, f64) {
        if self.viscous_stress <= 0.0 || rate <= 0.0 {
            return (0.0, 0.0);
        }
        let m = self.rate_sensitivity;
        let ratio = rate / self.reference_strain_rate;
        let stress = self.viscous_stress * ratio.powf(1.0 / m);
        (stress, stress / (m * rate))
    }

    /// Energy stored by hardening, the integral of the static flow
    /// stress from 0 to `plastic_strain`.
    pub fn stored_plastic_energy(&self, plastic_strain: f64) -> f64 {
        let n = self.hardening_exponent;
        let eps0 = self.reference_plastic_strain;
        let exponent = (n + 1.0) / n;
        self.yield_stress * eps0 * n / (n + 1.0)
            * ((1.0 + plastic_strain / eps0).powf(exponent) - 1.0)
    }

    /// Rejects non-physical parameters.
    pub fn validate(&self) -> OtmResult<()> {
        self.elastic.validate()?;
        positive("yield_stress", self.yield_stress)?;
        positive("hardening_exponent", self.hardening_exponent)?;
        positive("reference_plastic_strain", self.reference_plastic_strain)?;
        if !(self.viscous_stress >= 0.0 && self.viscous_stress.is_finite()) {
            return Err(OtmError::InvalidMaterial(format!(
                "viscous_stress must be non-negative, got {}",
                self.viscous_stress
            )));
        }
        if self.viscous_stress > 0.0 {
            positive("rate_sensitivity", self.rate_sensitivity)?;
            positive("reference_strain_rate", self.reference_strain_rate)?;
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> OtmResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(OtmError::InvalidMaterial(format!(
            "{name} must be positive, got {value}"
        )))
    }
}
