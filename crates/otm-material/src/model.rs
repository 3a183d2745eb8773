//! Tagged material model.
//!
//! The dispatcher matches on the variant once per material and then
//! applies the selected law to every point of that material.

use otm_math::DMat3;
use otm_types::OtmResult;

use crate::j2::VariationalJ2;
use crate::neo_hookean::NeoHookean;
use crate::properties::{ElasticProperties, J2Properties};
use crate::traits::{ConstitutiveFailure, ConstitutiveModel, ConstitutiveResponse, PlasticState};

/// One of the supported constitutive laws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialModel {
    NeoHookean(NeoHookean),
    VariationalJ2(VariationalJ2),
}

impl MaterialModel {
    /// Validated neo-Hookean model.
    pub fn neo_hookean(properties: ElasticProperties) -> OtmResult<Self> {
        properties.validate()?;
        Ok(Self::NeoHookean(NeoHookean::new(properties)))
    }

    /// Validated J2 plasticity model.
    pub fn variational_j2(properties: J2Properties) -> OtmResult<Self> {
        properties.validate()?;
        Ok(Self::VariationalJ2(VariationalJ2::new(properties)))
    }

    /// Small-strain elastic moduli of the model.
    pub fn elastic(&self) -> ElasticProperties {
        match self {
            Self::NeoHookean(m) => m.properties,
            Self::VariationalJ2(m) => m.properties.elastic,
        }
    }

    /// Strategy object behind the tag.
    pub fn as_model(&self) -> &dyn ConstitutiveModel {
        match self {
            Self::NeoHookean(m) => m,
            Self::VariationalJ2(m) => m,
        }
    }
}

impl ConstitutiveModel for MaterialModel {
    fn update(
        &self,
        f: &DMat3,
        dt: f64,
        plastic: &mut PlasticState,
    ) -> Result<ConstitutiveResponse, ConstitutiveFailure> {
        match self {
            Self::NeoHookean(m) => m.update(f, dt, plastic),
            Self::VariationalJ2(m) => m.update(f, dt, plastic),
        }
    }

    fn name(&self) -> &str {
        self.as_model().name()
    }

    fn is_plastic(&self) -> bool {
        self.as_model().is_plastic()
    }
}
