//! # otm-material
//!
//! Constitutive model abstraction and material sets.
//!
//! ## Design
//!
//! The [`ConstitutiveModel`] trait maps a point's deformation history
//! (cumulative deformation gradient, time step, plastic internal state)
//! to Cauchy stress, tangent moduli, and stored energy density. Concrete
//! laws are wrapped in the tagged [`MaterialModel`] so that the
//! dispatcher selects a branch once per material and applies it
//! uniformly to every point.
//!
//! The [`MaterialSet`] maps material ids to models; named presets
//! cover common engineering metals and a rubber-like solid.

pub mod database;
pub mod j2;
pub mod model;
pub mod neo_hookean;
pub mod properties;
pub mod traits;

pub use database::MaterialSet;
pub use j2::VariationalJ2;
pub use model::MaterialModel;
pub use neo_hookean::NeoHookean;
pub use properties::{ElasticProperties, J2Properties};
pub use traits::{ConstitutiveFailure, ConstitutiveModel, ConstitutiveResponse, PlasticState};
