//! # otm-types
//!
//! Shared types, identifiers, error types, and numeric constants
//! for the OTM meshfree discretization core.
//!
//! This crate has zero domain logic; it defines the vocabulary
//! that all other OTM crates share.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{OtmError, OtmResult};
pub use ids::{ElementId, MaterialId, NodeId, PointId};
