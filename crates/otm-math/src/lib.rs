//! # otm-math
//!
//! Linear algebra primitives for the OTM meshfree core.
//!
//! Provides:
//! - Re-exports of `glam` double-precision types (`DVec3`, `DMat3`)
//! - Tensor helpers (outer product, deviator, contraction)
//! - Full-pivot 3×3 elimination, tolerant of rank-deficient systems
//! - Symmetric eigen-decomposition with tensor logarithm/exponential
//! - Offset tables for compressed variable-length relations

pub mod decomposition;
pub mod pivot;
pub mod sparse;
pub mod tensor;

// Re-export glam types as the canonical math types for OTM.
pub use glam::{DMat3, DVec3};
