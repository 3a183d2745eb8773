//! # otm-mesh
//!
//! Element-connectivity meshes that seed the meshfree discretization.
//!
//! ## Key Types
//!
//! - [`ElementMesh`]: Node positions plus fixed-size element connectivity.
//!   Each element later becomes one material point at its centroid.
//! - Procedural generators for tetrahedral test meshes.

pub mod generators;
pub mod mesh;

pub use mesh::ElementMesh;
