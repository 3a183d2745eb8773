//! # otm-exec
//!
//! Data-parallel execution abstraction for the OTM meshfree kernels.
//!
//! Provides an [`ExecutionBackend`] trait with two implementations:
//! - [`SerialBackend`]: Reference sequential implementation (always available)
//! - [`RayonBackend`]: Work-stealing thread pool via `rayon`
//!
//! Kernels are generic over the backend, so the same kernel code runs
//! sequentially or on the thread pool without changes.

pub mod backend;

pub use backend::{ExecutionBackend, RayonBackend, SerialBackend};
