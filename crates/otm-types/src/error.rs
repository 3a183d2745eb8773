//! Error types for the OTM meshfree core.
//!
//! All crates return `OtmResult<T>` from fallible operations.
//! Physical failures (Newton divergence, inverted points) are
//! recoverable: the step driver can shrink the time step and retry.

use thiserror::Error;

use crate::ids::PointId;

/// Unified error type for the OTM meshfree core.
#[derive(Debug, Error)]
pub enum OtmError {
    /// The max-ent Newton solve did not reach tolerance within the iteration cap.
    #[error("Max-ent Newton solve for point {} did not converge after {iterations} iterations (relative step: {residual:.2e})", .point.0)]
    NewtonDivergence {
        point: PointId,
        iterations: u32,
        residual: f64,
    },

    /// A deformation increment inverted or collapsed a point.
    #[error("Non-positive incremental Jacobian {jacobian:.6e} at point {}", .point.0)]
    NonPositiveJacobian { point: PointId, jacobian: f64 },

    /// A point has too few support nodes for a well-posed shape function.
    #[error("Point {} has {found} support nodes, at least {required} required", .point.0)]
    DegenerateSupport {
        point: PointId,
        found: usize,
        required: usize,
    },

    /// Material parameters are missing or inconsistent.
    #[error("Invalid material: {0}")]
    InvalidMaterial(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Element connectivity is malformed.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Per-entity arrays disagree with the problem size.
    #[error("Size mismatch: {0}")]
    SizeMismatch(String),

    /// Support and influence relations disagree (search or builder defect).
    #[error("Adjacency inconsistency: {0}")]
    AdjacencyInconsistency(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl OtmError {
    /// Returns true for per-step physical failures the driver can
    /// recover from by reducing the time step or rejecting the step.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NewtonDivergence { .. } | Self::NonPositiveJacobian { .. }
        )
    }

    /// The point the failure is attributed to, if any.
    pub fn point(&self) -> Option<PointId> {
        match self {
            Self::NewtonDivergence { point, .. }
            | Self::NonPositiveJacobian { point, .. }
            | Self::DegenerateSupport { point, .. } => Some(*point),
            _ => None,
        }
    }
}

/// Convenience alias for `Result<T, OtmError>`.
pub type OtmResult<T> = Result<T, OtmError>;
