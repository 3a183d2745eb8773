//! Numeric constants and solver defaults.

/// Non-dimensional spread factor γ of the max-ent locality parameter β = γ / h².
pub const DEFAULT_MAXENT_GAMMA: f64 = 1.5;

/// Newton convergence tolerance as a multiple of machine epsilon.
pub const MAXENT_TOLERANCE_FACTOR: f64 = 1024.0;

/// Iteration cap of the max-ent Newton solve.
pub const DEFAULT_MAXENT_MAX_ITERATIONS: u32 = 16;

/// Minimum number of support nodes for a non-degenerate 3D neighborhood.
pub const MIN_SUPPORT_NODES: usize = 4;

/// Relative pivot magnitude below which a full-pivot elimination
/// treats the remaining block as singular.
pub const PIVOT_RELATIVE_THRESHOLD: f64 = 1.0e-14;
