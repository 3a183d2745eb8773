//! Shape-function and neighbor-search configuration.

use otm_types::constants::{
    DEFAULT_MAXENT_GAMMA, DEFAULT_MAXENT_MAX_ITERATIONS, MAXENT_TOLERANCE_FACTOR,
    MIN_SUPPORT_NODES,
};
use otm_types::{OtmError, OtmResult};
use serde::{Deserialize, Serialize};

/// Max-ent Newton solve parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaxEntConfig {
    /// Spread factor γ of β = γ / h².
    pub gamma: f64,

    /// Newton iteration cap per point.
    pub max_iterations: u32,

    /// Relative step size that counts as converged.
    pub tolerance: f64,

    /// Relative step size still accepted, with a warning, when the
    /// iteration cap is reached. Zero (the default) disables the fallback.
    pub acceptable_tolerance: f64,
}

impl Default for MaxEntConfig {
    fn default() -> Self {
        Self {
            gamma: DEFAULT_MAXENT_GAMMA,
            max_iterations: DEFAULT_MAXENT_MAX_ITERATIONS,
            tolerance: MAXENT_TOLERANCE_FACTOR * f64::EPSILON,
            acceptable_tolerance: 0.0,
        }
    }
}

impl MaxEntConfig {
    /// Accepts points that stop at the iteration cap with a relative
    /// step below `acceptable_tolerance`.
    pub fn relaxed(acceptable_tolerance: f64) -> Self {
        Self {
            acceptable_tolerance,
            ..Default::default()
        }
    }

    /// Wider, smoother shape functions (smaller γ).
    pub fn smooth() -> Self {
        Self {
            gamma: 0.8,
            ..Default::default()
        }
    }

    /// Rejects non-positive γ, a zero iteration cap, or negative tolerances.
    pub fn validate(&self) -> OtmResult<()> {
        if !(self.gamma > 0.0 && self.gamma.is_finite()) {
            return Err(OtmError::InvalidConfig(format!(
                "maxent.gamma must be positive, got {}",
                self.gamma
            )));
        }
        if self.max_iterations == 0 {
            return Err(OtmError::InvalidConfig(
                "maxent.max_iterations must be at least 1".into(),
            ));
        }
        if !(self.tolerance > 0.0) || !(self.acceptable_tolerance >= 0.0) {
            return Err(OtmError::InvalidConfig(
                "maxent tolerances must be non-negative (tolerance > 0)".into(),
            ));
        }
        Ok(())
    }
}

/// Uniform-grid neighbor search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Support radius as a multiple of the point's length scale `h`.
    pub radius_factor: f64,

    /// Minimum support size; smaller supports are degenerate.
    pub min_support_nodes: usize,

    /// Keep only the nearest nodes when set.
    pub max_support_nodes: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            radius_factor: 2.0,
            min_support_nodes: MIN_SUPPORT_NODES,
            max_support_nodes: None,
        }
    }
}

impl SearchConfig {
    /// Rejects a non-positive radius or an empty node window.
    pub fn validate(&self) -> OtmResult<()> {
        if !(self.radius_factor > 0.0 && self.radius_factor.is_finite()) {
            return Err(OtmError::InvalidConfig(format!(
                "search.radius_factor must be positive, got {}",
                self.radius_factor
            )));
        }
        if self.min_support_nodes == 0 {
            return Err(OtmError::InvalidConfig(
                "search.min_support_nodes must be at least 1".into(),
            ));
        }
        if let Some(max) = self.max_support_nodes {
            if max < self.min_support_nodes {
                return Err(OtmError::InvalidConfig(format!(
                    "search.max_support_nodes ({max}) below min_support_nodes ({})",
                    self.min_support_nodes
                )));
            }
        }
        Ok(())
    }
}
