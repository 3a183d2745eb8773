//! Local maximum-entropy shape functions.
//!
//! For a point `x` with support nodes `x_n` and locality `β = γ / h²`,
//! the shape functions maximize entropy minus the locality penalty
//! subject to partition of unity and linear reproduction. The dual
//! problem is an unconstrained minimization over a Lagrange multiplier
//! `μ ∈ ℝ³`, solved by Newton's method from `μ = 0`:
//!
//! ```text
//! f_n(μ) = exp(−μ·r_n − β‖r_n‖²),   r_n = x_n − x
//! R(μ)   = Σ f_n r_n
//! J(μ)   = −Σ f_n r_n ⊗ r_n
//! μ     ← μ − J⁻¹ R
//! ```
//!
//! At convergence `N_n = f_n / Σ f` and `∇N_n = −N_n J_N⁻¹ r_n` with
//! `J_N = −Σ N r⊗r`. The 3×3 systems use full pivoting so that
//! collinear or coplanar supports (rank-deficient `J`) are solved on
//! the range of `J`.

use otm_exec::ExecutionBackend;
use otm_math::pivot::solve_full_pivot;
use otm_math::tensor::outer;
use otm_math::{DMat3, DVec3};
use otm_types::{OtmError, OtmResult, PointId};
use tracing::{debug, warn};

use crate::config::MaxEntConfig;
use crate::state::SimulationState;

/// Shape functions of one point.
#[derive(Debug, Clone, PartialEq)]
pub struct MaxEntSolution {
    /// Shape values, aligned with the support nodes.
    pub values: Vec<f64>,
    /// Shape gradients with respect to the point position.
    pub gradients: Vec<DVec3>,
    /// Converged Lagrange multiplier.
    pub multiplier: DVec3,
    /// Newton steps taken.
    pub iterations: u32,
    /// True if accepted at the relaxed tolerance after the iteration cap.
    pub relaxed: bool,
}

/// Aggregate statistics of one shape-function rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShapeStats {
    pub points: usize,
    pub support_entries: usize,
    pub max_iterations: u32,
    pub relaxed_points: usize,
}

/// Solves the max-ent problem for a single point.
///
/// `nodes` are the support node positions. Fails with
/// `DegenerateSupport` for an empty support, `InvalidConfig` for a
/// non-positive length scale and `NewtonDivergence` if the iteration
/// does not converge.
pub fn solve_point(
    point: PointId,
    x: DVec3,
    h: f64,
    nodes: &[DVec3],
    config: &MaxEntConfig,
) -> OtmResult<MaxEntSolution> {
    if nodes.is_empty() {
        return Err(OtmError::DegenerateSupport {
            point,
            found: 0,
            required: 1,
        });
    }
    if !(h > 0.0 && h.is_finite()) {
        return Err(OtmError::InvalidConfig(format!(
            "point {} has length scale {h}, expected a positive value",
            point.0
        )));
    }
    let beta = config.gamma / (h * h);
    let offsets: Vec<DVec3> = nodes.iter().map(|&xn| xn - x).collect();
    // Floor of the convergence scale; μ has units of 1/length.
    let scale_floor = 1.0 / h;

    let mut mu = DVec3::ZERO;
    let mut iterations = 0;
    let mut relative_step = f64::INFINITY;
    while iterations < config.max_iterations {
        let weights = weights(&offsets, mu, beta);
        let (residual, jacobian) = residual_and_jacobian(&offsets, &weights);
        let step = solve_full_pivot(&jacobian, -residual);
        mu += step;
        iterations += 1;

        if !mu.is_finite() {
            return Err(OtmError::NewtonDivergence {
                point,
                iterations,
                residual: f64::INFINITY,
            });
        }
        relative_step = step.length() / mu.length().max(scale_floor);
        if relative_step <= config.tolerance {
            break;
        }
    }

    let relaxed = relative_step > config.tolerance;
    if relaxed {
        if relative_step > config.acceptable_tolerance {
            return Err(OtmError::NewtonDivergence {
                point,
                iterations,
                residual: relative_step,
            });
        }
        warn!(
            point = point.0,
            iterations,
            relative_step,
            "max-ent Newton accepted at relaxed tolerance"
        );
    }

    let mut values = weights(&offsets, mu, beta);
    let partition: f64 = values.iter().sum();
    if !(partition > 0.0 && partition.is_finite()) {
        return Err(OtmError::NewtonDivergence {
            point,
            iterations,
            residual: relative_step,
        });
    }
    values.iter_mut().for_each(|v| *v /= partition);

    let (_, normalized_jacobian) = residual_and_jacobian(&offsets, &values);
    let gradients = offsets
        .iter()
        .zip(&values)
        .map(|(&r, &n)| -n * solve_full_pivot(&normalized_jacobian, r))
        .collect();

    Ok(MaxEntSolution {
        values,
        gradients,
        multiplier: mu,
        iterations,
        relaxed,
    })
}

/// Unnormalized weights `exp(−μ·r − β‖r‖²)`, shifted by the largest
/// exponent. The shift scales R and J alike and cancels in the step.
fn weights(offsets: &[DVec3], mu: DVec3, beta: f64) -> Vec<f64> {
    let exponents: Vec<f64> = offsets
        .iter()
        .map(|r| -mu.dot(*r) - beta * r.length_squared())
        .collect();
    let shift = exponents.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    exponents.into_iter().map(|a| (a - shift).exp()).collect()
}

fn residual_and_jacobian(offsets: &[DVec3], weights: &[f64]) -> (DVec3, DMat3) {
    offsets
        .iter()
        .zip(weights)
        .fold((DVec3::ZERO, DMat3::ZERO), |(r, j), (&offset, &w)| {
            (r + offset * w, j - outer(offset, offset) * w)
        })
}

/// Recomputes shape values and gradients of every point.
///
/// Every point is solved before anything is written, so a failure
/// leaves all shape data unchanged. The reported failure is the one
/// with the lowest point id.
pub fn update_shape_functions<B>(
    state: &mut SimulationState,
    config: &MaxEntConfig,
    backend: &B,
) -> OtmResult<ShapeStats>
where
    B: ExecutionBackend + ?Sized,
{
    state.check_sizes()?;
    let points = &state.points;
    let support = state.adjacency.support();
    let node_positions = &state.nodes.position;

    let results = backend.map(points.len(), |p| {
        let id = PointId(p as u32);
        let nodes: Vec<DVec3> = support
            .nodes_of(id)
            .iter()
            .map(|n| node_positions[n.index()])
            .collect();
        solve_point(id, points.position[p], points.length_scale[p], &nodes, config)
    });

    let failures = results.iter().filter(|r| r.is_err()).count();
    let mut solutions = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(solution) => solutions.push(solution),
            Err(e) => {
                warn!(failures, "shape-function update rejected: {e}");
                return Err(e);
            }
        }
    }

    let mut stats = ShapeStats {
        points: solutions.len(),
        support_entries: support.entry_count(),
        ..Default::default()
    };
    let support = state.adjacency.support_mut();
    for (p, solution) in solutions.into_iter().enumerate() {
        let range = support.range(PointId(p as u32));
        let (values, gradients) = support.shape_data_mut();
        values[range.clone()].copy_from_slice(&solution.values);
        gradients[range].copy_from_slice(&solution.gradients);
        stats.max_iterations = stats.max_iterations.max(solution.iterations);
        stats.relaxed_points += usize::from(solution.relaxed);
    }
    debug!(
        points = stats.points,
        max_iterations = stats.max_iterations,
        relaxed = stats.relaxed_points,
        "updated max-ent shape functions"
    );
    Ok(stats)
}
