//! Updated-Lagrangian kinematics.
//!
//! Given nodal displacements `u_n` since the last update, each point's
//! incremental deformation gradient is
//!
//! ```text
//! F_incr = I + Σ_n u_n ⊗ ∇N_n
//! ```
//!
//! and the point is pushed forward: `x ← x + Σ_n N_n u_n`,
//! `∇N ← F_incr⁻ᵀ ∇N`, `F ← F_incr F`, `V ← J V`, `ρ ← ρ / J` with
//! `J = det F_incr`. Mass `ρV` is unchanged.

use otm_exec::ExecutionBackend;
use otm_math::pivot::inverse_full_pivot;
use otm_math::tensor::outer;
use otm_math::{DMat3, DVec3};
use otm_types::{OtmError, OtmResult, PointId};
use tracing::{debug, warn};

use crate::state::SimulationState;

/// Incremental kinematics of one point.
#[derive(Debug, Clone, Copy)]
struct Increment {
    deformation: DMat3,
    displacement: DVec3,
    jacobian: f64,
    /// `F_incr⁻ᵀ`, used to push gradients forward.
    inverse_transpose: DMat3,
}

/// Incremental deformation gradient `I + Σ u ⊗ ∇N` of point `p`.
pub fn incremental_deformation(state: &SimulationState, p: PointId) -> DMat3 {
    let support = state.adjacency.support();
    support
        .nodes_of(p)
        .iter()
        .zip(support.gradients_of(p))
        .fold(DMat3::IDENTITY, |f, (n, &grad)| {
            f + outer(state.nodes.displacement[n.index()], grad)
        })
}

/// Interpolated displacement `Σ N u` of point `p`.
pub fn interpolated_displacement(state: &SimulationState, p: PointId) -> DVec3 {
    let support = state.adjacency.support();
    support
        .nodes_of(p)
        .iter()
        .zip(support.values_of(p))
        .map(|(n, &value)| state.nodes.displacement[n.index()] * value)
        .sum()
}

/// Applies the nodal displacements to every point.
///
/// All increments are computed first. If any point has a non-positive
/// or non-finite incremental Jacobian, nothing is written and the
/// failure of the lowest point id is returned.
pub fn update_kinematics<B>(state: &mut SimulationState, backend: &B) -> OtmResult<()>
where
    B: ExecutionBackend + ?Sized,
{
    state.check_sizes()?;
    let shared: &SimulationState = state;
    let increments = backend.map(shared.points.len(), |p| {
        let id = PointId(p as u32);
        let deformation = incremental_deformation(shared, id);
        let jacobian = deformation.determinant();
        if !(jacobian > 0.0 && jacobian.is_finite()) {
            return Err(jacobian);
        }
        inverse_full_pivot(&deformation)
            .map(|inverse| Increment {
                deformation,
                displacement: interpolated_displacement(shared, id),
                jacobian,
                inverse_transpose: inverse.transpose(),
            })
            .ok_or(jacobian)
    });

    let failures = increments.iter().filter(|i| i.is_err()).count();
    if let Some((p, jacobian)) = increments
        .iter()
        .enumerate()
        .find_map(|(p, i)| i.err().map(|j| (p, j)))
    {
        warn!(failures, point = p, jacobian, "kinematic update rejected");
        return Err(OtmError::NonPositiveJacobian {
            point: PointId(p as u32),
            jacobian,
        });
    }
    let increments: Vec<Increment> = increments.into_iter().flatten().collect();

    let SimulationState {
        points, adjacency, ..
    } = state;
    let (owners, gradients) = adjacency.support_mut().owners_and_gradients_mut();
    backend.for_each_mut(gradients, |e, grad: &mut DVec3| {
        *grad = increments[owners[e].index()].inverse_transpose * *grad;
    });
    backend.for_each_mut(&mut points.position, |p, x| *x += increments[p].displacement);
    backend.for_each_mut(&mut points.deformation_gradient, |p, f| {
        *f = increments[p].deformation * *f;
    });
    backend.for_each_mut(&mut points.volume, |p, v| *v *= increments[p].jacobian);
    backend.for_each_mut(&mut points.density, |p, rho| *rho /= increments[p].jacobian);

    debug!(points = increments.len(), "updated point kinematics");
    Ok(())
}

/// Resets F and the plastic state of every point to the undeformed state.
pub fn reset_deformation_gradients(state: &mut SimulationState) {
    let points = &mut state.points;
    points.deformation_gradient.fill(DMat3::IDENTITY);
    points.plastic_deformation_gradient.fill(DMat3::IDENTITY);
    points.equivalent_plastic_strain.fill(0.0);
}

/// Sets the same displacement on every node.
pub fn set_uniform_displacement(state: &mut SimulationState, displacement: DVec3) {
    state.nodes.displacement.fill(displacement);
}
