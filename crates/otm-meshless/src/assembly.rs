//! Nodal force, mass and momentum assembly.
//!
//! Every kernel is a gather over the influence relation: each node sums
//! the contributions of the points it influences, so each node's
//! accumulator is owned by exactly one task.
//!
//! ```text
//! f_n = Σ_p −(σ_p ∇N_pn) V_p + Σ_p N_pn ρ_p V_p b_p
//! m_n = Σ_p N_pn ρ_p V_p
//! p_n = m_n v_n
//! ```

use otm_exec::ExecutionBackend;
use otm_math::DVec3;
use otm_types::{NodeId, OtmResult};

use crate::state::SimulationState;

/// Assembles nodal forces in three dispatches: zero, internal, external.
pub fn update_nodal_force<B>(state: &mut SimulationState, backend: &B) -> OtmResult<()>
where
    B: ExecutionBackend + ?Sized,
{
    state.check_sizes()?;
    let SimulationState {
        nodes,
        points,
        adjacency,
        ..
    } = state;
    let points = &*points;
    let support = adjacency.support();
    let influence = adjacency.influence();

    backend.fill(&mut nodes.force, DVec3::ZERO);

    backend.for_each_mut(&mut nodes.force, |n, force| {
        let n = NodeId(n as u32);
        for (&p, &entry) in influence.points_of(n).iter().zip(influence.support_entries_of(n)) {
            let p = p.index();
            *force -= points.stress[p] * support.gradients()[entry] * points.volume[p];
        }
    });

    backend.for_each_mut(&mut nodes.force, |n, force| {
        let n = NodeId(n as u32);
        for (&p, &entry) in influence.points_of(n).iter().zip(influence.support_entries_of(n)) {
            let p = p.index();
            let mass = support.values()[entry] * points.density[p] * points.volume[p];
            *force += points.body_acceleration[p] * mass;
        }
    });
    Ok(())
}

/// Recomputes the lumped nodal mass `m_n = Σ N ρ V`.
pub fn lump_nodal_mass<B>(state: &mut SimulationState, backend: &B) -> OtmResult<()>
where
    B: ExecutionBackend + ?Sized,
{
    state.check_sizes()?;
    let SimulationState {
        nodes,
        points,
        adjacency,
        ..
    } = state;
    let points = &*points;
    let support = adjacency.support();
    let influence = adjacency.influence();

    backend.fill(&mut nodes.mass, 0.0);
    backend.for_each_mut(&mut nodes.mass, |n, mass| {
        let n = NodeId(n as u32);
        for (&p, &entry) in influence.points_of(n).iter().zip(influence.support_entries_of(n)) {
            let p = p.index();
            *mass += support.values()[entry] * points.density[p] * points.volume[p];
        }
    });
    Ok(())
}

/// Sets nodal momentum `p = m v` from the lumped mass.
pub fn update_nodal_momentum<B>(state: &mut SimulationState, backend: &B) -> OtmResult<()>
where
    B: ExecutionBackend + ?Sized,
{
    state.check_sizes()?;
    let nodes = &mut state.nodes;
    let (mass, velocity) = (&nodes.mass, &nodes.velocity);
    backend.for_each_mut(&mut nodes.momentum, |n, momentum| {
        *momentum = velocity[n] * mass[n];
    });
    Ok(())
}

/// Σ m_n over nodes.
pub fn total_nodal_mass(state: &SimulationState) -> f64 {
    state.nodes.mass.iter().sum()
}

/// Σ ρ V over points. Equals [`total_nodal_mass`] after lumping when
/// every point's shape values sum to one.
pub fn total_point_mass(state: &SimulationState) -> f64 {
    state
        .points
        .density
        .iter()
        .zip(&state.points.volume)
        .map(|(rho, v)| rho * v)
        .sum()
}

/// Σ f_n over nodes.
pub fn net_force(state: &SimulationState) -> DVec3 {
    state.nodes.force.iter().copied().sum()
}
