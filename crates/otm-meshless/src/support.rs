//! Support builder: one-shot construction of the point↔node relation.
//!
//! Two entry points:
//! - [`bootstrap_from_mesh`] turns every element of a mesh into one
//!   point supported by the element's nodes.
//! - [`build_support_relation`] installs the result of a neighbor
//!   search (general meshfree case).

use otm_mesh::ElementMesh;
use otm_types::{ElementId, OtmError, OtmResult, PointId};
use tracing::debug;

use crate::adjacency::Adjacency;
use crate::search::SupportSearch;
use crate::state::{ProblemSize, SimulationState};

/// Initializes nodes, points and support from element connectivity.
///
/// Resizes the state to the mesh, copies node positions, places one
/// point at each element centroid with the element's material, and
/// sets the point volume from the element's corner tetrahedron when it
/// has at least four nodes. Shape values start uniform (`1 / npe`) and
/// gradients at zero until the shape-function solver runs.
pub fn bootstrap_from_mesh(state: &mut SimulationState, mesh: &ElementMesh) -> OtmResult<()> {
    mesh.validate()?;

    let elements = mesh.element_count();
    let volumes = (0..elements)
        .map(|e| {
            let e = ElementId(e as u32);
            match mesh.tet_volume(e) {
                Some(v) if v > 0.0 => Ok(Some(v)),
                Some(v) => Err(OtmError::InvalidMesh(format!(
                    "element {} has non-positive corner volume {v:e}",
                    e.0
                ))),
                None => Ok(None),
            }
        })
        .collect::<OtmResult<Vec<_>>>()?;

    let lists: Vec<_> = (0..elements)
        .map(|e| mesh.element_nodes(ElementId(e as u32)).collect())
        .collect();
    let adjacency = Adjacency::from_support_lists(mesh.node_count(), &lists)?;

    let materials = mesh
        .material_ids
        .iter()
        .map(|m| m.index() + 1)
        .max()
        .unwrap_or(0)
        .max(state.material_count());
    state.resize(ProblemSize {
        nodes: mesh.node_count(),
        points: elements,
        elements,
        materials,
    });

    state.nodes.position.copy_from_slice(&mesh.positions);
    for (e, volume) in volumes.into_iter().enumerate() {
        let id = ElementId(e as u32);
        state.points.position[e] = mesh.centroid(id);
        state.points.material[e] = mesh.material_ids[e];
        if let Some(v) = volume {
            state.points.volume[e] = v;
        }
    }
    state.adjacency = adjacency;

    debug!(
        nodes = mesh.node_count(),
        points = elements,
        nodes_per_element = mesh.nodes_per_element,
        "bootstrapped support from mesh"
    );
    Ok(())
}

/// Runs `search` and installs the resulting relation.
///
/// The state is untouched on failure. Fails with `SizeMismatch` if the
/// search returns the wrong number of lists, `DegenerateSupport` if a
/// point has fewer than the search's minimum node count, and
/// `AdjacencyInconsistency` on invalid node ids.
pub fn build_support_relation<S>(state: &mut SimulationState, search: &S) -> OtmResult<()>
where
    S: SupportSearch + ?Sized,
{
    let lists = search.find_support(state)?;
    if lists.len() != state.points.len() {
        return Err(OtmError::SizeMismatch(format!(
            "search `{}` returned {} supports for {} points",
            search.name(),
            lists.len(),
            state.points.len()
        )));
    }
    let required = search.min_support_nodes();
    if let Some((p, list)) = lists.iter().enumerate().find(|(_, l)| l.len() < required) {
        return Err(OtmError::DegenerateSupport {
            point: PointId(p as u32),
            found: list.len(),
            required,
        });
    }

    let adjacency = Adjacency::from_support_lists(state.nodes.len(), &lists)?;
    debug!(
        search = search.name(),
        points = adjacency.point_count(),
        entries = adjacency.support().entry_count(),
        "installed support relation"
    );
    state.adjacency = adjacency;
    Ok(())
}
