//! Integration tests for otm-meshless kernels.

use otm_exec::{RayonBackend, SerialBackend};
use otm_material::{ElasticProperties, MaterialModel, MaterialSet};
use otm_math::tensor::{frobenius_norm, outer};
use otm_math::{DMat3, DVec3};
use otm_mesh::generators::{regular_tetrahedron, tet_block};
use otm_mesh::ElementMesh;
use otm_meshless::assembly::{
    lump_nodal_mass, net_force, total_nodal_mass, total_point_mass, update_nodal_force,
    update_nodal_momentum,
};
use otm_meshless::constitutive::{update_all_materials, update_material_state};
use otm_meshless::kinematics::{
    incremental_deformation, reset_deformation_gradients, set_uniform_displacement,
    update_kinematics,
};
use otm_meshless::shape::{solve_point, update_shape_functions};
use otm_meshless::support::{bootstrap_from_mesh, build_support_relation};
use otm_meshless::{
    Adjacency, GridSearch, MaxEntConfig, ProblemSize, SearchConfig, SimulationState,
};
use otm_types::{MaterialId, NodeId, OtmError, PointId};

fn nodes(ids: &[u32]) -> Vec<NodeId> {
    ids.iter().map(|&n| NodeId(n)).collect()
}

/// Point cloud with explicit supports.
fn cloud(node_positions: &[DVec3], points: &[(DVec3, f64)], lists: &[Vec<NodeId>]) -> SimulationState {
    let mut state = SimulationState::new(ProblemSize {
        nodes: node_positions.len(),
        points: points.len(),
        elements: 0,
        materials: 1,
    });
    state.nodes.position.copy_from_slice(node_positions);
    for (p, &(x, h)) in points.iter().enumerate() {
        state.points.position[p] = x;
        state.points.length_scale[p] = h;
        state.points.volume[p] = 1.0;
        state.points.density[p] = 1.0;
    }
    state.adjacency = Adjacency::from_support_lists(node_positions.len(), lists).unwrap();
    state
}

/// Bootstrapped 2×2×2-cube tet block with solved shape functions.
fn block_state() -> SimulationState {
    let mesh = tet_block([2, 2, 2], [1.0, 1.0, 1.0]);
    let mut state = SimulationState::default();
    bootstrap_from_mesh(&mut state, &mesh).unwrap();
    state.set_uniform_length_scale(0.5);
    state.set_uniform_density(7800.0);
    update_shape_functions(&mut state, &MaxEntConfig::default(), &SerialBackend).unwrap();
    state
}

fn unit_cube_corners() -> Vec<DVec3> {
    (0..8)
        .map(|b| DVec3::new((b & 1) as f64, ((b >> 1) & 1) as f64, ((b >> 2) & 1) as f64))
        .collect()
}

fn check_shape_properties(x: DVec3, node_positions: &[DVec3], values: &[f64], gradients: &[DVec3]) {
    let sum: f64 = values.iter().sum();
    assert!((sum - 1.0).abs() < 1e-12, "partition of unity: {sum}");

    let gradient_sum: DVec3 = gradients.iter().copied().sum();
    assert!(gradient_sum.length() < 1e-10, "gradient sum: {gradient_sum}");

    let reproduced: DVec3 = node_positions
        .iter()
        .zip(values)
        .map(|(&xn, &n)| xn * n)
        .sum();
    assert!((reproduced - x).length() < 1e-10, "linear reproduction: {reproduced}");
}

fn consistency(node_positions: &[DVec3], gradients: &[DVec3]) -> DMat3 {
    node_positions
        .iter()
        .zip(gradients)
        .fold(DMat3::ZERO, |m, (&xn, &g)| m + outer(xn, g))
}

// ─── SimulationState Tests ────────────────────────────────────

#[test]
fn new_state_allocates_every_field() {
    let state = SimulationState::new(ProblemSize {
        nodes: 5,
        points: 3,
        elements: 3,
        materials: 2,
    });
    state.check_sizes().unwrap();
    assert_eq!(state.nodes.len(), 5);
    assert_eq!(state.points.len(), 3);
    assert_eq!(state.material_count(), 2);
    assert!(state.points.deformation_gradient.iter().all(|f| *f == DMat3::IDENTITY));
    assert_eq!(state.adjacency.point_count(), 3);
    assert_eq!(state.adjacency.support().entry_count(), 0);
}

#[test]
fn resize_to_same_size_keeps_data() {
    let mut state = cloud(
        &[DVec3::NEG_X, DVec3::X],
        &[(DVec3::ZERO, 1.0)],
        &[nodes(&[0, 1])],
    );
    let size = state.size();
    state.resize(size);
    assert_eq!(state.nodes.position[1], DVec3::X);
    assert_eq!(state.adjacency.support().entry_count(), 2);
}

#[test]
fn resize_keeps_prefix_and_clears_adjacency() {
    let mut state = cloud(
        &[DVec3::NEG_X, DVec3::X],
        &[(DVec3::ZERO, 1.0)],
        &[nodes(&[0, 1])],
    );
    let mut size = state.size();
    size.nodes = 4;
    size.points = 2;
    state.resize(size);

    state.check_sizes().unwrap();
    assert_eq!(state.nodes.position[1], DVec3::X);
    assert_eq!(state.nodes.position[3], DVec3::ZERO);
    assert_eq!(state.points.length_scale[0], 1.0);
    assert_eq!(state.points.deformation_gradient[1], DMat3::IDENTITY);
    assert_eq!(state.adjacency.point_count(), 2);
    assert_eq!(state.adjacency.node_count(), 4);
    assert_eq!(state.adjacency.support().entry_count(), 0);
}

#[test]
fn size_check_detects_ragged_fields() {
    let mut state = SimulationState::new(ProblemSize {
        nodes: 2,
        points: 1,
        elements: 0,
        materials: 1,
    });
    state.nodes.mass.push(1.0);
    assert!(matches!(state.check_sizes(), Err(OtmError::SizeMismatch(_))));
    assert!(matches!(
        update_kinematics(&mut state, &SerialBackend),
        Err(OtmError::SizeMismatch(_))
    ));
}

// ─── Adjacency Tests ──────────────────────────────────────────

#[test]
fn influence_is_transpose_of_support() {
    let adjacency = Adjacency::from_support_lists(4, &[nodes(&[0, 1, 2]), nodes(&[1, 3])]).unwrap();
    adjacency.validate().unwrap();

    let influence = adjacency.influence();
    assert_eq!(influence.points_of(NodeId(1)), &[PointId(0), PointId(1)]);
    assert_eq!(influence.support_entries_of(NodeId(1)), &[1, 3]);
    assert_eq!(influence.points_of(NodeId(3)), &[PointId(1)]);
    assert_eq!(influence.support_entries_of(NodeId(3)), &[4]);
}

#[test]
fn back_index_round_trips() {
    let lists = vec![nodes(&[4, 0, 2]), nodes(&[1, 2, 3, 4]), nodes(&[]), nodes(&[0])];
    let adjacency = Adjacency::from_support_lists(5, &lists).unwrap();
    let support = adjacency.support();
    let influence = adjacency.influence();

    let mut visited = 0;
    for n in 0..5u32 {
        let n = NodeId(n);
        for (&p, &entry) in influence.points_of(n).iter().zip(influence.support_entries_of(n)) {
            assert_eq!(support.node(entry), n);
            assert_eq!(support.owner(entry), p);
            assert!(support.range(p).contains(&entry));
            visited += 1;
        }
    }
    assert_eq!(visited, support.entry_count());
    assert_eq!(support.nodes_of(PointId(0)), nodes(&[4, 0, 2]).as_slice());
    assert!((support.values_of(PointId(1)).iter().sum::<f64>() - 1.0).abs() < 1e-15);
}

#[test]
fn adjacency_rejects_bad_lists() {
    assert!(matches!(
        Adjacency::from_support_lists(2, &[nodes(&[0, 2])]),
        Err(OtmError::AdjacencyInconsistency(_))
    ));
    assert!(matches!(
        Adjacency::from_support_lists(3, &[nodes(&[1, 1])]),
        Err(OtmError::AdjacencyInconsistency(_))
    ));
}

// ─── Support Builder Tests ────────────────────────────────────

#[test]
fn bootstrap_places_points_at_centroids() {
    let mesh = tet_block([2, 1, 1], [2.0, 1.0, 1.0]);
    let mut state = SimulationState::default();
    bootstrap_from_mesh(&mut state, &mesh).unwrap();

    assert_eq!(state.nodes.len(), mesh.node_count());
    assert_eq!(state.points.len(), mesh.element_count());
    assert_eq!(state.size().elements, mesh.element_count());
    assert_eq!(state.material_count(), 1);
    state.adjacency.validate().unwrap();

    let total_volume: f64 = state.points.volume.iter().sum();
    assert!((total_volume - 2.0).abs() < 1e-12);
    for p in 0..state.points.len() {
        let id = PointId(p as u32);
        let support = state.adjacency.support();
        assert_eq!(support.nodes_of(id).len(), 4);
        let centroid: DVec3 = support
            .nodes_of(id)
            .iter()
            .map(|n| state.nodes.position[n.index()])
            .sum::<DVec3>()
            / 4.0;
        assert!((centroid - state.points.position[p]).length() < 1e-15);
    }
}

#[test]
fn bootstrap_rejects_malformed_mesh() {
    let mut mesh = tet_block([1, 1, 1], [1.0, 1.0, 1.0]);
    mesh.connectivity[5] = 99;
    let mut state = SimulationState::default();
    assert!(matches!(
        bootstrap_from_mesh(&mut state, &mesh),
        Err(OtmError::InvalidMesh(_))
    ));

    let empty = ElementMesh {
        positions: vec![DVec3::ZERO],
        nodes_per_element: 0,
        connectivity: vec![],
        material_ids: vec![],
    };
    assert!(matches!(
        bootstrap_from_mesh(&mut state, &empty),
        Err(OtmError::InvalidMesh(_))
    ));
    assert_eq!(state.points.len(), 0);
}

#[test]
fn bootstrap_rejects_inverted_element() {
    let mut mesh = regular_tetrahedron(1.0);
    mesh.connectivity.swap(1, 2);
    let mut state = SimulationState::default();
    assert!(matches!(
        bootstrap_from_mesh(&mut state, &mesh),
        Err(OtmError::InvalidMesh(_))
    ));
}

fn lattice(half_width: i32) -> Vec<DVec3> {
    let mut positions = Vec::new();
    for k in -half_width..=half_width {
        for j in -half_width..=half_width {
            for i in -half_width..=half_width {
                positions.push(DVec3::new(i as f64, j as f64, k as f64));
            }
        }
    }
    positions
}

#[test]
fn grid_search_collects_nodes_within_radius() {
    let positions = lattice(2);
    let mut state = cloud(&positions, &[(DVec3::ZERO, 0.6)], &[vec![]]);
    let search = GridSearch::new(SearchConfig::default()).unwrap();
    build_support_relation(&mut state, &search).unwrap();

    // Radius 1.2 reaches the origin and its six axis neighbors.
    let found = state.adjacency.support().nodes_of(PointId(0));
    assert_eq!(found.len(), 7);
    assert!(found.windows(2).all(|w| w[0] < w[1]));
    for n in found {
        assert!(state.nodes.position[n.index()].length() <= 1.0);
    }
}

#[test]
fn grid_search_keeps_nearest_nodes() {
    let positions = lattice(2);
    let mut state = cloud(&positions, &[(DVec3::new(0.1, 0.0, 0.0), 2.0)], &[vec![]]);
    let search = GridSearch::new(SearchConfig {
        max_support_nodes: Some(5),
        ..Default::default()
    })
    .unwrap();
    build_support_relation(&mut state, &search).unwrap();

    let found = state.adjacency.support().nodes_of(PointId(0));
    assert_eq!(found.len(), 5);
    let origin = positions.iter().position(|x| *x == DVec3::ZERO).unwrap();
    assert!(found.contains(&NodeId(origin as u32)));
}

#[test]
fn sparse_neighborhood_is_degenerate() {
    let positions = lattice(1);
    let far = DVec3::splat(50.0);
    let mut state = cloud(&positions, &[(DVec3::ZERO, 0.6), (far, 0.6)], &[vec![], vec![]]);
    let before = state.adjacency.support().entry_count();
    let search = GridSearch::new(SearchConfig::default()).unwrap();

    match build_support_relation(&mut state, &search) {
        Err(OtmError::DegenerateSupport {
            point,
            found,
            required,
        }) => {
            assert_eq!(point, PointId(1));
            assert_eq!(found, 0);
            assert_eq!(required, 4);
        }
        other => panic!("expected DegenerateSupport, got {other:?}"),
    }
    assert_eq!(state.adjacency.support().entry_count(), before);
}

#[test]
fn grid_search_requires_length_scale() {
    let mut state = cloud(&lattice(1), &[(DVec3::ZERO, 0.0)], &[vec![]]);
    let search = GridSearch::new(SearchConfig::default()).unwrap();
    assert!(matches!(
        build_support_relation(&mut state, &search),
        Err(OtmError::InvalidConfig(_))
    ));
}

#[test]
fn invalid_search_config_is_rejected() {
    let config = SearchConfig {
        radius_factor: -1.0,
        ..Default::default()
    };
    assert!(matches!(GridSearch::new(config), Err(OtmError::InvalidConfig(_))));
}

// ─── Shape Function Tests ─────────────────────────────────────

#[test]
fn two_node_support_splits_evenly() {
    let positions = [DVec3::new(-1.0, 0.0, 0.0), DVec3::new(1.0, 0.0, 0.0)];
    let solution = solve_point(PointId(0), DVec3::ZERO, 1.0, &positions, &MaxEntConfig::default())
        .unwrap();

    assert_eq!(solution.multiplier, DVec3::ZERO);
    assert!((solution.values[0] - 0.5).abs() < 1e-15);
    assert!((solution.values[1] - 0.5).abs() < 1e-15);
    assert!((solution.gradients[0] - DVec3::new(-0.5, 0.0, 0.0)).length() < 1e-15);
    assert!((solution.gradients[1] - DVec3::new(0.5, 0.0, 0.0)).length() < 1e-15);
}

#[test]
fn regular_tetrahedron_centroid_is_independent_of_locality() {
    let mesh = regular_tetrahedron(1.0);
    for h in [0.25, 1.0, 4.0] {
        let solution =
            solve_point(PointId(0), DVec3::ZERO, h, &mesh.positions, &MaxEntConfig::default())
                .unwrap();
        for &n in &solution.values {
            assert!((n - 0.25).abs() < 1e-12, "h = {h}: N = {n}");
        }
        check_shape_properties(DVec3::ZERO, &mesh.positions, &solution.values, &solution.gradients);
        let c = consistency(&mesh.positions, &solution.gradients);
        assert!(frobenius_norm(&(c - DMat3::IDENTITY)) < 1e-10);
    }
}

#[test]
fn general_support_is_consistent() {
    let positions = unit_cube_corners();
    let x = DVec3::new(0.3, 0.4, 0.6);
    let solution = solve_point(PointId(0), x, 1.0, &positions, &MaxEntConfig::default()).unwrap();

    check_shape_properties(x, &positions, &solution.values, &solution.gradients);
    assert!(solution.values.iter().all(|&n| n > 0.0));
    let c = consistency(&positions, &solution.gradients);
    assert!(frobenius_norm(&(c - DMat3::IDENTITY)) < 1e-9);
}

#[test]
fn coplanar_support_has_in_plane_gradients() {
    let positions = [
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(1.0, 0.0, 0.0),
        DVec3::new(0.0, 1.0, 0.0),
        DVec3::new(1.0, 1.0, 0.0),
    ];
    let x = DVec3::new(0.4, 0.3, 0.0);
    let solution = solve_point(PointId(0), x, 1.0, &positions, &MaxEntConfig::default()).unwrap();

    check_shape_properties(x, &positions, &solution.values, &solution.gradients);
    assert_eq!(solution.multiplier.z, 0.0);
    assert!(solution.gradients.iter().all(|g| g.z == 0.0));
}

#[test]
fn point_outside_hull_diverges() {
    let positions = unit_cube_corners();
    let result = solve_point(
        PointId(3),
        DVec3::new(3.0, 0.5, 0.5),
        1.0,
        &positions,
        &MaxEntConfig::default(),
    );
    match result {
        Err(e @ OtmError::NewtonDivergence { .. }) => {
            assert_eq!(e.point(), Some(PointId(3)));
            assert!(e.is_recoverable());
        }
        other => panic!("expected NewtonDivergence, got {other:?}"),
    }
}

#[test]
fn capped_solve_fails_unless_relaxed() {
    // Close to a face with a tight locality the iteration stalls at the cap.
    let positions = unit_cube_corners();
    let x = DVec3::new(0.5, 0.5, 1e-6);

    let result = solve_point(PointId(0), x, 0.1, &positions, &MaxEntConfig::default());
    match result {
        Err(OtmError::NewtonDivergence { iterations, .. }) => assert_eq!(iterations, 16),
        other => panic!("expected NewtonDivergence, got {other:?}"),
    }

    let solution = solve_point(PointId(0), x, 0.1, &positions, &MaxEntConfig::relaxed(1e-5)).unwrap();
    assert!(solution.relaxed);
    assert_eq!(solution.iterations, 16);
}

#[test]
fn empty_support_is_degenerate() {
    let result = solve_point(PointId(0), DVec3::ZERO, 1.0, &[], &MaxEntConfig::default());
    assert!(matches!(result, Err(OtmError::DegenerateSupport { found: 0, .. })));
}

#[test]
fn failed_update_leaves_shape_data_untouched() {
    let positions = unit_cube_corners();
    let all: Vec<NodeId> = (0..8).map(NodeId).collect();
    let mut state = cloud(
        &positions,
        &[(DVec3::splat(0.5), 1.0), (DVec3::new(3.0, 0.5, 0.5), 1.0)],
        &[all.clone(), all],
    );
    let before = state.adjacency.support().values().to_vec();

    let error = update_shape_functions(&mut state, &MaxEntConfig::default(), &SerialBackend)
        .unwrap_err();
    assert_eq!(error.point(), Some(PointId(1)));
    assert_eq!(state.adjacency.support().values(), before.as_slice());
    assert!(state.adjacency.support().gradients().iter().all(|g| *g == DVec3::ZERO));
}

#[test]
fn bootstrap_supports_give_barycentric_shape_functions() {
    let state = block_state();
    let support = state.adjacency.support();
    for &n in support.values() {
        assert!((n - 0.25).abs() < 1e-10);
    }
    for p in 0..state.points.len() {
        let id = PointId(p as u32);
        let node_positions: Vec<DVec3> = support
            .nodes_of(id)
            .iter()
            .map(|n| state.nodes.position[n.index()])
            .collect();
        check_shape_properties(
            state.points.position[p],
            &node_positions,
            support.values_of(id),
            support.gradients_of(id),
        );
    }
}

#[test]
fn searched_supports_satisfy_shape_invariants() {
    let mut state = block_state();
    let search = GridSearch::new(SearchConfig::default()).unwrap();
    build_support_relation(&mut state, &search).unwrap();
    let stats = update_shape_functions(&mut state, &MaxEntConfig::default(), &SerialBackend).unwrap();
    assert_eq!(stats.points, state.points.len());
    assert!(stats.support_entries > 4 * state.points.len());

    let support = state.adjacency.support();
    for p in 0..state.points.len() {
        let id = PointId(p as u32);
        let node_positions: Vec<DVec3> = support
            .nodes_of(id)
            .iter()
            .map(|n| state.nodes.position[n.index()])
            .collect();
        check_shape_properties(
            state.points.position[p],
            &node_positions,
            support.values_of(id),
            support.gradients_of(id),
        );
        let c = consistency(&node_positions, support.gradients_of(id));
        assert!(frobenius_norm(&(c - DMat3::IDENTITY)) < 1e-8);
    }
}

#[test]
fn serial_and_rayon_shape_functions_agree() {
    let mesh = tet_block([3, 2, 2], [1.5, 1.0, 1.0]);
    let mut serial = SimulationState::default();
    bootstrap_from_mesh(&mut serial, &mesh).unwrap();
    serial.set_uniform_length_scale(0.5);
    let mut parallel = serial.clone();

    update_shape_functions(&mut serial, &MaxEntConfig::default(), &SerialBackend).unwrap();
    update_shape_functions(&mut parallel, &MaxEntConfig::default(), &RayonBackend::new()).unwrap();

    let (a, b) = (serial.adjacency.support(), parallel.adjacency.support());
    for (x, y) in a.values().iter().zip(b.values()) {
        assert!((x - y).abs() < 1e-14);
    }
    for (x, y) in a.gradients().iter().zip(b.gradients()) {
        assert!((*x - *y).length() < 1e-12);
    }
}

// ─── Kinematics Tests ─────────────────────────────────────────

fn small_strain() -> DMat3 {
    DMat3::from_cols(
        DVec3::new(0.01, 0.0, 0.001),
        DVec3::new(0.002, -0.005, 0.0),
        DVec3::new(0.0, 0.003, 0.004),
    )
}

#[test]
fn affine_displacement_gives_uniform_deformation() {
    let mut state = block_state();
    let a = small_strain();
    for (u, &x) in state.nodes.displacement.iter_mut().zip(&state.nodes.position) {
        *u = a * x;
    }
    let volumes = state.points.volume.clone();
    let masses: Vec<f64> = (0..state.points.len())
        .map(|p| state.points.density[p] * state.points.volume[p])
        .collect();

    update_kinematics(&mut state, &SerialBackend).unwrap();

    let expected = DMat3::IDENTITY + a;
    let j = expected.determinant();
    for p in 0..state.points.len() {
        let f = state.points.deformation_gradient[p];
        assert!(frobenius_norm(&(f - expected)) < 1e-10, "point {p}");
        assert!((state.points.volume[p] - j * volumes[p]).abs() < 1e-10 * volumes[p]);
        let mass = state.points.density[p] * state.points.volume[p];
        assert!((mass - masses[p]).abs() < 1e-12 * masses[p]);
    }
}

#[test]
fn pushed_forward_gradients_stay_consistent() {
    let mut state = block_state();
    let a = small_strain();
    for (u, &x) in state.nodes.displacement.iter_mut().zip(&state.nodes.position) {
        *u = a * x;
    }
    update_kinematics(&mut state, &SerialBackend).unwrap();
    for (x, &u) in state.nodes.position.iter_mut().zip(&state.nodes.displacement) {
        *x += u;
    }

    // Second affine increment on the deformed configuration.
    for (u, &x) in state.nodes.displacement.iter_mut().zip(&state.nodes.position) {
        *u = a * x;
    }
    let increment = incremental_deformation(&state, PointId(0));
    assert!(frobenius_norm(&(increment - (DMat3::IDENTITY + a))) < 1e-9);

    update_kinematics(&mut state, &SerialBackend).unwrap();
    let expected = (DMat3::IDENTITY + a) * (DMat3::IDENTITY + a);
    assert!(frobenius_norm(&(state.points.deformation_gradient[0] - expected)) < 1e-9);
}

#[test]
fn points_follow_interpolated_motion() {
    let mut state = block_state();
    for (u, &x) in state.nodes.displacement.iter_mut().zip(&state.nodes.position) {
        *u = DVec3::new(0.5 * x.x, 0.0, 0.0);
    }
    let before = state.points.position.clone();
    update_kinematics(&mut state, &SerialBackend).unwrap();
    for (x, &u) in state.nodes.position.iter_mut().zip(&state.nodes.displacement) {
        *x += u;
    }

    let support = state.adjacency.support();
    for p in 0..state.points.len() {
        let id = PointId(p as u32);
        let interpolated: DVec3 = support
            .nodes_of(id)
            .iter()
            .zip(support.values_of(id))
            .map(|(n, &value)| state.nodes.position[n.index()] * value)
            .sum();
        let x = state.points.position[p];
        assert!((x - interpolated).length() < 1e-10, "point {p}: {x} vs {interpolated}");
        assert!((x.x - 1.5 * before[p].x).abs() < 1e-10);
    }
}

#[test]
fn rigid_translation_is_not_a_deformation() {
    let mut state = block_state();
    set_uniform_displacement(&mut state, DVec3::new(0.3, -0.2, 1.0));
    let volumes = state.points.volume.clone();
    update_kinematics(&mut state, &SerialBackend).unwrap();
    for p in 0..state.points.len() {
        assert!(frobenius_norm(&(state.points.deformation_gradient[p] - DMat3::IDENTITY)) < 1e-10);
        assert!((state.points.volume[p] - volumes[p]).abs() < 1e-10 * volumes[p]);
    }
}

#[test]
fn inversion_is_rejected_without_side_effects() {
    let mut state = block_state();
    for (u, &x) in state.nodes.displacement.iter_mut().zip(&state.nodes.position) {
        *u = -2.0 * x;
    }
    let before = state.clone();

    match update_kinematics(&mut state, &SerialBackend) {
        Err(OtmError::NonPositiveJacobian { point, jacobian }) => {
            assert_eq!(point, PointId(0));
            assert!(jacobian < 0.0);
        }
        other => panic!("expected NonPositiveJacobian, got {other:?}"),
    }
    assert_eq!(state.points.deformation_gradient, before.points.deformation_gradient);
    assert_eq!(state.points.position, before.points.position);
    assert_eq!(state.points.volume, before.points.volume);
    assert_eq!(state.points.density, before.points.density);
    assert_eq!(state.adjacency.support().gradients(), before.adjacency.support().gradients());
}

#[test]
fn reset_restores_undeformed_state() {
    let mut state = block_state();
    state.points.deformation_gradient[2] = DMat3::IDENTITY * 1.1;
    state.points.plastic_deformation_gradient[2] = DMat3::IDENTITY * 1.1;
    state.points.equivalent_plastic_strain[2] = 0.3;
    reset_deformation_gradients(&mut state);
    assert_eq!(state.points.deformation_gradient[2], DMat3::IDENTITY);
    assert_eq!(state.points.plastic_deformation_gradient[2], DMat3::IDENTITY);
    assert_eq!(state.points.equivalent_plastic_strain[2], 0.0);
}

// ─── Assembly Tests ───────────────────────────────────────────

#[test]
fn lumped_mass_matches_point_mass() {
    let mut state = block_state();
    lump_nodal_mass(&mut state, &SerialBackend).unwrap();
    let point_mass = total_point_mass(&state);
    assert!((point_mass - 7800.0).abs() < 1e-9);
    assert!((total_nodal_mass(&state) - point_mass).abs() < 1e-9 * point_mass);
    assert!(state.nodes.mass.iter().all(|&m| m > 0.0));

    // Recomputed from scratch on every call.
    lump_nodal_mass(&mut state, &SerialBackend).unwrap();
    assert!((total_nodal_mass(&state) - point_mass).abs() < 1e-9 * point_mass);
}

#[test]
fn uniform_stress_has_zero_net_force() {
    let mut state = block_state();
    let sigma = DMat3::from_cols(
        DVec3::new(100.0, 20.0, -5.0),
        DVec3::new(20.0, 50.0, 10.0),
        DVec3::new(-5.0, 10.0, 80.0),
    );
    state.points.stress.fill(sigma);
    update_nodal_force(&mut state, &SerialBackend).unwrap();

    assert!(net_force(&state).length() < 1e-9);
    assert!(state.nodes.force.iter().any(|f| f.length() > 1.0));
}

#[test]
fn body_force_totals_weight() {
    let mut state = block_state();
    let g = DVec3::new(0.0, 0.0, -9.81);
    state.points.body_acceleration.fill(g);
    state.nodes.force.fill(DVec3::splat(123.0));
    update_nodal_force(&mut state, &SerialBackend).unwrap();

    let weight = g * total_point_mass(&state);
    assert!((net_force(&state) - weight).length() < 1e-9 * weight.length());
}

#[test]
fn momentum_is_mass_times_velocity() {
    let mut state = block_state();
    lump_nodal_mass(&mut state, &SerialBackend).unwrap();
    state.nodes.velocity.fill(DVec3::new(1.0, 2.0, 0.0));
    update_nodal_momentum(&mut state, &SerialBackend).unwrap();
    for n in 0..state.nodes.len() {
        assert_eq!(state.nodes.momentum[n], state.nodes.velocity[n] * state.nodes.mass[n]);
    }
    let total: DVec3 = state.nodes.momentum.iter().copied().sum();
    assert!((total - DVec3::new(7800.0, 15600.0, 0.0)).length() < 1e-8);
}

#[test]
fn serial_and_rayon_forces_agree() {
    let mut serial = block_state();
    for (p, sigma) in serial.points.stress.iter_mut().enumerate() {
        *sigma = DMat3::IDENTITY * (p as f64) + outer(DVec3::X, DVec3::Y) * 3.0;
    }
    serial.points.body_acceleration.fill(DVec3::NEG_Z);
    let mut parallel = serial.clone();

    update_nodal_force(&mut serial, &SerialBackend).unwrap();
    update_nodal_force(&mut parallel, &RayonBackend::new()).unwrap();
    lump_nodal_mass(&mut serial, &SerialBackend).unwrap();
    lump_nodal_mass(&mut parallel, &RayonBackend::new()).unwrap();

    for n in 0..serial.nodes.len() {
        assert!((serial.nodes.force[n] - parallel.nodes.force[n]).length() < 1e-9);
        assert!((serial.nodes.mass[n] - parallel.nodes.mass[n]).abs() < 1e-9);
    }
}

// ─── Material Dispatcher Tests ────────────────────────────────

fn two_materials() -> MaterialSet {
    let elastic = ElasticProperties {
        bulk_modulus: 160.0e9,
        shear_modulus: 80.0e9,
    };
    let mut set = MaterialSet::new();
    set.push("rubber", MaterialModel::neo_hookean(elastic).unwrap());
    set.push("steel", MaterialSet::preset("steel_j2").unwrap());
    set
}

#[test]
fn undeformed_points_are_stress_free() {
    let mut state = block_state();
    for (p, m) in state.points.material.iter_mut().enumerate() {
        *m = MaterialId((p % 2) as u16);
    }
    state.points.stress.fill(DMat3::IDENTITY);
    update_all_materials(&mut state, &two_materials(), 1.0e-6, &SerialBackend).unwrap();
    for sigma in &state.points.stress {
        assert!(frobenius_norm(sigma) < 1e-6);
    }
    assert!(state.points.shear_modulus.iter().all(|&g| g > 0.0));
}

#[test]
fn dispatcher_only_touches_its_material() {
    let mut state = block_state();
    for (p, m) in state.points.material.iter_mut().enumerate() {
        *m = MaterialId((p % 2) as u16);
    }
    let shear = DMat3::IDENTITY + outer(DVec3::X, DVec3::Y) * 0.05;
    state.points.deformation_gradient.fill(shear);

    update_material_state(&mut state, &two_materials(), MaterialId(1), 1.0e-6, &SerialBackend)
        .unwrap();
    for p in 0..state.points.len() {
        if p % 2 == 1 {
            assert!(state.points.equivalent_plastic_strain[p] > 0.0);
            assert!(frobenius_norm(&state.points.stress[p]) > 0.0);
        } else {
            assert_eq!(state.points.stress[p], DMat3::ZERO);
            assert_eq!(state.points.equivalent_plastic_strain[p], 0.0);
        }
    }
}

#[test]
fn unknown_material_is_rejected() {
    let mut state = block_state();
    assert!(matches!(
        update_material_state(&mut state, &two_materials(), MaterialId(7), 1.0, &SerialBackend),
        Err(OtmError::InvalidMaterial(_))
    ));

    state.points.material[3] = MaterialId(9);
    assert!(matches!(
        update_all_materials(&mut state, &two_materials(), 1.0, &SerialBackend),
        Err(OtmError::InvalidMaterial(_))
    ));
}

#[test]
fn inverted_point_fails_whole_material() {
    let mut state = block_state();
    state.points.deformation_gradient[0] = DMat3::IDENTITY + outer(DVec3::Y, DVec3::Y) * 0.01;
    state.points.deformation_gradient[5] = DMat3::from_diagonal(DVec3::new(1.0, 1.0, -1.0));

    match update_material_state(&mut state, &two_materials(), MaterialId(0), 0.0, &SerialBackend) {
        Err(OtmError::NonPositiveJacobian { point, .. }) => assert_eq!(point, PointId(5)),
        other => panic!("expected NonPositiveJacobian, got {other:?}"),
    }
    assert_eq!(state.points.stress[0], DMat3::ZERO);
}
