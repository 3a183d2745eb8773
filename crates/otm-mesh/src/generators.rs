//! Procedural tetrahedral mesh generators for tests and demos.
//!
//! All generated tetrahedra are positively oriented (corner volume > 0).

use otm_math::DVec3;
use otm_types::MaterialId;

use crate::mesh::ElementMesh;

/// The unit right-corner tetrahedron `(0,0,0), (1,0,0), (0,1,0), (0,0,1)`.
pub fn unit_tetrahedron() -> ElementMesh {
    ElementMesh {
        positions: vec![
            DVec3::ZERO,
            DVec3::X,
            DVec3::Y,
            DVec3::Z,
        ],
        nodes_per_element: 4,
        connectivity: vec![0, 1, 2, 3],
        material_ids: vec![MaterialId(0)],
    }
}

/// A regular tetrahedron with the given edge length, centroid at the origin.
pub fn regular_tetrahedron(edge: f64) -> ElementMesh {
    // Alternate cube corners have edge length 2√2.
    let scale = edge / (2.0 * 2.0_f64.sqrt());
    ElementMesh {
        positions: vec![
            DVec3::new(1.0, 1.0, 1.0) * scale,
            DVec3::new(1.0, -1.0, -1.0) * scale,
            DVec3::new(-1.0, 1.0, -1.0) * scale,
            DVec3::new(-1.0, -1.0, 1.0) * scale,
        ],
        nodes_per_element: 4,
        connectivity: vec![0, 2, 1, 3],
        material_ids: vec![MaterialId(0)],
    }
}

/// Generates a box of `cells[0] × cells[1] × cells[2]` hexahedra, each split
/// into six tetrahedra (Kuhn subdivision).
///
/// The box spans `[0, extent[0]] × [0, extent[1]] × [0, extent[2]]`.
///
/// # Example
/// ```
/// use otm_mesh::generators::tet_block;
/// let mesh = tet_block([2, 1, 1], [2.0, 1.0, 1.0]);
/// assert_eq!(mesh.node_count(), 12);   // 3×2×2 nodes
/// assert_eq!(mesh.element_count(), 12); // 2 cubes × 6 tets
/// ```
pub fn tet_block(cells: [usize; 3], extent: [f64; 3]) -> ElementMesh {
    let [nx, ny, nz] = cells;
    let (vx, vy, vz) = (nx + 1, ny + 1, nz + 1);
    let h = DVec3::new(
        extent[0] / nx.max(1) as f64,
        extent[1] / ny.max(1) as f64,
        extent[2] / nz.max(1) as f64,
    );

    let mut positions = Vec::with_capacity(vx * vy * vz);
    for k in 0..vz {
        for j in 0..vy {
            for i in 0..vx {
                positions.push(DVec3::new(i as f64, j as f64, k as f64) * h);
            }
        }
    }

    let node = |i: usize, j: usize, k: usize| (i + vx * (j + vy * k)) as u32;

    // Paths from corner 0 to corner 7 along the axes in permutation order.
    // Odd permutations swap the middle corners to keep positive orientation.
    const PATHS: [([usize; 3], bool); 6] = [
        ([0, 1, 2], false),
        ([1, 2, 0], false),
        ([2, 0, 1], false),
        ([0, 2, 1], true),
        ([1, 0, 2], true),
        ([2, 1, 0], true),
    ];

    let element_count = nx * ny * nz * 6;
    let mut connectivity = Vec::with_capacity(element_count * 4);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let corner = |bits: usize| {
                    node(i + (bits & 1), j + ((bits >> 1) & 1), k + ((bits >> 2) & 1))
                };
                for (axes, odd) in PATHS {
                    let b1 = 1 << axes[0];
                    let b2 = b1 | (1 << axes[1]);
                    let (c1, c2) = if odd {
                        (corner(b2), corner(b1))
                    } else {
                        (corner(b1), corner(b2))
                    };
                    connectivity.extend_from_slice(&[corner(0), c1, c2, corner(7)]);
                }
            }
        }
    }

    ElementMesh {
        positions,
        nodes_per_element: 4,
        connectivity,
        material_ids: vec![MaterialId(0); element_count],
    }
}
