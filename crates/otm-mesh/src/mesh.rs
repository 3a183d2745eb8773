//! Element mesh with flat, fixed-size connectivity.
//!
//! Connectivity is stored flat: element `e` owns
//! `connectivity[e * nodes_per_element..(e + 1) * nodes_per_element]`.
//! For tetrahedra (4 or 10 nodes) the first four entries are the corners.

use otm_math::DVec3;
use otm_types::{ElementId, MaterialId, NodeId, OtmError, OtmResult};
use serde::{Deserialize, Serialize};

/// A mesh of fixed-size elements over a shared node set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementMesh {
    /// Node positions.
    pub positions: Vec<DVec3>,

    /// Number of nodes per element (4 for linear tets, 10 for quadratic).
    pub nodes_per_element: usize,

    /// Flat element-to-node connectivity.
    pub connectivity: Vec<u32>,

    /// Per-element material assignment.
    pub material_ids: Vec<MaterialId>,
}

impl ElementMesh {
    /// Creates a mesh and validates it.
    pub fn new(
        positions: Vec<DVec3>,
        nodes_per_element: usize,
        connectivity: Vec<u32>,
    ) -> OtmResult<Self> {
        let elements = if nodes_per_element == 0 {
            0
        } else {
            connectivity.len() / nodes_per_element
        };
        let mesh = Self {
            positions,
            nodes_per_element,
            connectivity,
            material_ids: vec![MaterialId(0); elements],
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Returns the number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns the number of elements.
    #[inline]
    pub fn element_count(&self) -> usize {
        if self.nodes_per_element == 0 {
            0
        } else {
            self.connectivity.len() / self.nodes_per_element
        }
    }

    /// Returns the node indices of element `e`.
    #[inline]
    pub fn element(&self, e: ElementId) -> &[u32] {
        let base = e.index() * self.nodes_per_element;
        &self.connectivity[base..base + self.nodes_per_element]
    }

    /// Iterates the node ids of element `e`.
    pub fn element_nodes(&self, e: ElementId) -> impl Iterator<Item = NodeId> + '_ {
        self.element(e).iter().map(|&n| NodeId(n))
    }

    /// Average of the element's node positions.
    pub fn centroid(&self, e: ElementId) -> DVec3 {
        let nodes = self.element(e);
        let sum: DVec3 = nodes.iter().map(|&n| self.positions[n as usize]).sum();
        sum / nodes.len() as f64
    }

    /// Signed volume of the corner tetrahedron of element `e`.
    ///
    /// Returns `None` for elements with fewer than four nodes.
    pub fn tet_volume(&self, e: ElementId) -> Option<f64> {
        let nodes = self.element(e);
        if nodes.len() < 4 {
            return None;
        }
        let x0 = self.positions[nodes[0] as usize];
        let a = self.positions[nodes[1] as usize] - x0;
        let b = self.positions[nodes[2] as usize] - x0;
        let c = self.positions[nodes[3] as usize] - x0;
        Some(a.dot(b.cross(c)) / 6.0)
    }

    /// Sum of all corner-tetrahedron volumes.
    pub fn total_volume(&self) -> f64 {
        (0..self.element_count())
            .filter_map(|e| self.tet_volume(ElementId(e as u32)))
            .sum()
    }

    /// Validates mesh integrity.
    ///
    /// Checks:
    /// - At least one node per element
    /// - Connectivity length is a multiple of `nodes_per_element`
    /// - One material id per element
    /// - Node indices are within bounds and not repeated inside an element
    pub fn validate(&self) -> OtmResult<()> {
        if self.nodes_per_element == 0 {
            return Err(OtmError::InvalidMesh(
                "Elements must have at least one node".into(),
            ));
        }

        if self.connectivity.len() % self.nodes_per_element != 0 {
            return Err(OtmError::InvalidMesh(format!(
                "Connectivity length ({}) is not divisible by nodes per element ({})",
                self.connectivity.len(),
                self.nodes_per_element
            )));
        }

        let element_count = self.element_count();
        if self.material_ids.len() != element_count {
            return Err(OtmError::InvalidMesh(format!(
                "Material IDs count ({}) != element count ({})",
                self.material_ids.len(),
                element_count
            )));
        }

        let n = self.node_count();
        for (i, &idx) in self.connectivity.iter().enumerate() {
            if idx as usize >= n {
                return Err(OtmError::InvalidMesh(format!(
                    "Node index {} at position {} is out of range (node count: {})",
                    idx, i, n
                )));
            }
        }

        for e in 0..element_count {
            let nodes = self.element(ElementId(e as u32));
            for (i, a) in nodes.iter().enumerate() {
                if nodes[i + 1..].contains(a) {
                    return Err(OtmError::InvalidMesh(format!(
                        "Element {} repeats node {}",
                        e, a
                    )));
                }
            }
        }

        Ok(())
    }
}
