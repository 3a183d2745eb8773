//! Simulation state: SoA buffers for all per-node and per-point data.
//!
//! This is the primary mutable data structure of the meshfree core.
//! Kernels read and write these buffers; the adjacency between the two
//! index spaces is owned here as well.

use otm_math::{DMat3, DVec3};
use otm_types::{MaterialId, OtmError, OtmResult};

use crate::adjacency::Adjacency;

/// Sizes of every index space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProblemSize {
    pub nodes: usize,
    pub points: usize,
    /// Bootstrap elements (one point each).
    pub elements: usize,
    pub materials: usize,
}

/// Per-node buffers. All arrays have length `len()`.
#[derive(Debug, Clone, Default)]
pub struct NodeFields {
    pub position: Vec<DVec3>,
    /// Displacement since the last kinematic update.
    pub displacement: Vec<DVec3>,
    pub velocity: Vec<DVec3>,
    pub acceleration: Vec<DVec3>,
    /// Lumped mass.
    pub mass: Vec<f64>,
    /// Internal plus external force.
    pub force: Vec<DVec3>,
    pub momentum: Vec<DVec3>,
}

impl NodeFields {
    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.position.len()
    }

    /// Returns true if there are no nodes.
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    fn resize(&mut self, n: usize) {
        self.position.resize(n, DVec3::ZERO);
        self.displacement.resize(n, DVec3::ZERO);
        self.velocity.resize(n, DVec3::ZERO);
        self.acceleration.resize(n, DVec3::ZERO);
        self.mass.resize(n, 0.0);
        self.force.resize(n, DVec3::ZERO);
        self.momentum.resize(n, DVec3::ZERO);
    }

    fn check(&self) -> OtmResult<()> {
        let n = self.len();
        let lengths = [
            ("displacement", self.displacement.len()),
            ("velocity", self.velocity.len()),
            ("acceleration", self.acceleration.len()),
            ("mass", self.mass.len()),
            ("force", self.force.len()),
            ("momentum", self.momentum.len()),
        ];
        check_lengths("node", n, &lengths)
    }
}

/// Per-point (material point) buffers. All arrays have length `len()`.
#[derive(Debug, Clone, Default)]
pub struct PointFields {
    pub position: Vec<DVec3>,
    pub volume: Vec<f64>,
    pub density: Vec<f64>,
    /// Cumulative deformation gradient.
    pub deformation_gradient: Vec<DMat3>,
    /// Cauchy stress.
    pub stress: Vec<DMat3>,
    pub bulk_modulus: Vec<f64>,
    pub shear_modulus: Vec<f64>,
    /// Stored energy per unit reference volume.
    pub energy_density: Vec<f64>,
    pub plastic_deformation_gradient: Vec<DMat3>,
    pub equivalent_plastic_strain: Vec<f64>,
    pub body_acceleration: Vec<DVec3>,
    /// Locality length scale `h`, supplied by the driver.
    pub length_scale: Vec<f64>,
    pub material: Vec<MaterialId>,
}

impl PointFields {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.position.len()
    }

    /// Returns true if there are no points.
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    fn resize(&mut self, n: usize) {
        self.position.resize(n, DVec3::ZERO);
        self.volume.resize(n, 0.0);
        self.density.resize(n, 0.0);
        self.deformation_gradient.resize(n, DMat3::IDENTITY);
        self.stress.resize(n, DMat3::ZERO);
        self.bulk_modulus.resize(n, 0.0);
        self.shear_modulus.resize(n, 0.0);
        self.energy_density.resize(n, 0.0);
        self.plastic_deformation_gradient.resize(n, DMat3::IDENTITY);
        self.equivalent_plastic_strain.resize(n, 0.0);
        self.body_acceleration.resize(n, DVec3::ZERO);
        self.length_scale.resize(n, 0.0);
        self.material.resize(n, MaterialId::default());
    }

    fn check(&self) -> OtmResult<()> {
        let n = self.len();
        let lengths = [
            ("volume", self.volume.len()),
            ("density", self.density.len()),
            ("deformation_gradient", self.deformation_gradient.len()),
            ("stress", self.stress.len()),
            ("bulk_modulus", self.bulk_modulus.len()),
            ("shear_modulus", self.shear_modulus.len()),
            ("energy_density", self.energy_density.len()),
            (
                "plastic_deformation_gradient",
                self.plastic_deformation_gradient.len(),
            ),
            (
                "equivalent_plastic_strain",
                self.equivalent_plastic_strain.len(),
            ),
            ("body_acceleration", self.body_acceleration.len()),
            ("length_scale", self.length_scale.len()),
            ("material", self.material.len()),
        ];
        check_lengths("point", n, &lengths)
    }
}

fn check_lengths(space: &str, expected: usize, lengths: &[(&str, usize)]) -> OtmResult<()> {
    for &(name, len) in lengths {
        if len != expected {
            return Err(OtmError::SizeMismatch(format!(
                "{space} field `{name}` has {len} entries, expected {expected}"
            )));
        }
    }
    Ok(())
}

/// Complete meshfree state.
///
/// Holds the node and point buffers plus the point↔node adjacency.
/// Node and point counts are independent.
#[derive(Debug, Clone, Default)]
pub struct SimulationState {
    pub nodes: NodeFields,
    pub points: PointFields,
    pub adjacency: Adjacency,
    element_count: usize,
    material_count: usize,
}

impl SimulationState {
    /// Creates a state with every array allocated for `size`.
    pub fn new(size: ProblemSize) -> Self {
        let mut state = Self::default();
        state.resize(size);
        state
    }

    /// Current sizes of every index space.
    pub fn size(&self) -> ProblemSize {
        ProblemSize {
            nodes: self.nodes.len(),
            points: self.points.len(),
            elements: self.element_count,
            materials: self.material_count,
        }
    }

    /// Allocates every array for `size`.
    ///
    /// Resizing to the current size is a no-op. Otherwise the common
    /// prefix of every array is kept, new entries are default-filled
    /// (identity deformation gradients, zero elsewhere), and the
    /// adjacency is reset to empty supports since its membership no
    /// longer refers to valid entities.
    pub fn resize(&mut self, size: ProblemSize) {
        if size == self.size() {
            return;
        }
        let relation_changed = size.nodes != self.nodes.len() || size.points != self.points.len();
        self.nodes.resize(size.nodes);
        self.points.resize(size.points);
        self.element_count = size.elements;
        self.material_count = size.materials;
        if relation_changed {
            self.adjacency = Adjacency::empty(size.points, size.nodes);
        }
    }

    /// Number of materials the state was sized for.
    pub fn material_count(&self) -> usize {
        self.material_count
    }

    /// Sets the same locality length scale on every point.
    pub fn set_uniform_length_scale(&mut self, h: f64) {
        self.points.length_scale.fill(h);
    }

    /// Sets the same density on every point.
    pub fn set_uniform_density(&mut self, density: f64) {
        self.points.density.fill(density);
    }

    /// Checks every buffer against the node and point counts and the
    /// adjacency against both.
    pub fn check_sizes(&self) -> OtmResult<()> {
        self.nodes.check()?;
        self.points.check()?;
        let (points, nodes) = (self.adjacency.point_count(), self.adjacency.node_count());
        if points != self.points.len() || nodes != self.nodes.len() {
            return Err(OtmError::SizeMismatch(format!(
                "adjacency spans {points} points and {nodes} nodes, state has {} and {}",
                self.points.len(),
                self.nodes.len()
            )));
        }
        Ok(())
    }

    /// Σ ½ m |v|² over nodes.
    pub fn kinetic_energy(&self) -> f64 {
        self.nodes
            .mass
            .iter()
            .zip(&self.nodes.velocity)
            .map(|(&m, v)| 0.5 * m * v.length_squared())
            .sum()
    }

    /// Σ W V₀ over points, with reference volume V₀ = V / det F.
    pub fn stored_energy(&self) -> f64 {
        let points = &self.points;
        (0..points.len())
            .map(|p| {
                let j = points.deformation_gradient[p].determinant();
                points.energy_density[p] * points.volume[p] / j
            })
            .sum()
    }
}
