//! Bidirectional point↔node adjacency.
//!
//! The **support** relation lists, for every point, the nodes whose
//! shape functions are non-zero there, together with the shape value
//! and gradient of each pair. The **influence** relation is its
//! transpose: for every node, the points it contributes to, each with
//! a back-index to the flat support entry of the same pair.
//!
//! ```text
//! support offsets:   [0, 3, 5]          point 0 → entries 0..3
//! support nodes:     [n0 n1 n2 | n1 n3]
//! influence offsets: [0, 1, 3, 4, 5]    node 1 → entries 1..3
//! influence points:  [p0 | p0 p1 | p0 | p1]
//! back-index:        [0  | 1  3  | 2  | 4 ]
//! ```
//!
//! Both relations are built together by one constructor and membership
//! never changes afterwards; only shape values and gradients are
//! mutable.

use otm_math::sparse::OffsetTable;
use otm_math::DVec3;
use otm_types::{NodeId, OtmError, OtmResult, PointId};

/// Point → node relation with per-entry shape data.
#[derive(Debug, Clone, Default)]
pub struct Support {
    offsets: OffsetTable,
    nodes: Vec<NodeId>,
    /// Owning point of every flat entry.
    owners: Vec<PointId>,
    values: Vec<f64>,
    gradients: Vec<DVec3>,
}

impl Support {
    /// Offset table (one row per point).
    pub fn offsets(&self) -> &OffsetTable {
        &self.offsets
    }

    /// Flat entry range of point `p`.
    #[inline]
    pub fn range(&self, p: PointId) -> std::ops::Range<usize> {
        self.offsets.range(p.index())
    }

    /// Support nodes of point `p`.
    #[inline]
    pub fn nodes_of(&self, p: PointId) -> &[NodeId] {
        &self.nodes[self.range(p)]
    }

    /// Shape values of point `p`, aligned with [`nodes_of`](Self::nodes_of).
    #[inline]
    pub fn values_of(&self, p: PointId) -> &[f64] {
        &self.values[self.range(p)]
    }

    /// Shape gradients of point `p`, aligned with [`nodes_of`](Self::nodes_of).
    #[inline]
    pub fn gradients_of(&self, p: PointId) -> &[DVec3] {
        &self.gradients[self.range(p)]
    }

    /// Node id of flat entry `entry`.
    #[inline]
    pub fn node(&self, entry: usize) -> NodeId {
        self.nodes[entry]
    }

    /// Owning point of flat entry `entry`.
    #[inline]
    pub fn owner(&self, entry: usize) -> PointId {
        self.owners[entry]
    }

    /// Flat shape values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Flat shape gradients.
    pub fn gradients(&self) -> &[DVec3] {
        &self.gradients
    }

    /// Mutable flat shape values. Membership stays fixed.
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Mutable flat shape gradients. Membership stays fixed.
    pub fn gradients_mut(&mut self) -> &mut [DVec3] {
        &mut self.gradients
    }

    /// Mutable shape values and gradients together.
    pub fn shape_data_mut(&mut self) -> (&mut [f64], &mut [DVec3]) {
        (&mut self.values, &mut self.gradients)
    }

    /// Entry owners alongside mutable gradients.
    pub fn owners_and_gradients_mut(&mut self) -> (&[PointId], &mut [DVec3]) {
        (&self.owners, &mut self.gradients)
    }

    /// Total number of point-node pairs.
    pub fn entry_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Node → point relation.
#[derive(Debug, Clone, Default)]
pub struct Influence {
    offsets: OffsetTable,
    points: Vec<PointId>,
    support_entries: Vec<usize>,
}

impl Influence {
    /// Offset table (one row per node).
    pub fn offsets(&self) -> &OffsetTable {
        &self.offsets
    }

    /// Points influenced by node `n`, in ascending point order.
    #[inline]
    pub fn points_of(&self, n: NodeId) -> &[PointId] {
        &self.points[self.offsets.range(n.index())]
    }

    /// Flat support entries paired with [`points_of`](Self::points_of).
    #[inline]
    pub fn support_entries_of(&self, n: NodeId) -> &[usize] {
        &self.support_entries[self.offsets.range(n.index())]
    }
}

/// The two relations, built together.
#[derive(Debug, Clone)]
pub struct Adjacency {
    support: Support,
    influence: Influence,
}

impl Default for Adjacency {
    fn default() -> Self {
        Self::empty(0, 0)
    }
}

impl Adjacency {
    /// Adjacency where every point has an empty support.
    pub fn empty(points: usize, nodes: usize) -> Self {
        Self {
            support: Support {
                offsets: OffsetTable::uniform(points, 0),
                ..Support::default()
            },
            influence: Influence {
                offsets: OffsetTable::uniform(nodes, 0),
                ..Influence::default()
            },
        }
    }

    /// Builds both relations from per-point node lists.
    ///
    /// Shape values start at `1 / |support|` and gradients at zero.
    /// Fails with `AdjacencyInconsistency` if a list references a node
    /// outside `0..node_count` or repeats a node.
    pub fn from_support_lists(node_count: usize, lists: &[Vec<NodeId>]) -> OtmResult<Self> {
        let offsets = OffsetTable::from_counts(lists.iter().map(Vec::len));
        let total = offsets.total();

        let mut nodes = Vec::with_capacity(total);
        let mut owners = Vec::with_capacity(total);
        let mut values = Vec::with_capacity(total);
        let mut influence_counts = vec![0usize; node_count];

        for (p, list) in lists.iter().enumerate() {
            for (i, &n) in list.iter().enumerate() {
                if n.index() >= node_count {
                    return Err(OtmError::AdjacencyInconsistency(format!(
                        "point {p} references node {} of {node_count}",
                        n.0
                    )));
                }
                if list[..i].contains(&n) {
                    return Err(OtmError::AdjacencyInconsistency(format!(
                        "point {p} lists node {} twice",
                        n.0
                    )));
                }
                influence_counts[n.index()] += 1;
            }
            let share = 1.0 / list.len() as f64;
            nodes.extend_from_slice(list);
            owners.extend(std::iter::repeat(PointId(p as u32)).take(list.len()));
            values.extend(std::iter::repeat(share).take(list.len()));
        }

        // Counting sort of support entries by node; visiting entries in
        // flat order keeps each node's points ascending.
        let influence_offsets = OffsetTable::from_counts(influence_counts);
        let mut cursor: Vec<usize> = influence_offsets.as_slice()[..node_count].to_vec();
        let mut points = vec![PointId(0); total];
        let mut support_entries = vec![0usize; total];
        for (entry, (&n, &p)) in nodes.iter().zip(&owners).enumerate() {
            let slot = cursor[n.index()];
            points[slot] = p;
            support_entries[slot] = entry;
            cursor[n.index()] += 1;
        }

        let adjacency = Self {
            support: Support {
                offsets,
                nodes,
                owners,
                values,
                gradients: vec![DVec3::ZERO; total],
            },
            influence: Influence {
                offsets: influence_offsets,
                points,
                support_entries,
            },
        };
        if cfg!(debug_assertions) {
            adjacency.validate()?;
        }
        Ok(adjacency)
    }

    /// Point → node relation.
    pub fn support(&self) -> &Support {
        &self.support
    }

    /// Mutable point → node relation (shape data only).
    pub fn support_mut(&mut self) -> &mut Support {
        &mut self.support
    }

    /// Node → point relation.
    pub fn influence(&self) -> &Influence {
        &self.influence
    }

    /// Number of points (support rows).
    pub fn point_count(&self) -> usize {
        self.support.offsets.rows()
    }

    /// Number of nodes (influence rows).
    pub fn node_count(&self) -> usize {
        self.influence.offsets.rows()
    }

    /// Checks the mutual consistency of the two relations.
    ///
    /// Every support entry (p, n) must be referenced by exactly one
    /// influence entry of node n that names point p.
    pub fn validate(&self) -> OtmResult<()> {
        let support = &self.support;
        let influence = &self.influence;
        let total = support.entry_count();
        if influence.points.len() != total || influence.support_entries.len() != total {
            return Err(OtmError::AdjacencyInconsistency(format!(
                "support has {total} entries, influence has {}",
                influence.points.len()
            )));
        }
        if support.offsets.total() != total
            || support.owners.len() != total
            || support.values.len() != total
            || support.gradients.len() != total
            || influence.offsets.total() != total
        {
            return Err(OtmError::AdjacencyInconsistency(
                "flat arrays disagree with offset tables".into(),
            ));
        }

        let mut seen = vec![false; total];
        for n in 0..self.node_count() {
            let range = influence.offsets.range(n);
            for k in range {
                let entry = influence.support_entries[k];
                let p = influence.points[k];
                if entry >= total {
                    return Err(OtmError::AdjacencyInconsistency(format!(
                        "node {n} back-index {entry} out of range"
                    )));
                }
                if support.nodes[entry].index() != n || support.owners[entry] != p {
                    return Err(OtmError::AdjacencyInconsistency(format!(
                        "node {n} back-index {entry} resolves to pair ({}, {})",
                        support.owners[entry].0, support.nodes[entry].0
                    )));
                }
                if support.offsets.row_of(entry) != Some(p.index()) {
                    return Err(OtmError::AdjacencyInconsistency(format!(
                        "support entry {entry} is outside the row of point {}",
                        p.0
                    )));
                }
                if std::mem::replace(&mut seen[entry], true) {
                    return Err(OtmError::AdjacencyInconsistency(format!(
                        "support entry {entry} referenced twice"
                    )));
                }
            }
        }
        Ok(())
    }
}
