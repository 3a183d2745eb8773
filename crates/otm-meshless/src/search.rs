//! Neighbor search: which nodes support each point.
//!
//! The search is a collaborator behind [`SupportSearch`]. The supplied
//! [`GridSearch`] bins nodes into a uniform hash grid and collects, for
//! every point, the nodes within `radius_factor · h` of it.

use std::collections::HashMap;

use otm_math::DVec3;
use otm_types::{NodeId, OtmError, OtmResult};

use crate::config::SearchConfig;
use crate::state::SimulationState;

/// Trait for support (point → nodes) search strategies.
pub trait SupportSearch {
    /// Support node list of every point, indexed by point id.
    fn find_support(&self, state: &SimulationState) -> OtmResult<Vec<Vec<NodeId>>>;

    /// Smallest acceptable support size.
    fn min_support_nodes(&self) -> usize;

    /// Returns the search name.
    fn name(&self) -> &str;
}

type CellKey = (i64, i64, i64);

/// Uniform-grid radius search.
///
/// The cell size equals the largest search radius, so each point only
/// visits the cells overlapping its search ball.
#[derive(Debug, Clone, Default)]
pub struct GridSearch {
    config: SearchConfig,
}

impl GridSearch {
    pub fn new(config: SearchConfig) -> OtmResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn cell_key(position: DVec3, inv_cell_size: f64) -> CellKey {
        let c = (position * inv_cell_size).floor();
        (c.x as i64, c.y as i64, c.z as i64)
    }
}

impl SupportSearch for GridSearch {
    fn find_support(&self, state: &SimulationState) -> OtmResult<Vec<Vec<NodeId>>> {
        let points = &state.points;
        let mut max_radius = 0.0_f64;
        for (p, &h) in points.length_scale.iter().enumerate() {
            if !(h > 0.0 && h.is_finite()) {
                return Err(OtmError::InvalidConfig(format!(
                    "point {p} has length scale {h}, expected a positive value"
                )));
            }
            max_radius = max_radius.max(self.config.radius_factor * h);
        }
        if points.is_empty() {
            return Ok(Vec::new());
        }

        let inv_cell_size = 1.0 / max_radius;
        let mut grid: HashMap<CellKey, Vec<u32>> = HashMap::new();
        for (n, &x) in state.nodes.position.iter().enumerate() {
            grid.entry(Self::cell_key(x, inv_cell_size))
                .or_default()
                .push(n as u32);
        }

        let lists = points
            .position
            .iter()
            .zip(&points.length_scale)
            .map(|(&x, &h)| {
                let radius = self.config.radius_factor * h;
                let lo = Self::cell_key(x - DVec3::splat(radius), inv_cell_size);
                let hi = Self::cell_key(x + DVec3::splat(radius), inv_cell_size);

                let mut found: Vec<(f64, u32)> = Vec::new();
                for cx in lo.0..=hi.0 {
                    for cy in lo.1..=hi.1 {
                        for cz in lo.2..=hi.2 {
                            let Some(cell) = grid.get(&(cx, cy, cz)) else {
                                continue;
                            };
                            for &n in cell {
                                let d2 = state.nodes.position[n as usize].distance_squared(x);
                                if d2 <= radius * radius {
                                    found.push((d2, n));
                                }
                            }
                        }
                    }
                }

                if let Some(max) = self.config.max_support_nodes {
                    found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                    found.truncate(max);
                }
                let mut nodes: Vec<NodeId> = found.into_iter().map(|(_, n)| NodeId(n)).collect();
                nodes.sort_unstable();
                nodes
            })
            .collect();
        Ok(lists)
    }

    fn min_support_nodes(&self) -> usize {
        self.config.min_support_nodes
    }

    fn name(&self) -> &str {
        "grid"
    }
}
