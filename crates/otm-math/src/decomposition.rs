//! Symmetric eigen-decomposition and the tensor functions built on it.
//!
//! The J2 plasticity update works with Hencky (logarithmic) strains:
//! `ε = ½ log(Fe Feᵀ)` and the exponential map `Fp ← exp(Δγ N) Fp`.
//! Both reduce to scalar functions of eigenvalues for symmetric tensors.

use glam::{DMat3, DVec3};

/// Maximum number of cyclic Jacobi sweeps.
const MAX_SWEEPS: usize = 64;

/// Eigen-decomposition `A = V diag(λ) Vᵀ` of a symmetric matrix.
#[derive(Debug, Clone, Copy)]
pub struct SymmetricEigen {
    /// Eigenvalues (unsorted).
    pub values: DVec3,
    /// Orthonormal eigenvectors stored as columns.
    pub vectors: DMat3,
}

impl SymmetricEigen {
    /// Rebuild `V diag(f(λ)) Vᵀ`.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> DMat3 {
        let scaled = DMat3::from_cols(
            self.vectors.x_axis * f(self.values.x),
            self.vectors.y_axis * f(self.values.y),
            self.vectors.z_axis * f(self.values.z),
        );
        scaled * self.vectors.transpose()
    }
}

/// Cyclic Jacobi eigen-decomposition of a symmetric 3×3 matrix.
///
/// Only the upper triangle is read (the input is symmetrized first).
pub fn symmetric_eigen(a: &DMat3) -> SymmetricEigen {
    let sym = (*a + a.transpose()) * 0.5;
    let mut m = [[0.0_f64; 3]; 3];
    for (r, row) in m.iter_mut().enumerate() {
        for (c, entry) in row.iter_mut().enumerate() {
            *entry = sym.col(c)[r];
        }
    }
    let mut v = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    for _ in 0..MAX_SWEEPS {
        let off = m[0][1] * m[0][1] + m[0][2] * m[0][2] + m[1][2] * m[1][2];
        let diag = m[0][0] * m[0][0] + m[1][1] * m[1][1] + m[2][2] * m[2][2];
        if off <= f64::EPSILON * f64::EPSILON * diag || off == 0.0 {
            break;
        }
        for (p, q) in [(0usize, 1usize), (0, 2), (1, 2)] {
            if m[p][q] == 0.0 {
                continue;
            }
            let theta = (m[q][q] - m[p][p]) / (2.0 * m[p][q]);
            let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
            let t = if theta == 0.0 { 1.0 } else { t };
            let c = 1.0 / (t * t + 1.0).sqrt();
            let s = t * c;

            for k in 0..3 {
                let mkp = m[k][p];
                let mkq = m[k][q];
                m[k][p] = c * mkp - s * mkq;
                m[k][q] = s * mkp + c * mkq;
            }
            for k in 0..3 {
                let mpk = m[p][k];
                let mqk = m[q][k];
                m[p][k] = c * mpk - s * mqk;
                m[q][k] = s * mpk + c * mqk;
            }
            for row in v.iter_mut() {
                let vp = row[p];
                let vq = row[q];
                row[p] = c * vp - s * vq;
                row[q] = s * vp + c * vq;
            }
        }
    }

    let column = |j: usize| DVec3::new(v[0][j], v[1][j], v[2][j]);
    SymmetricEigen {
        values: DVec3::new(m[0][0], m[1][1], m[2][2]),
        vectors: DMat3::from_cols(column(0), column(1), column(2)),
    }
}

/// Logarithm of a symmetric positive-definite matrix.
///
/// Returns `None` if any eigenvalue is not strictly positive.
pub fn log_spd(a: &DMat3) -> Option<DMat3> {
    let eigen = symmetric_eigen(a);
    if eigen.values.min_element() <= 0.0 {
        return None;
    }
    Some(eigen.map(f64::ln))
}

/// Exponential of a symmetric matrix.
pub fn exp_symmetric(a: &DMat3) -> DMat3 {
    symmetric_eigen(a).map(f64::exp)
}
