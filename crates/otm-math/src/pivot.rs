//! Gaussian elimination with full (row and column) pivoting for 3×3 systems.
//!
//! The max-ent Newton Jacobian `−Σ w r⊗r` is rank-deficient whenever the
//! support nodes are coplanar or collinear with the point. Full pivoting
//! reveals the rank: once the largest remaining pivot falls below
//! [`PIVOT_RELATIVE_THRESHOLD`] times the first pivot, the remaining
//! unknowns span the null space and are set to zero. For a consistent
//! right-hand side this yields a solution supported on the range of `A`.

use glam::{DMat3, DVec3};
use otm_types::constants::PIVOT_RELATIVE_THRESHOLD;

/// Result of a full-pivot elimination.
#[derive(Debug, Clone, Copy)]
pub struct PivotSolution {
    /// Solution vector (null-space components zeroed).
    pub x: DVec3,
    /// Numerical rank detected during elimination (0..=3).
    pub rank: usize,
}

/// Solves `A x = b` with full pivoting, zeroing null-space components.
pub fn solve_full_pivot(a: &DMat3, b: DVec3) -> DVec3 {
    solve_full_pivot_ranked(a, b).x
}

/// Solves `A x = b` with full pivoting and reports the detected rank.
pub fn solve_full_pivot_ranked(a: &DMat3, b: DVec3) -> PivotSolution {
    // Row-major working copy.
    let mut m = [[0.0_f64; 3]; 3];
    for (r, row) in m.iter_mut().enumerate() {
        for (c, entry) in row.iter_mut().enumerate() {
            *entry = a.col(c)[r];
        }
    }
    let mut rhs = [b.x, b.y, b.z];
    let mut columns = [0usize, 1, 2];
    let mut rank = 3;
    let mut first_pivot = 0.0_f64;

    for k in 0..3 {
        let (mut pivot_row, mut pivot_col, mut pivot_mag) = (k, k, 0.0_f64);
        for (r, row) in m.iter().enumerate().skip(k) {
            for (c, value) in row.iter().enumerate().skip(k) {
                if value.abs() > pivot_mag {
                    pivot_mag = value.abs();
                    pivot_row = r;
                    pivot_col = c;
                }
            }
        }
        if k == 0 {
            first_pivot = pivot_mag;
        }
        if pivot_mag == 0.0 || pivot_mag <= PIVOT_RELATIVE_THRESHOLD * first_pivot {
            rank = k;
            break;
        }

        m.swap(k, pivot_row);
        rhs.swap(k, pivot_row);
        if pivot_col != k {
            for row in m.iter_mut() {
                row.swap(k, pivot_col);
            }
            columns.swap(k, pivot_col);
        }

        for r in (k + 1)..3 {
            let factor = m[r][k] / m[k][k];
            if factor != 0.0 {
                for c in k..3 {
                    m[r][c] -= factor * m[k][c];
                }
                rhs[r] -= factor * rhs[k];
            }
        }
    }

    let mut y = [0.0_f64; 3];
    for k in (0..rank).rev() {
        let mut sum = rhs[k];
        for c in (k + 1)..rank {
            sum -= m[k][c] * y[c];
        }
        y[k] = sum / m[k][k];
    }

    let mut x = [0.0_f64; 3];
    for (k, &column) in columns.iter().enumerate() {
        x[column] = y[k];
    }

    PivotSolution {
        x: DVec3::from_array(x),
        rank,
    }
}

/// Inverse of `A` by full-pivot elimination against the identity columns.
///
/// Returns `None` if `A` is numerically singular.
pub fn inverse_full_pivot(a: &DMat3) -> Option<DMat3> {
    let mut cols = [DVec3::ZERO; 3];
    for (j, col) in cols.iter_mut().enumerate() {
        let mut e = DVec3::ZERO;
        e[j] = 1.0;
        let solution = solve_full_pivot_ranked(a, e);
        if solution.rank < 3 {
            return None;
        }
        *col = solution.x;
    }
    Some(DMat3::from_cols(cols[0], cols[1], cols[2]))
}
