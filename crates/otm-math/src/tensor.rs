//! Second-order tensor helpers on top of `glam::DMat3`.
//!
//! `glam` stores matrices column-major; `m.col(j)[i]` is entry (i, j).

use glam::{DMat3, DVec3};

/// Outer product `a ⊗ b` (entry (i, j) = a_i b_j).
#[inline]
pub fn outer(a: DVec3, b: DVec3) -> DMat3 {
    DMat3::from_cols(a * b.x, a * b.y, a * b.z)
}

/// Trace of a 3×3 matrix.
#[inline]
pub fn trace(m: &DMat3) -> f64 {
    m.x_axis.x + m.y_axis.y + m.z_axis.z
}

/// Deviatoric part `m − tr(m)/3 · I`.
#[inline]
pub fn deviator(m: &DMat3) -> DMat3 {
    *m - DMat3::from_diagonal(DVec3::splat(trace(m) / 3.0))
}

/// Double contraction `a : b = Σ a_ij b_ij`.
#[inline]
pub fn contract(a: &DMat3, b: &DMat3) -> f64 {
    a.x_axis.dot(b.x_axis) + a.y_axis.dot(b.y_axis) + a.z_axis.dot(b.z_axis)
}

/// Frobenius norm `sqrt(m : m)`.
#[inline]
pub fn frobenius_norm(m: &DMat3) -> f64 {
    contract(m, m).sqrt()
}

/// Symmetric part `(m + mᵀ) / 2`.
#[inline]
pub fn symmetric_part(m: &DMat3) -> DMat3 {
    (*m + m.transpose()) * 0.5
}

/// Returns true if every entry of `m` is finite.
#[inline]
pub fn is_finite(m: &DMat3) -> bool {
    m.x_axis.is_finite() && m.y_axis.is_finite() && m.z_axis.is_finite()
}
