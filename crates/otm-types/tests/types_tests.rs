//! Integration tests for otm-types.

use otm_types::{ElementId, MaterialId, NodeId, OtmError, PointId};

// ─── ID Tests ──────────────────────────────────────────────────

#[test]
fn node_id_index() {
    let id = NodeId(42);
    assert_eq!(id.index(), 42);
}

#[test]
fn point_id_index() {
    let id = PointId(7);
    assert_eq!(id.index(), 7);
}

#[test]
fn ids_convert_from_raw() {
    assert_eq!(NodeId::from(3), NodeId(3));
    assert_eq!(PointId::from(5), PointId(5));
    assert_eq!(ElementId::from(9).index(), 9);
    assert_eq!(MaterialId::from(2).index(), 2);
}

#[test]
fn ids_are_serializable() {
    let id = PointId(100);
    let json = serde_json::to_string(&id).unwrap();
    let deserialized: PointId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, deserialized);
}

// ─── Error Tests ──────────────────────────────────────────────

#[test]
fn newton_divergence_display() {
    let err = OtmError::NewtonDivergence {
        point: PointId(12),
        iterations: 16,
        residual: 1.5e-2,
    };
    let msg = err.to_string();
    assert!(msg.contains("point 12"));
    assert!(msg.contains("16"));
    assert!(msg.contains("1.50e-2"));
}

#[test]
fn jacobian_failure_carries_context() {
    let err = OtmError::NonPositiveJacobian {
        point: PointId(3),
        jacobian: -0.25,
    };
    assert!(err.is_recoverable());
    assert_eq!(err.point(), Some(PointId(3)));
    assert!(err.to_string().contains("point 3"));
}

#[test]
fn configuration_errors_are_not_recoverable() {
    let err = OtmError::InvalidMaterial("material 4 is not defined".into());
    assert!(!err.is_recoverable());
    assert_eq!(err.point(), None);
    assert!(err.to_string().contains("material 4"));
}
