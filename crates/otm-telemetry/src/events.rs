//! Simulation event types.
//!
//! Structured events emitted by the step pipeline. Events are
//! lightweight value types that carry just enough data to be useful
//! for monitoring and debugging.

use serde::{Deserialize, Serialize};

/// A simulation event emitted by the engine.
///
/// Events are tagged with a step index and carry domain-specific data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Step number (0-indexed).
    pub step: u64,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Step started.
    StepBegin {
        /// Simulation time at the start of the step (seconds).
        time: f64,
        /// Time increment handed to the constitutive update.
        dt: f64,
    },

    /// Step completed.
    StepEnd {
        /// Wall-clock time for the kernels of the step (seconds).
        wall_time: f64,
    },

    /// Support relation and shape functions were rebuilt.
    ShapeFunctionsRebuilt {
        points: usize,
        /// Total number of point-node pairs.
        support_entries: usize,
        /// Largest Newton iteration count over all points.
        max_iterations: u32,
        /// Points accepted at the relaxed tolerance.
        relaxed_points: usize,
    },

    /// A kernel rejected the step.
    KernelFailure {
        /// Kernel name (e.g., "kinematics").
        kernel: String,
        /// Lowest failing point, if attributable.
        point: Option<u32>,
        /// Rendered error message.
        message: String,
        /// Whether the driver may retry with a smaller step.
        recoverable: bool,
    },

    /// Mass bookkeeping after lumping.
    Mass {
        /// Σ m_n over nodes.
        nodal: f64,
        /// Σ ρ V over points.
        point: f64,
    },

    /// Energy snapshot at current state.
    Energy {
        /// ½ Σ m v² over nodes.
        kinetic: f64,
        /// Σ W V over points.
        stored: f64,
    },
}

impl SimulationEvent {
    /// Creates a new event for the given step.
    pub fn new(step: u64, kind: EventKind) -> Self {
        Self { step, kind }
    }
}
