//! # otm-telemetry
//!
//! Event bus for simulation telemetry. Kernels and the step pipeline
//! emit structured events (step timing, shape-function rebuilds,
//! kernel failures, mass and energy snapshots) that are consumed by
//! pluggable sinks (in-memory capture, `tracing`, JSON lines).

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, SimulationEvent};
pub use sinks::{EventSink, JsonLinesSink, TracingSink, VecSink};
