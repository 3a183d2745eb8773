//! # otm-meshless
//!
//! Optimal Transportation Meshfree discretization core: shape
//! functions, updated-Lagrangian kinematics, nodal assembly and
//! constitutive dispatch over two independent index spaces (nodes and
//! material points).
//!
//! ## Key Types
//!
//! - [`SimulationState`]: SoA buffers for node and point fields plus the adjacency
//! - [`Adjacency`]: support (point → nodes) and influence (node → points) relations
//! - [`SupportSearch`] / [`GridSearch`]: neighbor search collaborators
//! - [`MaxEntConfig`]: max-ent shape-function parameters
//! - [`StepPipeline`]: kernel sequencing for one step with telemetry
//!
//! ## Kernels
//!
//! Every kernel takes `&mut SimulationState` plus an
//! [`ExecutionBackend`](otm_exec::ExecutionBackend) and returns
//! `OtmResult`. Kernels that can fail on individual points compute
//! everything first and write nothing on failure.
//!
//! | Module | Entry point |
//! |---|---|
//! | [`support`] | `bootstrap_from_mesh`, `build_support_relation` |
//! | [`shape`] | `update_shape_functions` |
//! | [`kinematics`] | `update_kinematics` |
//! | [`constitutive`] | `update_material_state`, `update_all_materials` |
//! | [`assembly`] | `update_nodal_force`, `lump_nodal_mass`, `update_nodal_momentum` |

pub mod adjacency;
pub mod assembly;
pub mod config;
pub mod constitutive;
pub mod kinematics;
pub mod pipeline;
pub mod search;
pub mod shape;
pub mod state;
pub mod support;

pub use adjacency::{Adjacency, Influence, Support};
pub use config::{MaxEntConfig, SearchConfig};
pub use pipeline::{StepPipeline, StepReport};
pub use search::{GridSearch, SupportSearch};
pub use shape::{MaxEntSolution, ShapeStats};
pub use state::{NodeFields, PointFields, ProblemSize, SimulationState};
