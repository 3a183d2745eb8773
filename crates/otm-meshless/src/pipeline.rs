//! Step pipeline: kernel sequencing for one step with telemetry.
//!
//! The pipeline does not integrate in time. The driver moves the nodes,
//! writes the nodal displacements since the previous step, and calls
//! [`StepPipeline::step`], which runs
//!
//! ```text
//! kinematics → materials → mass lumping → forces → momentum
//! ```
//!
//! and then clears the consumed displacements. Support refreshes are
//! requested explicitly with [`StepPipeline::refresh_support`].

use std::time::Instant;

use otm_exec::ExecutionBackend;
use otm_material::MaterialSet;
use otm_math::{DMat3, DVec3};
use otm_telemetry::{EventBus, EventKind};
use otm_types::{OtmError, OtmResult};
use tracing::info;

use crate::assembly::{
    lump_nodal_mass, net_force, total_nodal_mass, total_point_mass, update_nodal_force,
    update_nodal_momentum,
};
use crate::config::MaxEntConfig;
use crate::constitutive::update_all_materials;
use crate::kinematics::update_kinematics;
use crate::search::SupportSearch;
use crate::shape::{update_shape_functions, ShapeStats};
use crate::state::{PointFields, SimulationState};
use crate::support::build_support_relation;

/// Summary of one completed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Index of the completed step.
    pub step: u64,
    /// Wall-clock time of the kernels (seconds).
    pub wall_time: f64,
    pub nodal_mass: f64,
    pub point_mass: f64,
    pub kinetic_energy: f64,
    pub stored_energy: f64,
    pub net_force: DVec3,
}

/// Runs the kernels of a step on one backend and reports to a bus.
pub struct StepPipeline<B: ExecutionBackend> {
    backend: B,
    maxent: MaxEntConfig,
    bus: EventBus,
    step: u64,
    time: f64,
}

impl<B: ExecutionBackend> StepPipeline<B> {
    /// Creates a pipeline whose bus has no sinks yet.
    pub fn new(backend: B, maxent: MaxEntConfig) -> OtmResult<Self> {
        maxent.validate()?;
        Ok(Self {
            backend,
            maxent,
            bus: EventBus::new(),
            step: 0,
            time: 0.0,
        })
    }

    /// Replaces the event bus.
    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Index of the next step.
    pub fn step_index(&self) -> u64 {
        self.step
    }

    /// Accumulated simulation time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Recomputes shape functions on the current support.
    pub fn rebuild_shape_functions(&mut self, state: &mut SimulationState) -> OtmResult<ShapeStats> {
        let result = update_shape_functions(state, &self.maxent, &self.backend);
        let stats = self.observe("shape_functions", result)?;
        self.bus.record(
            self.step,
            EventKind::ShapeFunctionsRebuilt {
                points: stats.points,
                support_entries: stats.support_entries,
                max_iterations: stats.max_iterations,
                relaxed_points: stats.relaxed_points,
            },
        );
        self.bus.flush();
        Ok(stats)
    }

    /// Rebuilds the support relation with `search`, then the shape functions.
    ///
    /// If either stage fails the previous adjacency is restored.
    pub fn refresh_support<S>(
        &mut self,
        state: &mut SimulationState,
        search: &S,
    ) -> OtmResult<ShapeStats>
    where
        S: SupportSearch + ?Sized,
    {
        let previous = state.adjacency.clone();
        let result = build_support_relation(state, search);
        self.observe("support", result)?;
        self.rebuild_shape_functions(state).map_err(|e| {
            state.adjacency = previous;
            e
        })
    }

    /// Runs the kernels of one step with time increment `dt`.
    ///
    /// On failure the point fields, shape gradients and nodal
    /// displacements are restored, so the driver can retry with a
    /// smaller increment. Nodal mass, force and momentum may hold
    /// partial results until the next successful step.
    pub fn step(
        &mut self,
        state: &mut SimulationState,
        materials: &MaterialSet,
        dt: f64,
    ) -> OtmResult<StepReport> {
        self.bus.record(
            self.step,
            EventKind::StepBegin {
                time: self.time,
                dt,
            },
        );
        let started = Instant::now();

        let checkpoint = Checkpoint::capture(state);
        let result = update_kinematics(state, &self.backend);
        self.observe("kinematics", result)?;
        self.backend.fill(&mut state.nodes.displacement, DVec3::ZERO);
        if let Err(e) = self.update_fields(state, materials, dt) {
            checkpoint.restore(state);
            return Err(e);
        }

        let report = StepReport {
            step: self.step,
            wall_time: started.elapsed().as_secs_f64(),
            nodal_mass: total_nodal_mass(state),
            point_mass: total_point_mass(state),
            kinetic_energy: state.kinetic_energy(),
            stored_energy: state.stored_energy(),
            net_force: net_force(state),
        };
        self.bus.record(
            self.step,
            EventKind::Mass {
                nodal: report.nodal_mass,
                point: report.point_mass,
            },
        );
        self.bus.record(
            self.step,
            EventKind::Energy {
                kinetic: report.kinetic_energy,
                stored: report.stored_energy,
            },
        );
        self.bus.record(
            self.step,
            EventKind::StepEnd {
                wall_time: report.wall_time,
            },
        );
        self.bus.flush();

        self.step += 1;
        self.time += dt;
        Ok(report)
    }

    /// Kernels that follow kinematics within a step.
    fn update_fields(
        &mut self,
        state: &mut SimulationState,
        materials: &MaterialSet,
        dt: f64,
    ) -> OtmResult<()> {
        let result = update_all_materials(state, materials, dt, &self.backend);
        self.observe("materials", result)?;
        let result = lump_nodal_mass(state, &self.backend);
        self.observe("mass", result)?;
        let result = update_nodal_force(state, &self.backend);
        self.observe("force", result)?;
        let result = update_nodal_momentum(state, &self.backend);
        self.observe("momentum", result)
    }

    /// Resets every point to the undeformed configuration.
    pub fn reset_deformation(&mut self, state: &mut SimulationState) {
        crate::kinematics::reset_deformation_gradients(state);
        self.backend.fill(&mut state.points.stress, DMat3::ZERO);
        info!(step = self.step, "reset point deformation");
    }

    /// Reports a kernel failure to the bus and passes the result on.
    fn observe<T>(&mut self, kernel: &str, result: OtmResult<T>) -> OtmResult<T> {
        if let Err(e) = &result {
            self.report_failure(kernel, e);
        }
        result
    }

    fn report_failure(&mut self, kernel: &str, error: &OtmError) {
        self.bus.record(
            self.step,
            EventKind::KernelFailure {
                kernel: kernel.to_string(),
                point: error.point().map(|p| p.0),
                message: error.to_string(),
                recoverable: error.is_recoverable(),
            },
        );
        self.bus.flush();
    }
}

/// State a step mutates before its last fallible kernel.
struct Checkpoint {
    points: PointFields,
    gradients: Vec<DVec3>,
    displacement: Vec<DVec3>,
}

impl Checkpoint {
    fn capture(state: &SimulationState) -> Self {
        Self {
            points: state.points.clone(),
            gradients: state.adjacency.support().gradients().to_vec(),
            displacement: state.nodes.displacement.clone(),
        }
    }

    fn restore(self, state: &mut SimulationState) {
        state.points = self.points;
        state
            .adjacency
            .support_mut()
            .gradients_mut()
            .copy_from_slice(&self.gradients);
        state.nodes.displacement = self.displacement;
    }
}
