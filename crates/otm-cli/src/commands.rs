//! CLI command implementations.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use otm_exec::{ExecutionBackend, RayonBackend, SerialBackend};
use otm_io::{validate_deck, InputDeck, RunParams, RuntimeConfig};
use otm_material::{ConstitutiveModel, MaterialSet};
use otm_math::DVec3;
use otm_mesh::generators::tet_block;
use otm_meshless::support::bootstrap_from_mesh;
use otm_meshless::{GridSearch, MaxEntConfig, SearchConfig, SimulationState, StepPipeline};
use otm_telemetry::{EventBus, JsonLinesSink, TracingSink};
use tracing::info;

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Options of the `demo` command.
pub struct DemoOptions {
    pub deck: Option<PathBuf>,
    pub preset: String,
    pub steps: Option<u32>,
    pub threads: usize,
    pub events: Option<PathBuf>,
}

/// Validate a deck and print what it resolves to.
pub fn validate(path: &Path) -> CliResult {
    let deck = InputDeck::from_path(path)?;
    let config = validate_deck(&deck)?;

    println!("Deck: {}", path.display());
    println!("─────────────────");
    println!(
        "maxent: gamma = {}, max_iterations = {}, tolerance = {:e}",
        config.maxent.gamma, config.maxent.max_iterations, config.maxent.tolerance
    );
    println!(
        "search: radius_factor = {}, min_support_nodes = {}",
        config.search.radius_factor, config.search.min_support_nodes
    );
    println!(
        "run: {} steps of {:e} s on {:?} cells",
        config.run.steps, config.run.dt, config.run.cells
    );
    print_materials(&config.materials);
    println!();
    println!("OK");
    Ok(())
}

/// List material presets.
pub fn presets() {
    for name in MaterialSet::preset_names() {
        if let Some(model) = MaterialSet::preset(name) {
            let elastic = model.elastic();
            println!(
                "{name:<20} {:<16} K = {:.3e}  G = {:.3e}",
                model.name(),
                elastic.bulk_modulus,
                elastic.shear_modulus
            );
        }
    }
}

/// Run the stretch driver.
pub fn demo(options: &DemoOptions) -> CliResult {
    let mut config = match &options.deck {
        Some(path) => validate_deck(&InputDeck::from_path(path)?)?,
        None => default_config(&options.preset)?,
    };
    if let Some(steps) = options.steps {
        config.run.steps = steps;
    }

    let mut bus = EventBus::new().with_sink(TracingSink::new(tracing::Level::DEBUG));
    if let Some(path) = &options.events {
        bus = bus.with_sink(JsonLinesSink::new(BufWriter::new(File::create(path)?)));
    }

    if options.threads == 0 {
        drive(SerialBackend::new(), &config, bus)
    } else {
        drive(RayonBackend::with_threads(options.threads)?, &config, bus)
    }
}

/// Configuration for a single preset material and the default run.
fn default_config(preset: &str) -> CliResult<RuntimeConfig> {
    let model = MaterialSet::preset(preset).ok_or_else(|| {
        format!(
            "Unknown preset: '{preset}'. Available: {}",
            MaterialSet::preset_names().join(", ")
        )
    })?;
    Ok(RuntimeConfig {
        maxent: MaxEntConfig::default(),
        search: SearchConfig::default(),
        run: RunParams::default(),
        materials: MaterialSet::single(preset, model),
    })
}

fn drive<B: ExecutionBackend>(backend: B, config: &RuntimeConfig, bus: EventBus) -> CliResult {
    let run = &config.run;
    let mesh = tet_block(run.cells, run.extent);
    let mut state = SimulationState::default();
    bootstrap_from_mesh(&mut state, &mesh)?;

    let cell = (0..3)
        .map(|axis| run.extent[axis] / run.cells[axis] as f64)
        .fold(0.0_f64, f64::max);
    state.set_uniform_length_scale(run.length_scale_factor * cell);
    state.set_uniform_density(run.density);

    let search = GridSearch::new(config.search)?;
    let mut pipeline = StepPipeline::new(backend, config.maxent)?.with_bus(bus);
    let stats = pipeline.rebuild_shape_functions(&mut state)?;

    println!("OTM Stretch");
    println!("═══════════");
    println!(
        "{} nodes, {} points, {} support entries, h = {:.3e}",
        state.nodes.len(),
        state.points.len(),
        stats.support_entries,
        run.length_scale_factor * cell
    );
    print_materials(&config.materials);
    println!();
    println!(
        "{:>5} {:>12} {:>14} {:>14} {:>12} {:>10}",
        "step", "strain", "stored", "|net force|", "mass", "ms"
    );

    let increment = run.strain_rate * run.dt;
    let mut strain = 0.0;
    for step in 0..run.steps {
        if run.search_interval > 0 && step > 0 && step % run.search_interval == 0 {
            pipeline.refresh_support(&mut state, &search)?;
        }

        // Affine stretch about the x = 0 face.
        for (position, displacement) in state
            .nodes
            .position
            .iter_mut()
            .zip(state.nodes.displacement.iter_mut())
        {
            *displacement = DVec3::new(increment * position.x, 0.0, 0.0);
            *position += *displacement;
        }
        strain = (1.0 + strain) * (1.0 + increment) - 1.0;

        let report = pipeline.step(&mut state, &config.materials, run.dt)?;
        println!(
            "{:>5} {:>12.4e} {:>14.6e} {:>14.6e} {:>12.6e} {:>10.3}",
            report.step,
            strain,
            report.stored_energy,
            report.net_force.length(),
            report.nodal_mass,
            report.wall_time * 1e3
        );
    }

    pipeline.bus_mut().finish();
    info!(
        steps = run.steps,
        time = pipeline.time(),
        "stretch run complete"
    );
    Ok(())
}

fn print_materials(materials: &MaterialSet) {
    for id in materials.ids() {
        if let Some(model) = materials.get(id) {
            println!(
                "material {}: {} ({})",
                id.0,
                materials.name(id).unwrap_or("unnamed"),
                model.name()
            );
        }
    }
}
