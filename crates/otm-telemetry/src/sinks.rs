//! Pluggable event sinks.
//!
//! Sinks consume events from the bus and process them (capture in
//! memory, forward to `tracing`, write JSON lines).

use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::events::{EventKind, SimulationEvent};

/// Trait for event consumers.
///
/// Implement this to create custom telemetry outputs.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &SimulationEvent);

    /// Called when the simulation ends. Flush buffers, close files, etc.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// Collects events in memory.
///
/// Clones share the same buffer, so a test can keep one handle and
/// give the other to the bus.
#[derive(Clone, Default)]
pub struct VecSink {
    events: Arc<Mutex<Vec<SimulationEvent>>>,
}

impl VecSink {
    /// Creates an empty vec sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the collected events.
    pub fn events(&self) -> Vec<SimulationEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of collected events.
    pub fn len(&self) -> usize {
        self.events().len()
    }

    /// Returns true if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &SimulationEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// A sink that logs events using the `tracing` crate.
///
/// Kernel failures are always logged at `WARN`; everything else at the
/// configured level.
pub struct TracingSink {
    level: tracing::Level,
}

impl TracingSink {
    /// Creates a new tracing sink at the given log level.
    pub fn new(level: tracing::Level) -> Self {
        Self { level }
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &SimulationEvent) {
        if let EventKind::KernelFailure { kernel, message, .. } = &event.kind {
            tracing::warn!(step = event.step, kernel = %kernel, "{message}");
            return;
        }
        match self.level {
            tracing::Level::TRACE => {
                tracing::trace!(step = event.step, event = ?event.kind, "simulation_event")
            }
            tracing::Level::DEBUG => {
                tracing::debug!(step = event.step, event = ?event.kind, "simulation_event")
            }
            _ => tracing::info!(step = event.step, event = ?event.kind, "simulation_event"),
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}

/// Writes one JSON object per event.
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
    failed: bool,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed: false,
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn handle(&mut self, event: &SimulationEvent) {
        if self.failed {
            return;
        }
        let written = serde_json::to_writer(&mut self.writer, event)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"));
        if let Err(e) = written {
            // Stop writing after the first failure instead of logging per event.
            tracing::warn!("json sink disabled: {e}");
            self.failed = true;
        }
    }

    fn finalize(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!("json sink flush failed: {e}");
        }
    }

    fn name(&self) -> &str {
        "json_lines_sink"
    }
}
