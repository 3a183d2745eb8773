//! Event bus with pluggable sinks.
//!
//! Producers push events into an `mpsc` channel; `flush` drains the
//! channel and hands every event to every registered sink in order.

use std::sync::mpsc;

use crate::events::{EventKind, SimulationEvent};
use crate::sinks::EventSink;

/// Broadcast event bus for simulation telemetry.
pub struct EventBus {
    sender: mpsc::Sender<SimulationEvent>,
    receiver: mpsc::Receiver<SimulationEvent>,
    sinks: Vec<Box<dyn EventSink>>,
    /// Disabled bus is a no-op.
    enabled: bool,
}

impl EventBus {
    /// Creates a new event bus with no sinks.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            sinks: Vec::new(),
            enabled: true,
        }
    }

    /// Builder-style sink registration.
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.add_sink(Box::new(sink));
        self
    }

    /// Registers a sink to receive events.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Enables or disables the bus. Disabled bus drops events silently.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns true if the bus is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Emit an event. If the bus is disabled, this is a no-op.
    pub fn emit(&self, event: SimulationEvent) {
        if !self.enabled {
            return;
        }
        // The receiver lives in `self`, so sending cannot fail.
        let _ = self.sender.send(event);
    }

    /// Shorthand for `emit(SimulationEvent::new(step, kind))`.
    pub fn record(&self, step: u64, kind: EventKind) {
        self.emit(SimulationEvent::new(step, kind));
    }

    /// Dispatch all pending events to the registered sinks.
    ///
    /// Returns the number of events dispatched.
    pub fn flush(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.receiver.try_recv() {
            for sink in &mut self.sinks {
                sink.handle(&event);
            }
            count += 1;
        }
        count
    }

    /// Flush pending events and finalize every sink.
    pub fn finish(&mut self) {
        self.flush();
        for sink in &mut self.sinks {
            sink.finalize();
        }
    }

    /// Returns the number of registered sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
