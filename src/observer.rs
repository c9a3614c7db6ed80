//! Observer pattern for host notifications
//!
//! The simulation never calls into the host directly. Lifecycle changes and
//! tick failures are published to subscribed observers, which decide what to
//! show (a toast, a log line, a paused play button).

/// Event emitted by a [`Simulation`](crate::Simulation).
#[derive(Clone, Debug, PartialEq)]
pub enum SimulationEvent {
    /// Grid and history were rebuilt.
    Configured {
        columns: usize,
        rows: usize,
        events_size: usize,
    },
    /// Switched between retarded and instantaneous fields.
    ModeChanged { relativistic: bool },
    /// The run flag was cleared.
    Paused,
    /// The run flag was set.
    Resumed,
    /// A tick failed and the simulation paused itself.
    ///
    /// Sent once per failure streak; the latch resets on resume or reconfigure.
    TickFailed { reason: String },
}

/// Observer that receives simulation events
pub trait SimulationObserver: Send + Sync {
    /// Called when a simulation event occurs
    fn on_event(&self, event: SimulationEvent);
}

/// Function-based observer for simple cases
pub struct FnObserver<F: Fn(SimulationEvent) + Send + Sync>(pub F);

impl<F: Fn(SimulationEvent) + Send + Sync> SimulationObserver for FnObserver<F> {
    fn on_event(&self, event: SimulationEvent) {
        (self.0)(event);
    }
}

/// Channel-based observer - sends events to a channel
pub struct ChannelObserver {
    sender: std::sync::mpsc::Sender<SimulationEvent>,
}

impl ChannelObserver {
    pub fn new(sender: std::sync::mpsc::Sender<SimulationEvent>) -> Self {
        Self { sender }
    }
}

impl SimulationObserver for ChannelObserver {
    fn on_event(&self, event: SimulationEvent) {
        let _ = self.sender.send(event);
    }
}
