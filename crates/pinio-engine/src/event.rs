//! Engine event stream.

/// Notifications pushed to the caller over a bounded channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    /// A discovery cycle finished and the pin table was rebuilt. When
    /// `default_configuration_assumed` is true the firmware never answered
    /// (or answered garbage) and the synthetic 20-pin layout is in place.
    QueryFinished { default_configuration_assumed: bool },
    /// Steady-state traffic updated at least one pin value.
    PinStateChanged,
}

/// Receiving half of the engine's event channel.
pub type EventReceiver = crossbeam_channel::Receiver<EngineEvent>;
