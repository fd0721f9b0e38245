//! Pin I/O engine for Bluefruit-style Firmata firmware.
//!
//! Drives the two-phase capability discovery handshake, owns the pin table,
//! and routes steady-state traffic between the caller and the transport.
//! The BLE/UART transport itself is a collaborator behind [`PinIoTransport`].

pub mod error;
pub use error::{Error, Result};

mod transport;
pub use transport::PinIoTransport;

mod event;
pub use event::{EngineEvent, EventReceiver};

mod timeout;

mod engine;
pub use engine::{PinIoEngine, PinIoEngineBuilder, QueryPhase};

pub use pinio_protocol::{DigitalValue, PinMode, PinSnapshot};
