//! # Pinio - Pin I/O over a BLE UART byte stream
//!
//! Talks to peripherals running a Firmata-subset firmware: a two-phase
//! capability discovery handshake, a per-pin capability/state table, and
//! steady-state streaming of digital/analog reports.
//!
//! ## Architecture
//!
//! Umbrella crate coordinating:
//! - **pinio-protocol** - wire format (frames, parsers, report decoding,
//!   command encoding); pure, no I/O
//! - **pinio-engine** - the discovery state machine and pin table, driven by
//!   a transport collaborator
//!
//! ## Quick Start
//!
//! ```ignore
//! use pinio::prelude::*;
//! use std::sync::Arc;
//!
//! let transport: Arc<dyn PinIoTransport> = Arc::new(my_ble_uart);
//! let engine = PinIoEngine::builder(transport).build();
//!
//! engine.query_capabilities()?;
//! // ... feed transport bytes into engine.on_receive(..) until the
//! // QueryFinished event arrives, then drive pins:
//! engine.set_control_mode(5, PinMode::Output)?;
//! engine.set_digital_value(5, DigitalValue::High)?;
//! ```

/// Re-export of pinio-protocol for direct access
pub use pinio_protocol as protocol;

pub use pinio_engine::{
    DigitalValue, EngineEvent, Error, EventReceiver, PinIoEngine, PinIoEngineBuilder,
    PinIoTransport, PinMode, PinSnapshot, QueryPhase, Result,
};

pub use pinio_protocol::{FrameError, StreamingReport};

/// Common imports for working with the engine.
pub mod prelude {
    pub use crate::{
        DigitalValue, EngineEvent, Error, PinIoEngine, PinIoTransport, PinMode, PinSnapshot,
        QueryPhase,
    };
}
