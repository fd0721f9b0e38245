//! Firmata-subset wire format for Bluefruit-style pin I/O firmware.
//!
//! Pure protocol layer: byte constants, the per-pin data model, sysex frame
//! accumulation, capability/analog-mapping response parsing, streaming report
//! decoding, and outbound command encoding. No I/O and no threads live here;
//! the stateful engine sits on top in `pinio-engine`.

pub mod constants;

pub mod error;
pub use error::FrameError;

mod pin;
pub use pin::{DigitalValue, PinMode, PinRecord, PinSnapshot};

mod sysex;
pub use sysex::SysexAccumulator;

mod capability;
pub use capability::parse_capabilities;

mod analog_mapping;
pub use analog_mapping::parse_analog_mapping;

mod report;
pub use report::{StreamingReport, StreamingReportDecoder};

pub mod command;
pub use command::CommandBytes;
