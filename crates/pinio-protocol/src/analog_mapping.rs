//! Analog mapping response parsing.

use crate::capability::validate_header;
use crate::constants::{ANALOG_MAPPING_NONE, ANALOG_MAPPING_RESPONSE};
use crate::error::FrameError;

/// Decode an analog mapping response into `(digital_id, analog_id)` pairs.
///
/// Frame layout: `F0 6A <one byte per digital pin index> F7`, where `7F`
/// marks a pin without analog capability. Application to the pin table is
/// the engine's job, so a byte addressing a pin the capability response
/// never produced stays a non-fatal condition there.
pub fn parse_analog_mapping(data: &[u8]) -> Result<Vec<(u8, u8)>, FrameError> {
    let end = validate_header(data, ANALOG_MAPPING_RESPONSE)?;

    let mut assignments = Vec::new();
    for (pin_number, &byte) in data[2..end].iter().enumerate() {
        if byte != ANALOG_MAPPING_NONE {
            assignments.push((pin_number as u8, byte));
        }
    }
    Ok(assignments)
}
