//! Capability response parsing.

use tracing::debug;

use crate::constants::{
    CAPABILITY_MODE_ANALOG, CAPABILITY_MODE_I2C, CAPABILITY_MODE_INPUT,
    CAPABILITY_MODE_INPUT_PULLUP, CAPABILITY_MODE_OUTPUT, CAPABILITY_MODE_PWM,
    CAPABILITY_MODE_SERVO, CAPABILITY_PIN_SEPARATOR, CAPABILITY_RESPONSE, END_SYSEX, START_SYSEX,
};
use crate::error::FrameError;
use crate::pin::PinRecord;

/// Decode a capability response frame into the pin table.
///
/// Frame layout: `F0 6C <descriptors separated by 7F> F7`. The position of
/// each descriptor group is the pin's digital id; an empty group means the
/// pin is unavailable and produces no record. Within a group, each supported
/// mode byte is followed by a resolution byte (not stored). Servo and i2c
/// capability are recognized so their resolution bytes are skipped, but the
/// record keeps no flag for them; unknown descriptors are skipped as a pair
/// so the scan stays mode-byte aligned.
pub fn parse_capabilities(data: &[u8]) -> Result<Vec<PinRecord>, FrameError> {
    let end = validate_header(data, CAPABILITY_RESPONSE)?;

    // Split the interior on the pin separator.
    let mut groups: Vec<&[u8]> = Vec::new();
    let mut start = 2;
    for i in 2..end {
        if data[i] == CAPABILITY_PIN_SEPARATOR {
            groups.push(&data[start..i]);
            start = i + 1;
        }
    }

    let mut pins = Vec::new();
    for (pin_number, group) in groups.iter().enumerate() {
        if group.is_empty() {
            continue;
        }

        let mut is_input = false;
        let mut is_output = false;
        let mut is_analog = false;
        let mut is_pwm = false;

        let mut i = 0;
        while i < group.len() {
            match group[i] {
                CAPABILITY_MODE_INPUT | CAPABILITY_MODE_INPUT_PULLUP => {
                    is_input = true;
                    i += 1; // skip resolution byte
                }
                CAPABILITY_MODE_OUTPUT => {
                    is_output = true;
                    i += 1;
                }
                CAPABILITY_MODE_ANALOG => {
                    is_analog = true;
                    i += 1;
                }
                CAPABILITY_MODE_PWM => {
                    is_pwm = true;
                    i += 1;
                }
                CAPABILITY_MODE_SERVO | CAPABILITY_MODE_I2C => {
                    i += 1; // recognized, not stored
                }
                _ => {
                    i += 1; // unknown descriptor still carries a resolution byte
                }
            }
            i += 1;
        }

        let pin = PinRecord::new(pin_number as i32, is_input && is_output, is_analog, is_pwm);
        debug!(
            pin = pin_number,
            digital = pin.is_digital,
            analog = pin.is_analog,
            pwm = pin.is_pwm,
            "capability descriptor"
        );
        pins.push(pin);
    }

    Ok(pins)
}

/// Shared header validation for query responses: minimum length, sysex start
/// byte, expected command byte, and a located end marker. Returns the index
/// of the end marker.
pub(crate) fn validate_header(data: &[u8], command: u8) -> Result<usize, FrameError> {
    if data.len() <= 2 {
        return Err(FrameError::TooShort(data.len()));
    }
    if data[0] != START_SYSEX {
        return Err(FrameError::MissingStart(data[0]));
    }
    if data[1] != command {
        return Err(FrameError::UnexpectedCommand {
            expected: command,
            found: data[1],
        });
    }
    data.iter()
        .position(|&b| b == END_SYSEX)
        .ok_or(FrameError::MissingEnd)
}
