//! Outbound command encoding.
//!
//! Pure builders for every message the engine writes to the transport. All
//! commands are fire-and-forget; none has an acknowledgment.

use smallvec::{smallvec, SmallVec};

use crate::constants::{
    ANALOG_MAPPING_QUERY, ANALOG_MESSAGE, CAPABILITY_QUERY, DIGITAL_MESSAGE, END_SYSEX,
    EXTENDED_ANALOG, REPORT_ANALOG, REPORT_DIGITAL, SET_PIN_MODE, START_SYSEX, SYSTEM_RESET,
};
use crate::pin::PinMode;

/// Encoded command bytes. The longest command (extended analog write) is six
/// bytes, so these never spill to the heap.
pub type CommandBytes = SmallVec<[u8; 8]>;

/// Reset the firmware protocol state.
pub fn system_reset() -> CommandBytes {
    smallvec![SYSTEM_RESET]
}

/// Ask the firmware to enumerate every pin's supported modes.
pub fn capability_query() -> CommandBytes {
    smallvec![START_SYSEX, CAPABILITY_QUERY, END_SYSEX]
}

/// Ask the firmware for the digital-to-analog pin index mapping.
pub fn analog_mapping_query() -> CommandBytes {
    smallvec![START_SYSEX, ANALOG_MAPPING_QUERY, END_SYSEX]
}

/// Enable or disable digital reporting for a port of 8 pins.
pub fn report_digital_port(port: u8, enable: bool) -> CommandBytes {
    smallvec![REPORT_DIGITAL + port, enable as u8]
}

/// Enable or disable analog value reporting for an analog pin id.
pub fn report_analog_pin(analog_id: u8, enable: bool) -> CommandBytes {
    smallvec![REPORT_ANALOG + analog_id, enable as u8]
}

/// Set the operating mode of a pin.
pub fn set_pin_mode(digital_id: u8, mode: PinMode) -> CommandBytes {
    smallvec![SET_PIN_MODE, digital_id, mode.to_byte()]
}

/// Write the full 8-pin bitmask of a digital port.
pub fn digital_port_write(port: u8, bitmask: u16) -> CommandBytes {
    smallvec![
        DIGITAL_MESSAGE + port,
        (bitmask & 0x7F) as u8,
        (bitmask >> 7) as u8
    ]
}

/// Standard analog/PWM write for pins 0..=15.
pub fn analog_write(digital_id: u8, value: u16) -> CommandBytes {
    debug_assert!(digital_id <= 15, "pins above 15 need the extended form");
    smallvec![
        ANALOG_MESSAGE + digital_id,
        (value & 0x7F) as u8,
        (value >> 7) as u8
    ]
}

/// Extended sysex analog write for pins above 15.
pub fn extended_analog_write(digital_id: u8, value: u16) -> CommandBytes {
    smallvec![
        START_SYSEX,
        EXTENDED_ANALOG,
        digital_id,
        (value & 0x7F) as u8,
        (value >> 7) as u8,
        END_SYSEX
    ]
}
