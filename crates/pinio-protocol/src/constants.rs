//! Protocol byte constants.
//!
//! These values are the compatibility surface with the firmware and follow
//! the Firmata wire format (https://github.com/firmata/protocol), which
//! borrows its framing from MIDI.

/// Start of a sysex frame (MIDI System Exclusive).
pub const START_SYSEX: u8 = 0xF0;
/// End of a sysex frame.
pub const END_SYSEX: u8 = 0xF7;

/// Request the capability enumeration for every pin.
pub const CAPABILITY_QUERY: u8 = 0x6B;
/// Sysex command byte of the capability response.
pub const CAPABILITY_RESPONSE: u8 = 0x6C;
/// Request the digital-to-analog pin index mapping.
pub const ANALOG_MAPPING_QUERY: u8 = 0x69;
/// Sysex command byte of the analog mapping response.
pub const ANALOG_MAPPING_RESPONSE: u8 = 0x6A;
/// Sysex command byte of a pin state response.
pub const PIN_STATE_RESPONSE: u8 = 0x6E;
/// Sysex command byte for analog writes to pins above 15.
pub const EXTENDED_ANALOG: u8 = 0x6F;

/// Separator between pin descriptors in a capability response; in an analog
/// mapping response the same byte marks a pin without analog capability.
pub const CAPABILITY_PIN_SEPARATOR: u8 = 0x7F;
pub const ANALOG_MAPPING_NONE: u8 = 0x7F;

/// Digital port report, port number in the low nibble (MIDI NoteOn range).
pub const DIGITAL_MESSAGE: u8 = 0x90;
pub const DIGITAL_MESSAGE_END: u8 = 0x9F;
/// Analog pin report, pin number in the low nibble (MIDI Pitch Wheel range).
pub const ANALOG_MESSAGE: u8 = 0xE0;
pub const ANALOG_MESSAGE_END: u8 = 0xEF;

/// Enable/disable analog value reporting, analog pin id in the low nibble.
pub const REPORT_ANALOG: u8 = 0xC0;
/// Enable/disable digital reporting, port number in the low nibble.
pub const REPORT_DIGITAL: u8 = 0xD0;

/// Set the operating mode of a pin.
pub const SET_PIN_MODE: u8 = 0xF4;
/// Reset the firmware protocol state.
pub const SYSTEM_RESET: u8 = 0xFF;

// Capability descriptor mode bytes. Each is followed by a resolution byte.
pub const CAPABILITY_MODE_INPUT: u8 = 0x00;
pub const CAPABILITY_MODE_OUTPUT: u8 = 0x01;
pub const CAPABILITY_MODE_ANALOG: u8 = 0x02;
pub const CAPABILITY_MODE_PWM: u8 = 0x03;
pub const CAPABILITY_MODE_SERVO: u8 = 0x04;
pub const CAPABILITY_MODE_I2C: u8 = 0x06;
pub const CAPABILITY_MODE_INPUT_PULLUP: u8 = 0x0B;

/// Maximum value carried by the protocol's two-byte 7-bit encoding.
pub const MAX_ANALOG_VALUE: u16 = 0x3FFF;
