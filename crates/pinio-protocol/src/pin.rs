//! Per-pin capability and live state.

use serde::{Deserialize, Serialize};

/// Operating mode of a pin, with the raw byte values used on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum PinMode {
    Input = 0,
    Output = 1,
    Analog = 2,
    Pwm = 3,
    Servo = 4,
    Unknown = 255,
}

impl PinMode {
    /// Decode a mode byte. Unrecognized values yield `None`; callers drop
    /// the update rather than failing (firmware tolerance).
    pub fn from_byte(byte: u8) -> Option<PinMode> {
        match byte {
            0 => Some(PinMode::Input),
            1 => Some(PinMode::Output),
            2 => Some(PinMode::Analog),
            3 => Some(PinMode::Pwm),
            4 => Some(PinMode::Servo),
            255 => Some(PinMode::Unknown),
            _ => None,
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Modes whose pin state responses carry a 14-bit analog value.
    #[inline]
    pub fn reports_analog_value(self) -> bool {
        matches!(self, PinMode::Analog | PinMode::Pwm | PinMode::Servo)
    }
}

/// Logic level of a digital pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum DigitalValue {
    Low = 0,
    High = 1,
}

impl DigitalValue {
    /// Decode a 0/1 byte; anything else yields `None`.
    pub fn from_byte(byte: u8) -> Option<DigitalValue> {
        match byte {
            0 => Some(DigitalValue::Low),
            1 => Some(DigitalValue::High),
            _ => None,
        }
    }

    #[inline]
    pub fn to_bit(self) -> u8 {
        self as u8
    }
}

/// One record per physical pin: capability flags fixed by discovery plus the
/// live mode and values mutated by streaming reports.
///
/// The engine owns the table; callers only ever see [`PinSnapshot`] copies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PinRecord {
    /// Index used in digital protocol addressing; -1 until assigned.
    pub digital_id: i32,
    /// Index used in analog protocol addressing; -1 when the pin has no
    /// analog capability.
    pub analog_id: i32,
    pub is_digital: bool,
    pub is_analog: bool,
    pub is_pwm: bool,
    pub mode: PinMode,
    pub digital_value: DigitalValue,
    /// 14-bit value, 0..=16383.
    pub analog_value: u16,
}

impl PinRecord {
    pub fn new(digital_id: i32, is_digital: bool, is_analog: bool, is_pwm: bool) -> Self {
        Self {
            digital_id,
            analog_id: -1,
            is_digital,
            is_analog,
            is_pwm,
            mode: PinMode::Input,
            digital_value: DigitalValue::Low,
            analog_value: 0,
        }
    }

    /// Change the operating mode. Both live values reset so stale readings
    /// from the previous mode cannot leak through.
    pub fn set_mode(&mut self, mode: PinMode) {
        self.mode = mode;
        self.digital_value = DigitalValue::Low;
        self.analog_value = 0;
    }
}

/// Read-only copy of a [`PinRecord`] handed out to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinSnapshot {
    pub digital_id: i32,
    pub analog_id: i32,
    pub is_digital: bool,
    pub is_analog: bool,
    pub is_pwm: bool,
    pub mode: PinMode,
    pub digital_value: DigitalValue,
    pub analog_value: u16,
}

impl From<&PinRecord> for PinSnapshot {
    fn from(pin: &PinRecord) -> Self {
        Self {
            digital_id: pin.digital_id,
            analog_id: pin.analog_id,
            is_digital: pin.is_digital,
            is_analog: pin.is_analog,
            is_pwm: pin.is_pwm,
            mode: pin.mode,
            digital_value: pin.digital_value,
            analog_value: pin.analog_value,
        }
    }
}
