//! Steady-state report decoding.

use tracing::warn;

use crate::constants::{
    ANALOG_MESSAGE, ANALOG_MESSAGE_END, DIGITAL_MESSAGE, DIGITAL_MESSAGE_END, END_SYSEX,
    PIN_STATE_RESPONSE, START_SYSEX,
};
use crate::pin::{DigitalValue, PinMode};

/// A decoded steady-state message from the firmware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamingReport {
    /// Sysex pin state response (`F0 6E pin mode lsb [msb ..] F7`).
    ///
    /// `mode` is `None` for an unrecognized mode byte, `digital` is `None`
    /// for a digital state outside 0/1, and `analog` is `None` when an
    /// analog-mode response arrived without its high byte. The engine logs
    /// and drops what it cannot apply.
    PinState {
        digital_id: u8,
        mode: Option<PinMode>,
        digital: Option<DigitalValue>,
        analog: Option<u16>,
    },
    /// Digital port report (`0x90+port lsb msb`): 14-bit bitmask covering
    /// the 8 pins of the port.
    DigitalPort { port: u8, bitmask: u16 },
    /// Analog pin report (`0xE0+id lsb msb`): 14-bit value.
    AnalogValue { analog_id: u8, value: u16 },
}

/// Incremental decoder over the steady-state byte stream.
///
/// Bytes may arrive split or coalesced; the decoder keeps a persistent
/// buffer and extracts as many complete messages as it can per push. An
/// unrecognized leading byte stalls the buffer rather than discarding bytes;
/// there is no active resynchronization.
#[derive(Debug, Default)]
pub struct StreamingReportDecoder {
    buffer: Vec<u8>,
}

impl StreamingReportDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append inbound bytes and decode every complete message now buffered.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<StreamingReport> {
        self.buffer.extend_from_slice(bytes);
        let mut reports = Vec::new();
        while let Some(report) = self.decode_next() {
            reports.push(report);
        }
        reports
    }

    #[inline]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    fn decode_next(&mut self) -> Option<StreamingReport> {
        let lead = *self.buffer.first()?;

        if lead == START_SYSEX {
            return self.decode_pin_state();
        }

        if self.buffer.len() < 3 {
            return None;
        }

        if (DIGITAL_MESSAGE..=DIGITAL_MESSAGE_END).contains(&lead) {
            let port = lead - DIGITAL_MESSAGE;
            let bitmask = seven_bit_pair(self.buffer[1], self.buffer[2]);
            self.buffer.drain(..3);
            return Some(StreamingReport::DigitalPort { port, bitmask });
        }

        if (ANALOG_MESSAGE..=ANALOG_MESSAGE_END).contains(&lead) {
            let analog_id = lead - ANALOG_MESSAGE;
            let value = seven_bit_pair(self.buffer[1], self.buffer[2]);
            self.buffer.drain(..3);
            return Some(StreamingReport::AnalogValue { analog_id, value });
        }

        None
    }

    fn decode_pin_state(&mut self) -> Option<StreamingReport> {
        if self.buffer.len() < 5 || self.buffer[1] != PIN_STATE_RESPONSE {
            return None;
        }
        let end = self.buffer.iter().position(|&b| b == END_SYSEX)?;

        let digital_id = self.buffer[2];
        let mode = PinMode::from_byte(self.buffer[3]);
        let state_lsb = self.buffer[4];

        let mut digital = None;
        let mut analog = None;
        if mode.is_some_and(PinMode::reports_analog_value) {
            if end > 5 {
                analog = Some(state_lsb as u16 + ((self.buffer[5] as u16) << 7));
            } else {
                warn!(pin = digital_id, "pin state response for analog mode without value byte");
            }
        } else {
            digital = DigitalValue::from_byte(state_lsb);
        }

        self.buffer.drain(..=end);
        Some(StreamingReport::PinState {
            digital_id,
            mode,
            digital,
            analog,
        })
    }
}

#[inline]
fn seven_bit_pair(lsb: u8, msb: u8) -> u16 {
    (lsb as u16) | ((msb as u16) << 7)
}
