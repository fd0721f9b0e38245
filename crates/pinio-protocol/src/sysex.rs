//! Incremental accumulation of query response frames.

use crate::constants::END_SYSEX;

/// Buffers inbound bytes until a complete sysex frame is present.
///
/// The transport may deliver a response split across several chunks or glued
/// to trailing bytes. Accumulation stops at the first end marker; anything
/// after it in the same chunk is ignored, matching the firmware's
/// one-response-per-query handshake. Header validation is left to the
/// parsers.
#[derive(Debug, Default)]
pub struct SysexAccumulator {
    buffer: Vec<u8>,
    complete: bool,
}

impl SysexAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append inbound bytes. Returns true once the buffer holds a full frame
    /// (end marker included).
    pub fn push(&mut self, bytes: &[u8]) -> bool {
        if self.complete {
            return true;
        }
        for &byte in bytes {
            self.buffer.push(byte);
            if byte == END_SYSEX {
                self.complete = true;
                break;
            }
        }
        self.complete
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.complete = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_chunk_frame() {
        let mut acc = SysexAccumulator::new();
        assert!(acc.push(&[0xF0, 0x6C, 0x00, 0x7F, 0xF7]));
        assert_eq!(acc.as_bytes(), &[0xF0, 0x6C, 0x00, 0x7F, 0xF7]);
    }

    #[test]
    fn test_split_delivery() {
        let mut acc = SysexAccumulator::new();
        assert!(!acc.push(&[0xF0, 0x6C]));
        assert!(!acc.push(&[0x00, 0x01]));
        assert!(acc.push(&[0x7F, 0xF7]));
        assert_eq!(acc.as_bytes(), &[0xF0, 0x6C, 0x00, 0x01, 0x7F, 0xF7]);
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut acc = SysexAccumulator::new();
        assert!(acc.push(&[0xF0, 0x6A, 0x7F, 0xF7, 0x90, 0x01]));
        assert_eq!(acc.as_bytes(), &[0xF0, 0x6A, 0x7F, 0xF7]);
        // Further pushes are no-ops until cleared.
        assert!(acc.push(&[0x00]));
        assert_eq!(acc.as_bytes().len(), 4);
    }

    #[test]
    fn test_clear_resets_completion() {
        let mut acc = SysexAccumulator::new();
        assert!(acc.push(&[0xF7]));
        acc.clear();
        assert!(acc.is_empty());
        assert!(!acc.push(&[0xF0]));
    }
}
