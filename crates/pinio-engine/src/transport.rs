//! Transport boundary.

/// Outbound byte sink backing the engine.
///
/// Implementations wrap whatever carries the bytes to the peripheral (a BLE
/// UART characteristic in the original deployment). Writes are best-effort
/// and unacknowledged; reliability is the transport's problem. Inbound bytes
/// travel the other way through [`PinIoEngine::on_receive`], which tolerates
/// partial and coalesced protocol messages.
///
/// [`PinIoEngine::on_receive`]: crate::PinIoEngine::on_receive
pub trait PinIoTransport: Send + Sync {
    fn send(&self, bytes: &[u8]);
}
