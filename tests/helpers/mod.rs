//! Shared test helpers: a transport that records outbound traffic.

use parking_lot::Mutex;
use pinio::PinIoTransport;
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

pub struct MockTransport {
    sent: Mutex<Vec<Vec<u8>>>,
}

impl MockTransport {
    /// Creates a recording transport and installs the fmt subscriber (once
    /// per test binary) so failing tests show engine logs.
    pub fn new() -> Arc<Self> {
        TRACING.call_once(|| {
            tracing_subscriber::fmt().with_test_writer().init();
        });
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
        })
    }

    /// Every message sent so far, in order.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }
}

impl PinIoTransport for MockTransport {
    fn send(&self, bytes: &[u8]) {
        self.sent.lock().push(bytes.to_vec());
    }
}
