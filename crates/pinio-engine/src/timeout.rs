//! Cancellable one-shot timeout.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};

/// Handle to an armed timeout. Fires the callback exactly once unless
/// cancelled (or dropped) first.
pub(crate) struct QueryTimeout {
    cancel: Sender<()>,
}

impl QueryTimeout {
    /// Arm a timeout on a dedicated thread. The callback runs on that thread
    /// after `duration` unless [`cancel`](Self::cancel) wins the race.
    pub fn arm<F>(duration: Duration, on_timeout: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (cancel, cancelled) = bounded::<()>(1);
        thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = cancelled.recv_timeout(duration) {
                on_timeout();
            }
        });
        Self { cancel }
    }

    pub fn cancel(self) {
        let _ = self.cancel.try_send(());
    }
}
