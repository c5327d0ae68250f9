//! Cooperative shutdown of long-running relay loops.
//!
//! A [`ShutdownHandle`] owns the sending side of a channel that never carries
//! any message. Dropping it, or calling [`ShutdownHandle::shutdown`],
//! disconnects the channel, which every clone of the paired
//! [`ShutdownSignal`] observes.

use core::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};

/// Returned by [`ShutdownSignal::sleep`] when shutdown was requested.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ShutdownRequested;

pub struct ShutdownHandle {
    _sender: Sender<()>,
}

impl ShutdownHandle {
    pub fn pair() -> (ShutdownHandle, ShutdownSignal) {
        let (sender, receiver) = crossbeam_channel::bounded(0);

        let handle = ShutdownHandle { _sender: sender };
        let signal = ShutdownSignal {
            receiver: Some(receiver),
        };

        (handle, signal)
    }

    /// Signal shutdown to every paired [`ShutdownSignal`].
    pub fn shutdown(self) {}
}

#[derive(Clone, Debug)]
pub struct ShutdownSignal {
    receiver: Option<Receiver<()>>,
}

impl ShutdownSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self { receiver: None }
    }

    pub fn is_shutdown(&self) -> bool {
        match &self.receiver {
            None => false,
            Some(receiver) => matches!(receiver.try_recv(), Err(TryRecvError::Disconnected)),
        }
    }

    /// Sleep for `duration`, waking up early if shutdown is requested.
    pub fn sleep(&self, duration: Duration) -> Result<(), ShutdownRequested> {
        match &self.receiver {
            None => {
                std::thread::sleep(duration);
                Ok(())
            }
            Some(receiver) => match receiver.recv_timeout(duration) {
                Err(RecvTimeoutError::Timeout) => Ok(()),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => Err(ShutdownRequested),
            },
        }
    }

    /// Fail if shutdown was requested, to be checked before blocking calls.
    pub fn check(&self) -> Result<(), ShutdownRequested> {
        if self.is_shutdown() {
            Err(ShutdownRequested)
        } else {
            Ok(())
        }
    }
}
