//! Cancellable waiting between fetch attempts.
//!
//! Backoff pauses go through the `Wait` trait instead of `thread::sleep`, so a
//! pending pause can be interrupted. `CancelToken` is the production
//! implementation: clones share one flag, and `cancel()` both sets the flag
//! and wakes a waiter blocked in `recv_timeout`.
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use rates_common::RateError;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

/// A pause that can be cut short by cancellation.
pub trait Wait {
    /// Block for `duration`, or fail with `RateError::Cancelled` as soon as the
    /// wait is cancelled.
    fn wait(&mut self, duration: Duration) -> Result<(), RateError>;

    /// Returns `true` once cancellation has been requested.
    fn is_cancelled(&self) -> bool;
}

/// Shared cancellation flag with a wake-up channel.
#[derive(Debug, Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = bounded(1);
        CancelToken {
            cancelled: Arc::new(AtomicBool::new(false)),
            wake_tx,
            wake_rx,
        }
    }

    /// Request cancellation and wake any pending wait.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // Full means a wake-up is already pending.
        let _ = self.wake_tx.try_send(());
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl Wait for CancelToken {
    fn wait(&mut self, duration: Duration) -> Result<(), RateError> {
        if self.is_cancelled() {
            return Err(RateError::Cancelled);
        }
        match self.wake_rx.recv_timeout(duration) {
            Ok(()) => {
                // Leave the wake-up in place for other clones.
                let _ = self.wake_tx.try_send(());
                Err(RateError::Cancelled)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                if self.is_cancelled() {
                    Err(RateError::Cancelled)
                } else {
                    Ok(())
                }
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_wait_elapses_when_not_cancelled() {
        let mut token = CancelToken::new();
        let started = Instant::now();
        token.wait(Duration::from_millis(20)).unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_wait_fails_fast_after_cancel() {
        let mut token = CancelToken::new();
        token.cancel();
        let started = Instant::now();
        assert!(matches!(
            token.wait(Duration::from_secs(30)),
            Err(RateError::Cancelled)
        ));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_cancel_from_other_thread_wakes_waiter() {
        let mut token = CancelToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            remote.cancel();
        });

        let started = Instant::now();
        assert!(matches!(
            token.wait(Duration::from_secs(30)),
            Err(RateError::Cancelled)
        ));
        assert!(started.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }

    #[test]
    fn test_every_clone_observes_cancel() {
        let token = CancelToken::new();
        let mut first = token.clone();
        let mut second = token.clone();
        token.cancel();
        assert!(first.wait(Duration::from_secs(1)).is_err());
        assert!(second.wait(Duration::from_secs(1)).is_err());
    }
}
