//! Stop coordination between the signal handler and the listener.

use std::fmt;

use tokio::sync::broadcast;

/// Why the proxy is stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// SIGINT or SIGTERM.
    Signal,
    /// Asked to stop in-process (embedding, tests).
    Requested,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Signal => write!(f, "signal"),
            StopReason::Requested => write!(f, "requested"),
        }
    }
}

/// Fan-out of a single stop event to the server and anything else that
/// must drain before exit.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<StopReason>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StopReason> {
        self.tx.subscribe()
    }

    /// Broadcast `reason`. Later calls are harmless.
    pub fn trigger(&self, reason: StopReason) {
        if self.tx.send(reason).is_err() {
            tracing::debug!(reason = %reason, "Stop requested with no listeners");
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve once `rx` reports a stop, returning why.
///
/// A closed channel counts as a request to stop: nobody is left to trigger it.
pub async fn stopped(mut rx: broadcast::Receiver<StopReason>) -> StopReason {
    match rx.recv().await {
        Ok(reason) => reason,
        Err(_) => StopReason::Requested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_subscriber_sees_the_reason() {
        let shutdown = Shutdown::new();
        let a = shutdown.subscribe();
        let b = shutdown.clone().subscribe();

        shutdown.trigger(StopReason::Signal);
        assert_eq!(stopped(a).await, StopReason::Signal);
        assert_eq!(stopped(b).await, StopReason::Signal);
    }

    #[tokio::test]
    async fn test_dropped_coordinator_stops_waiters() {
        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();
        drop(shutdown);
        assert_eq!(stopped(rx).await, StopReason::Requested);
    }
}
