//! ManualConnectivity - a monitor whose status is set by hand.
//!
//! Used by tests and by the demo binary to simulate going offline. Real
//! applications wire their platform reachability API into the same
//! `watch` channel shape.

use std::sync::Arc;

use tokio::sync::watch;

use crate::ports::{ConnectivityMonitor, ConnectivityStatus};

/// Cloning shares the underlying channel.
#[derive(Debug, Clone)]
pub struct ManualConnectivity {
    tx: Arc<watch::Sender<ConnectivityStatus>>,
}

impl ManualConnectivity {
    pub fn new(initial: ConnectivityStatus) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn online() -> Self {
        Self::new(ConnectivityStatus::Connected)
    }

    pub fn offline() -> Self {
        Self::new(ConnectivityStatus::NotConnected)
    }

    /// Publish a new reading. Subscribers are only woken when it differs.
    pub fn set(&self, status: ConnectivityStatus) {
        self.tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }
}

impl ConnectivityMonitor for ManualConnectivity {
    fn current_status(&self) -> ConnectivityStatus {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<ConnectivityStatus> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_changes() {
        let monitor = ManualConnectivity::offline();
        let mut rx = monitor.subscribe();

        monitor.set(ConnectivityStatus::Connected);
        rx.changed().await.unwrap();

        assert_eq!(*rx.borrow(), ConnectivityStatus::Connected);
        assert_eq!(monitor.current_status(), ConnectivityStatus::Connected);
    }

    #[tokio::test]
    async fn setting_the_same_status_does_not_notify() {
        let monitor = ManualConnectivity::online();
        let rx = monitor.subscribe();

        monitor.set(ConnectivityStatus::Connected);

        assert!(!rx.has_changed().unwrap());
    }
}
