//! ConnectivityMonitor port - network reachability as seen by the queue.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityStatus {
    Connected,
    /// A link is up but an internet probe failed (captive portals, flaky probes).
    ConnectedNoInternet,
    NotConnected,
    /// No reading yet.
    Determining,
}

impl ConnectivityStatus {
    /// Whether the queue may start attempts.
    ///
    /// `ConnectedNoInternet` counts as usable: probe results are unreliable and
    /// a wasted attempt only costs a network-failure retry.
    pub fn is_usable(self) -> bool {
        matches!(
            self,
            ConnectivityStatus::Connected | ConnectivityStatus::ConnectedNoInternet
        )
    }
}

/// Source of reachability readings.
///
/// `subscribe` must yield a receiver whose value tracks `current_status`.
/// The queue derives "became reachable" / "became unreachable" edges from it.
pub trait ConnectivityMonitor: Send + Sync {
    fn current_status(&self) -> ConnectivityStatus;

    fn subscribe(&self) -> watch::Receiver<ConnectivityStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::connected(ConnectivityStatus::Connected, true)]
    #[case::no_internet(ConnectivityStatus::ConnectedNoInternet, true)]
    #[case::offline(ConnectivityStatus::NotConnected, false)]
    #[case::determining(ConnectivityStatus::Determining, false)]
    fn usability(#[case] status: ConnectivityStatus, #[case] usable: bool) {
        assert_eq!(status.is_usable(), usable);
    }
}
