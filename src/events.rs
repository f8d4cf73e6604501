//! In-process change notifications.
//!
//! Writers publish a [`DataChange`] after they persist something; readers that
//! hold derived state (such as the client-side rate cache) subscribe and drop
//! what the change makes stale.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Default number of buffered events per subscriber.
pub const DEFAULT_BUS_CAPACITY: usize = 64;

/// Something that changed in the persisted data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataChange {
    /// Rows of the rate table were added, edited or removed.
    Rates,
    /// Work records changed, optionally for a single worker.
    WorkRecords {
        /// The affected worker, or every worker when absent.
        worker_id: Option<String>,
    },
    /// Worker registrations changed.
    Workers,
}

/// A publish/subscribe channel for [`DataChange`] events.
///
/// Cloning the bus shares the same channel.
///
/// # Example
///
/// ```
/// use payroll_engine::events::{DataChange, DataChangeBus};
///
/// let bus = DataChangeBus::default();
/// let mut rx = bus.subscribe();
/// assert_eq!(bus.publish(DataChange::Rates), 1);
/// assert_eq!(rx.try_recv().unwrap(), DataChange::Rates);
/// ```
#[derive(Debug, Clone)]
pub struct DataChangeBus {
    sender: broadcast::Sender<DataChange>,
}

impl DataChangeBus {
    /// Creates a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DataChange> {
        self.sender.subscribe()
    }

    /// Publishes an event, returning how many subscribers will see it.
    pub fn publish(&self, change: DataChange) -> usize {
        match self.sender.send(change) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(change)) => {
                debug!(?change, "No subscribers for data change");
                0
            }
        }
    }
}

impl Default for DataChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}
