//! In-process change notifications, consumed by the triggers.

use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::identity::UserRecord;

/// Before/after snapshots of one document write. `None` means the document did not
/// exist on that side of the write.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentChange {
    pub path: String,
    pub before: Option<Map<String, Value>>,
    pub after: Option<Map<String, Value>>,
}

#[derive(Clone, Debug)]
pub enum ChangeEvent {
    Document(DocumentChange),
    UserCreated(UserRecord),
}

/// Fan-out channel every store and identity backend publishes to after committing.
#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: ChangeEvent) {
        // Fails only when nobody is subscribed.
        if self.tx.send(event).is_err() {
            tracing::trace!("Change event dropped, no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(1024)
    }
}
