//! Background consumers reacting to store and identity changes.

pub mod role_sync;
pub mod signup;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use tokio::sync::broadcast::{Receiver, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::feed::ChangeEvent;
use crate::identity::IdentityProvider;
use crate::store::{DocumentStore, paths};

pub use role_sync::{RoleSync, SyncOutcome};
pub use signup::on_signup;

/// Spawn the trigger consumer on the runtime.
///
/// Subscribe `events` before any write happens, or the consumer misses it.
pub fn spawn_triggers(
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    events: Receiver<ChangeEvent>,
) -> JoinHandle<()> {
    tokio::spawn(run_triggers(store, identity, events))
}

/// Consume change events one at a time, in arrival order, until the feed closes.
pub async fn run_triggers(
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    mut events: Receiver<ChangeEvent>,
) {
    info!("Starting trigger consumer");
    let mut role_sync = RoleSync::new(store.clone(), identity.clone());

    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                warn!(
                    skipped,
                    "Trigger consumer fell behind, role documents may be out of sync with claims"
                );
                match role_sync.resync().await {
                    Ok(updated) => info!(updated, "Role claims resynced after lag"),
                    Err(e) => error!(error = %e, "Role claims resync failed"),
                }
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        match event {
            ChangeEvent::Document(change) => {
                let Some(email) = paths::role_owner(&change.path) else {
                    continue;
                };
                if let Err(e) = role_sync.mirror_custom_claims(email, &change).await {
                    error!(email, error = %e, "Role sync failed");
                }
            }
            ChangeEvent::UserCreated(user) => {
                if let Err(e) = on_signup(store.as_ref(), identity.as_ref(), &user).await {
                    error!(uid = %user.uid, error = %e, "Signup trigger failed");
                }
            }
        }
    }

    info!("Trigger consumer stopped");
}
