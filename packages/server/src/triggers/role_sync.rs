use std::collections::HashMap;
use std::sync::Arc;

use portal_common::UserRole;
use portal_common::role_sync::{ROLE_FIELD, RoleSyncDecision, decide, role_claims};
use serde_json::{Map, Value, json};
use tracing::{error, info, warn};

use crate::feed::DocumentChange;
use crate::identity::IdentityProvider;
use crate::store::{DocumentStore, GroupQuery, LAST_COMMITTED, paths, server_timestamp};

/// What the consumer did for one role document write.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Nothing to mirror, or the write was our own revert.
    Skipped,
    /// The document was restored to its previous contents.
    Reverted,
    /// The document held an unknown role and was reset to the default.
    RestoredDefault,
    /// The claims now carry this role.
    Applied(UserRole),
}

/// Mirrors role documents into the identity provider's custom claims.
///
/// Holds the documents it wrote back as reverts so the change event those writes
/// produce is not treated as a fresh role change.
pub struct RoleSync {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    reverted: HashMap<String, Map<String, Value>>,
}

impl RoleSync {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            store,
            identity,
            reverted: HashMap::new(),
        }
    }

    /// Handle one write to `users/{email}/user_items/role`.
    pub async fn mirror_custom_claims(
        &mut self,
        email: &str,
        change: &DocumentChange,
    ) -> anyhow::Result<SyncOutcome> {
        // Other writes can land between a revert and its echo; only the echo clears it.
        if self
            .reverted
            .get(&change.path)
            .is_some_and(|written| change.after.as_ref() == Some(written))
        {
            self.reverted.remove(&change.path);
            info!(email, "Skipping role document revert");
            return Ok(SyncOutcome::Skipped);
        }

        match decide(change.before.as_ref(), change.after.as_ref()) {
            RoleSyncDecision::NoOp => {
                info!(email, "Skipping update to user claims, no changes detected");
                Ok(SyncOutcome::Skipped)
            }
            RoleSyncDecision::RejectOversized { size } => {
                error!(email, size, "User claims payload too large, undoing role update");
                self.revert(change).await?;
                Ok(SyncOutcome::Reverted)
            }
            RoleSyncDecision::RejectInvalid { value } => {
                warn!(email, %value, "Invalid role in role document, restoring default");
                self.store
                    .update(&change.path, role_document(UserRole::DEFAULT))
                    .await?;
                Ok(SyncOutcome::RestoredDefault)
            }
            RoleSyncDecision::Apply(role) => self.apply(email, role, change).await,
        }
    }

    async fn apply(
        &mut self,
        email: &str,
        role: UserRole,
        change: &DocumentChange,
    ) -> anyhow::Result<SyncOutcome> {
        let user = match self.identity.get_user_by_email(email).await {
            Ok(user) => user,
            Err(e) => {
                error!(email, error = %e, "Error fetching user, undoing role update");
                self.revert(change).await?;
                return Ok(SyncOutcome::Reverted);
            }
        };

        info!(email, uid = %user.uid, %role, "Updating custom claims");
        if let Err(e) = self
            .identity
            .set_custom_claims(&user.uid, role_claims(role))
            .await
        {
            error!(email, error = %e, "Error setting custom claims, undoing role update");
            self.revert(change).await?;
            return Ok(SyncOutcome::Reverted);
        }

        self.store
            .update(&change.path, role_document(role))
            .await?;
        Ok(SyncOutcome::Applied(role))
    }

    /// Bring every account's claims in line with its stored role document.
    ///
    /// Used after the consumer missed events. Documents without a valid role are left
    /// for their next write. Returns how many accounts had their claims rewritten.
    pub async fn resync(&mut self) -> anyhow::Result<usize> {
        // Echoes of our reverts may have been among the dropped events.
        self.reverted.clear();

        let query = GroupQuery::new(paths::USER_ITEMS).document(paths::ROLE);
        let docs = self.store.collection_group(&query).await?;

        let mut updated = 0;
        for doc in docs {
            let Some(email) = paths::role_owner(&doc.path) else {
                continue;
            };
            let Some(role) = doc
                .data
                .get(ROLE_FIELD)
                .and_then(Value::as_str)
                .and_then(|r| r.parse::<UserRole>().ok())
            else {
                continue;
            };

            let user = match self.identity.get_user_by_email(email).await {
                Ok(user) => user,
                Err(e) => {
                    warn!(email, error = %e, "Skipping role resync for unknown user");
                    continue;
                }
            };
            if user.role() == Some(role) {
                continue;
            }

            info!(email, uid = %user.uid, %role, "Resyncing custom claims");
            match self
                .identity
                .set_custom_claims(&user.uid, role_claims(role))
                .await
            {
                Ok(()) => updated += 1,
                Err(e) => error!(email, error = %e, "Error setting custom claims during resync"),
            }
        }
        Ok(updated)
    }

    /// Put the document back the way it was before `change`.
    async fn revert(&mut self, change: &DocumentChange) -> anyhow::Result<()> {
        match &change.before {
            Some(before) => {
                self.store.set(&change.path, before.clone()).await?;
                self.reverted.insert(change.path.clone(), before.clone());
            }
            None => {
                self.store.delete(&change.path).await?;
            }
        }
        Ok(())
    }
}

/// Role document body: `{role, _last_committed: now}`.
pub fn role_document(role: UserRole) -> Map<String, Value> {
    let mut doc = Map::new();
    doc.insert(ROLE_FIELD.to_string(), json!(role.as_str()));
    doc.insert(LAST_COMMITTED.to_string(), server_timestamp());
    doc
}
