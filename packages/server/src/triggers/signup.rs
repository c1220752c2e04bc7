use portal_common::UserRole;
use portal_common::role_sync::role_claims;
use tracing::info;

use super::role_sync::role_document;
use crate::identity::{IdentityProvider, UserRecord};
use crate::store::{DocumentStore, paths};

/// Give a newly created user the default role, in the claims and in the role document.
pub async fn on_signup(
    store: &dyn DocumentStore,
    identity: &dyn IdentityProvider,
    user: &UserRecord,
) -> anyhow::Result<()> {
    let role = UserRole::DEFAULT;

    identity
        .set_custom_claims(&user.uid, role_claims(role))
        .await?;
    store
        .merge(&paths::role(&user.email), role_document(role))
        .await?;

    info!(uid = %user.uid, email = %user.email, %role, "Default role assigned");
    Ok(())
}
