//! Deciding how a write to a role document should be reflected in the user's claims.
//!
//! Applying the decision (claim update, corrective writes) happens in the server; the
//! decision itself only looks at the before/after snapshots.

use serde_json::{Map, Value, json};

use crate::role::UserRole;

/// Largest serialized custom-claims payload the identity provider accepts.
pub const MAX_CLAIMS_PAYLOAD: usize = 1000;

/// Field holding the role inside a role document and inside the claims.
pub const ROLE_FIELD: &str = "role";

/// What to do about one write event on a role document.
#[derive(Debug, Clone, PartialEq)]
pub enum RoleSyncDecision {
    /// Role unchanged (including our own corrective writes) or document deleted.
    NoOp,
    /// Claims payload would exceed [`MAX_CLAIMS_PAYLOAD`]; revert to the prior contents.
    RejectOversized { size: usize },
    /// Not a known role; reset the document to [`UserRole::DEFAULT`].
    RejectInvalid { value: Value },
    /// Mirror this role into the claims.
    Apply(UserRole),
}

/// Decide the transition for a role document write.
///
/// Guards run in order: unchanged, oversized, invalid. Only a write that passes all
/// three touches the identity provider.
pub fn decide(
    before: Option<&Map<String, Value>>,
    after: Option<&Map<String, Value>>,
) -> RoleSyncDecision {
    let Some(after) = after else {
        return RoleSyncDecision::NoOp;
    };

    let before_role = before.and_then(|doc| doc.get(ROLE_FIELD));
    let after_role = after.get(ROLE_FIELD);
    if before_role == after_role {
        return RoleSyncDecision::NoOp;
    }

    let value = after_role.cloned().unwrap_or(Value::Null);
    let size = claims_payload_len(&claims_with(value.clone()));
    if size > MAX_CLAIMS_PAYLOAD {
        return RoleSyncDecision::RejectOversized { size };
    }

    match value.as_str().map(str::parse::<UserRole>) {
        Some(Ok(role)) => RoleSyncDecision::Apply(role),
        _ => RoleSyncDecision::RejectInvalid { value },
    }
}

/// Custom claims carrying a role.
pub fn role_claims(role: UserRole) -> Map<String, Value> {
    claims_with(json!(role.as_str()))
}

/// Length in characters of the claims once serialized to JSON.
pub fn claims_payload_len(claims: &Map<String, Value>) -> usize {
    Value::Object(claims.clone()).to_string().chars().count()
}

fn claims_with(role: Value) -> Map<String, Value> {
    let mut claims = Map::new();
    claims.insert(ROLE_FIELD.to_string(), role);
    claims
}
