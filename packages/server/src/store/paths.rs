//! Document path layout and helpers for slash-separated paths.

use super::StoreError;

pub const USERS: &str = "users";
pub const USER_ITEMS: &str = "user_items";
pub const SECTIONS: &str = "sections";

pub const APPLICATION: &str = "application";
pub const ROLE: &str = "role";
pub const TEAM: &str = "team";

pub const DEMOGRAPHICS: &str = "demographics";
pub const SHORT_RESPONSE: &str = "short_response";
pub const LOGISTICS: &str = "logistics";
pub const SOCIALS: &str = "socials";

/// Application sections, in the order they are written and exported.
pub const APPLICATION_SECTIONS: &[&str] = &[DEMOGRAPHICS, SHORT_RESPONSE, LOGISTICS, SOCIALS];

pub const STATISTICS_RAW: &str = "statistics/precomputed_unformatted";
pub const STATISTICS_CHART: &str = "statistics/precomputed_charts";

/// `users/{email}`
pub fn user(email: &str) -> String {
    format!("{USERS}/{email}")
}

/// `users/{email}/user_items/{item}`
pub fn user_item(email: &str, item: &str) -> String {
    format!("{USERS}/{email}/{USER_ITEMS}/{item}")
}

pub fn application(email: &str) -> String {
    user_item(email, APPLICATION)
}

pub fn role(email: &str) -> String {
    user_item(email, ROLE)
}

pub fn team(email: &str) -> String {
    user_item(email, TEAM)
}

/// `users/{email}/user_items/application/sections/{section}`
pub fn section(email: &str, section: &str) -> String {
    format!("{}/{SECTIONS}/{section}", application(email))
}

/// The email a role document belongs to, if `path` is a role document.
pub fn role_owner(path: &str) -> Option<&str> {
    let mut segments = path.split('/');
    match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(USERS), Some(email), Some(USER_ITEMS), Some(ROLE), None) if !email.is_empty() => {
            Some(email)
        }
        _ => None,
    }
}

/// The email owning any document under `users/{email}/...`.
pub fn owner(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(USERS)?.strip_prefix('/')?;
    rest.split('/').next().filter(|email| !email.is_empty())
}

/// Split components of a document path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentKey<'a> {
    /// Path of the collection holding the document.
    pub parent: &'a str,
    /// Last collection segment, used by collection-group queries.
    pub collection_id: &'a str,
    pub document_id: &'a str,
}

/// Validate a document path and split it into its components.
pub fn parse(path: &str) -> Result<DocumentKey<'_>, StoreError> {
    let invalid = |reason| StoreError::InvalidPath {
        path: path.to_string(),
        reason,
    };

    if path.split('/').any(str::is_empty) {
        return Err(invalid("empty path segment"));
    }
    if path.split('/').count() % 2 != 0 {
        return Err(invalid("document paths have an even number of segments"));
    }

    let (parent, document_id) = path.rsplit_once('/').ok_or_else(|| invalid("missing document id"))?;
    let collection_id = parent.rsplit('/').next().unwrap_or(parent);
    Ok(DocumentKey {
        parent,
        collection_id,
        document_id,
    })
}
