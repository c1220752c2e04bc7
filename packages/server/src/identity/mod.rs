//! User accounts, custom claims and bearer tokens.

mod error;
mod local;

pub mod password;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portal_common::UserRole;
use portal_common::role_sync::ROLE_FIELD;
use serde::Serialize;
use serde_json::{Map, Value};

pub use error::IdentityError;
pub use local::LocalIdentityProvider;

/// A user account as seen by handlers and triggers.
#[derive(Clone, Debug, PartialEq, Serialize, utoipa::ToSchema)]
pub struct UserRecord {
    #[schema(example = "0b6c6bb5-60e2-4b8a-9d4a-2f0f3b5f1b11")]
    pub uid: String,
    #[schema(example = "sammy@ucsc.edu")]
    pub email: String,
    #[schema(example = "+18314590111")]
    pub phone_number: Option<String>,
    #[schema(example = "Sammy Slug")]
    pub display_name: Option<String>,
    /// Claims embedded in issued tokens.
    #[schema(value_type = Object, example = json!({"role": "applicant"}))]
    pub custom_claims: Map<String, Value>,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Role carried in the custom claims, if it is a known one.
    pub fn role(&self) -> Option<UserRole> {
        self.custom_claims
            .get(ROLE_FIELD)
            .and_then(Value::as_str)
            .and_then(|r| r.parse().ok())
    }
}

/// Fields for a new account.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    /// E.164, e.g. `+18314590111`.
    pub phone_number: Option<String>,
    pub display_name: Option<String>,
}

/// Partial update of an account; `None` leaves the field untouched.
#[derive(Clone, Debug, Default)]
pub struct UserUpdate {
    pub phone_number: Option<String>,
    pub display_name: Option<String>,
}

/// One page of [`IdentityProvider::list_users`].
#[derive(Clone, Debug)]
pub struct UserPage {
    pub users: Vec<UserRecord>,
    /// Pass back to fetch the next page; `None` on the last page.
    pub next_page_token: Option<String>,
}

/// Identity attached to a verified bearer token.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedToken {
    pub uid: String,
    pub email: String,
    pub role: Option<UserRole>,
}

/// A successful password sign-in.
#[derive(Clone, Debug)]
pub struct SignedIn {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserRecord,
}

/// Account store and token issuer the handlers and triggers depend on.
///
/// Creating a user publishes [`crate::feed::ChangeEvent::UserCreated`].
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, IdentityError>;

    async fn update_user(&self, uid: &str, update: UserUpdate)
    -> Result<UserRecord, IdentityError>;

    async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, IdentityError>;

    async fn get_user_by_phone(&self, phone_number: &str) -> Result<UserRecord, IdentityError>;

    /// Users ordered by uid, at most `max_results` per page.
    async fn list_users(
        &self,
        max_results: u64,
        page_token: Option<&str>,
    ) -> Result<UserPage, IdentityError>;

    /// Replace the custom claims of a user.
    ///
    /// Fails with [`IdentityError::ClaimsTooLarge`] when the serialized payload exceeds
    /// [`portal_common::role_sync::MAX_CLAIMS_PAYLOAD`] characters.
    async fn set_custom_claims(
        &self,
        uid: &str,
        claims: Map<String, Value>,
    ) -> Result<(), IdentityError>;

    async fn verify_id_token(&self, token: &str) -> Result<DecodedToken, IdentityError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignedIn, IdentityError>;
}
