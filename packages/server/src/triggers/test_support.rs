use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};

use crate::identity::{
    DecodedToken, IdentityError, IdentityProvider, NewUser, SignedIn, UserPage, UserRecord,
    UserUpdate,
};

/// Identity provider that records claim updates and knows a fixed set of emails.
#[derive(Default)]
pub struct FakeIdentity {
    users: HashMap<String, UserRecord>,
    lookups: AtomicUsize,
    claim_updates: Mutex<Vec<(String, Map<String, Value>)>>,
}

impl FakeIdentity {
    pub fn with_user(email: &str) -> Self {
        let mut fake = Self::default();
        fake.users.insert(email.to_string(), record(email));
        fake
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn claim_updates(&self) -> Vec<(String, Map<String, Value>)> {
        self.claim_updates.lock().unwrap().clone()
    }
}

pub fn record(email: &str) -> UserRecord {
    UserRecord {
        uid: format!("uid-{email}"),
        email: email.to_string(),
        phone_number: None,
        display_name: None,
        custom_claims: Map::new(),
        disabled: false,
        created_at: Utc::now(),
    }
}

fn unsupported<T>() -> Result<T, IdentityError> {
    Err(IdentityError::Internal("not supported by FakeIdentity".into()))
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn create_user(&self, _user: NewUser) -> Result<UserRecord, IdentityError> {
        unsupported()
    }

    async fn update_user(
        &self,
        _uid: &str,
        _update: UserUpdate,
    ) -> Result<UserRecord, IdentityError> {
        unsupported()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, IdentityError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.users
            .get(email)
            .cloned()
            .ok_or_else(|| IdentityError::UserNotFound(email.to_string()))
    }

    async fn get_user_by_phone(&self, phone_number: &str) -> Result<UserRecord, IdentityError> {
        Err(IdentityError::UserNotFound(phone_number.to_string()))
    }

    async fn list_users(
        &self,
        _max_results: u64,
        _page_token: Option<&str>,
    ) -> Result<UserPage, IdentityError> {
        unsupported()
    }

    async fn set_custom_claims(
        &self,
        uid: &str,
        claims: Map<String, Value>,
    ) -> Result<(), IdentityError> {
        self.claim_updates
            .lock()
            .unwrap()
            .push((uid.to_string(), claims));
        Ok(())
    }

    async fn verify_id_token(&self, _token: &str) -> Result<DecodedToken, IdentityError> {
        unsupported()
    }

    async fn sign_in_with_password(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<SignedIn, IdentityError> {
        unsupported()
    }
}
