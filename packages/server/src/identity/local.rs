use async_trait::async_trait;
use chrono::{Duration, Utc};
use portal_common::role_sync::{MAX_CLAIMS_PAYLOAD, claims_payload_len};
use portal_common::validation::{is_valid_email, normalize_email};
use sea_orm::*;
use serde_json::{Map, Value};
use tracing::{info, instrument};

use super::password::{hash_password, verify_password};
use super::{
    DecodedToken, IdentityError, IdentityProvider, NewUser, SignedIn, UserPage, UserRecord,
    UserUpdate,
};
use crate::config::AuthConfig;
use crate::entity::user;
use crate::feed::{ChangeEvent, ChangeFeed};
use crate::utils::jwt;

/// Largest page [`IdentityProvider::list_users`] returns.
const MAX_PAGE_SIZE: u64 = 1000;

/// Self-hosted identity provider: accounts in the `identity_user` table, HS256 tokens.
#[derive(Clone)]
pub struct LocalIdentityProvider {
    db: DatabaseConnection,
    feed: ChangeFeed,
    jwt_secret: String,
    token_ttl: Duration,
}

impl LocalIdentityProvider {
    pub fn new(db: DatabaseConnection, feed: ChangeFeed, auth: &AuthConfig) -> Self {
        Self {
            db,
            feed,
            jwt_secret: auth.jwt_secret.clone(),
            token_ttl: Duration::hours(auth.token_ttl_hours),
        }
    }

    async fn find_by_uid(&self, uid: &str) -> Result<user::Model, IdentityError> {
        user::Entity::find_by_id(uid.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| IdentityError::UserNotFound(uid.to_string()))
    }
}

fn to_record(model: user::Model) -> UserRecord {
    let custom_claims = match model.custom_claims {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    UserRecord {
        uid: model.uid,
        email: model.email,
        phone_number: model.phone_number,
        display_name: model.display_name,
        custom_claims,
        disabled: model.disabled,
        created_at: model.created_at,
    }
}

/// E.164: `+` followed by 8 to 15 digits.
fn check_phone(phone: &str) -> Result<(), IdentityError> {
    let digits = phone.strip_prefix('+').unwrap_or_default();
    if (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(IdentityError::invalid(
            "phone_number",
            "Phone number must be in E.164 format",
        ))
    }
}

fn check_password(password: &str) -> Result<(), IdentityError> {
    if password.len() < 6 {
        return Err(IdentityError::invalid(
            "password",
            "Password must be at least 6 characters",
        ));
    }
    Ok(())
}

/// Translate a unique-constraint violation into the matching identity error.
fn unique_violation(err: DbErr, email: &str, phone: Option<&str>) -> IdentityError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("phone") => {
            IdentityError::PhoneNumberExists(phone.unwrap_or_default().to_string())
        }
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            IdentityError::EmailExists(email.to_string())
        }
        _ => IdentityError::Database(err),
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    async fn create_user(&self, new_user: NewUser) -> Result<UserRecord, IdentityError> {
        let email = normalize_email(&new_user.email);
        if !is_valid_email(&email) {
            return Err(IdentityError::invalid("email", "Email must be a valid address"));
        }
        check_password(&new_user.password)?;
        if let Some(phone) = &new_user.phone_number {
            check_phone(phone)?;
        }

        let password_hash = hash_password(&new_user.password)?;
        let model = user::ActiveModel {
            uid: Set(uuid::Uuid::new_v4().to_string()),
            email: Set(email.clone()),
            phone_number: Set(new_user.phone_number.clone()),
            display_name: Set(new_user.display_name),
            password_hash: Set(password_hash),
            custom_claims: Set(Value::Object(Map::new())),
            disabled: Set(false),
            created_at: Set(Utc::now()),
        };

        let model = model
            .insert(&self.db)
            .await
            .map_err(|e| unique_violation(e, &email, new_user.phone_number.as_deref()))?;

        let record = to_record(model);
        info!(uid = %record.uid, "Identity user created");
        self.feed.publish(ChangeEvent::UserCreated(record.clone()));
        Ok(record)
    }

    #[instrument(skip(self, update))]
    async fn update_user(
        &self,
        uid: &str,
        update: UserUpdate,
    ) -> Result<UserRecord, IdentityError> {
        let existing = self.find_by_uid(uid).await?;
        let email = existing.email.clone();
        let mut model: user::ActiveModel = existing.clone().into();

        if let Some(phone) = &update.phone_number {
            check_phone(phone)?;
            model.phone_number = Set(Some(phone.clone()));
        }
        if let Some(name) = update.display_name {
            model.display_name = Set(Some(name));
        }
        if !model.is_changed() {
            return Ok(to_record(existing));
        }

        let model = model
            .update(&self.db)
            .await
            .map_err(|e| unique_violation(e, &email, update.phone_number.as_deref()))?;
        Ok(to_record(model))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, IdentityError> {
        let email = normalize_email(email);
        user::Entity::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .one(&self.db)
            .await?
            .map(to_record)
            .ok_or(IdentityError::UserNotFound(email))
    }

    async fn get_user_by_phone(&self, phone_number: &str) -> Result<UserRecord, IdentityError> {
        user::Entity::find()
            .filter(user::Column::PhoneNumber.eq(phone_number))
            .one(&self.db)
            .await?
            .map(to_record)
            .ok_or_else(|| IdentityError::UserNotFound(phone_number.to_string()))
    }

    async fn list_users(
        &self,
        max_results: u64,
        page_token: Option<&str>,
    ) -> Result<UserPage, IdentityError> {
        if max_results == 0 || max_results > MAX_PAGE_SIZE {
            return Err(IdentityError::invalid(
                "max_results",
                format!("Must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }

        let mut select = user::Entity::find().order_by_asc(user::Column::Uid);
        if let Some(token) = page_token.filter(|t| !t.is_empty()) {
            select = select.filter(user::Column::Uid.gt(token));
        }

        let mut users: Vec<UserRecord> = select
            .limit(max_results + 1)
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_record)
            .collect();

        let next_page_token = if users.len() as u64 > max_results {
            users.truncate(max_results as usize);
            users.last().map(|u| u.uid.clone())
        } else {
            None
        };

        Ok(UserPage {
            users,
            next_page_token,
        })
    }

    #[instrument(skip(self, claims))]
    async fn set_custom_claims(
        &self,
        uid: &str,
        claims: Map<String, Value>,
    ) -> Result<(), IdentityError> {
        let size = claims_payload_len(&claims);
        if size > MAX_CLAIMS_PAYLOAD {
            return Err(IdentityError::ClaimsTooLarge {
                size,
                limit: MAX_CLAIMS_PAYLOAD,
            });
        }

        let mut model: user::ActiveModel = self.find_by_uid(uid).await?.into();
        model.custom_claims = Set(Value::Object(claims));
        model.update(&self.db).await?;
        Ok(())
    }

    async fn verify_id_token(&self, token: &str) -> Result<DecodedToken, IdentityError> {
        let claims = jwt::verify(token, &self.jwt_secret)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        Ok(DecodedToken {
            uid: claims.sub,
            email: claims.email,
            role: claims.role.and_then(|r| r.parse().ok()),
        })
    }

    #[instrument(skip(self, password))]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignedIn, IdentityError> {
        let user = user::Entity::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(&self.db)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        if user.disabled || !verify_password(password, &user.password_hash)? {
            return Err(IdentityError::InvalidCredentials);
        }

        let record = to_record(user);
        let role = record.role();
        let expires_at = Utc::now() + self.token_ttl;
        let token = jwt::sign(
            &record.uid,
            &record.email,
            role.map(|r| r.as_str()),
            &self.jwt_secret,
            self.token_ttl,
        )
        .map_err(|e| IdentityError::Internal(format!("JWT sign error: {e}")))?;

        Ok(SignedIn {
            token,
            expires_at,
            user: record,
        })
    }
}
