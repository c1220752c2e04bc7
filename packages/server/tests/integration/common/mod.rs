use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use portal_common::UserRole;
use reqwest::Client;
use serde_json::{Map, Value, json};

use server::config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, ServerConfig, StatisticsConfig,
};
use server::feed::ChangeFeed;
use server::identity::{IdentityProvider, LocalIdentityProvider};
use server::state::AppState;
use server::store::{DocumentStore, SeaOrmDocumentStore, paths};
use server::triggers::spawn_triggers;

/// Password every test applicant signs up with.
pub const PASSWORD: &str = "correct-horse-battery";

/// Placeholder commit time, replaced when role sync applies the document.
const PENDING: &str = "pending";

pub mod routes {
    pub const AUTH_TEST: &str = "/api/v1/auth/test";
    pub const AUTH_TEST_AUTHENTICATED: &str = "/api/v1/auth/test-authenticated";
    pub const LOGIN: &str = "/api/v1/auth/login";
    pub const ME: &str = "/api/v1/auth/me";

    pub const APPLICATION: &str = "/api/v1/application";
    pub const APPLICATION_UNAUTHENTICATED: &str = "/api/v1/application/unauthenticated";
    pub const APPLICATION_AUTHENTICATED: &str = "/api/v1/application/authenticated";
    pub const APPLICATION_EXPORT: &str = "/api/v1/application/export";

    pub const USERS: &str = "/api/v1/users";

    pub fn user_role(email: &str) -> String {
        format!("/api/v1/users/{email}/role")
    }

    pub const STATISTICS: &str = "/api/v1/statistics";
    pub const STATISTICS_GENERATE: &str = "/api/v1/statistics/generate";
}

/// A running test server with its trigger consumer.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<SeaOrmDocumentStore>,
    pub identity: Arc<LocalIdentityProvider>,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.expect("Failed to read response body");
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    /// The `data` member of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors: CorsConfig {
                allow_origins: vec!["*".to_string()],
                max_age: 3600,
            },
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
        },
        auth: AuthConfig {
            jwt_secret: "test-secret-for-integration-tests".to_string(),
            token_ttl_hours: 1,
            dev_override_email: None,
        },
        statistics: StatisticsConfig {
            host_institution: "University of California, Santa Cruz".to_string(),
        },
    }
}

/// A complete, valid application body.
pub fn application_body(email: &str, phone: &str) -> Value {
    json!({
        "user": {
            "first_name": "Sammy",
            "last_name": "Slug",
            "email": email,
            "phone_number": phone,
            "password": PASSWORD,
        },
        "demographics": {
            "age": 20,
            "country": "United States",
            "school": "University of California, Santa Cruz",
            "year_in_school": "Third Year",
            "graduation_year": "2026",
            "area_of_study": "Computer Engineering",
            "first_hackathon": "No",
            "hackathon_experience": "1-2",
            "pronouns": "they/them",
            "gender_identity_one": "Non-binary",
        },
        "short_response": {
            "why_attend": "To build something with friends",
            "what_to_learn": "Embedded Rust",
        },
        "logistics": {
            "need_travel_reimbursement": "No",
            "tshirt_size": "M",
            "dietary_restrictions": "Vegetarian",
        },
        "socials": {
            "github": "https://github.com/sammy",
            "referral": "Instagram",
        },
    })
}

/// Poll `check` until it holds, failing the test after a few seconds.
pub async fn eventually<F, Fut>(what: &str, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..250 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("Timed out waiting for {what}");
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config()).await
    }

    pub async fn spawn_with(config: AppConfig) -> Self {
        let db = server::database::init_db(&config.database.url)
            .await
            .expect("Failed to initialize test database");

        let feed = ChangeFeed::default();
        let events = feed.subscribe();
        let store = Arc::new(SeaOrmDocumentStore::new(db.clone(), feed.clone()));
        let identity = Arc::new(LocalIdentityProvider::new(db, feed, &config.auth));
        spawn_triggers(store.clone(), identity.clone(), events);

        let state = AppState {
            config: Arc::new(config),
            store: store.clone(),
            identity: identity.clone(),
        };
        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            store,
            identity,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_without_token(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_without_token(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn put_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");

        TestResponse::from_response(res).await
    }

    pub async fn login(&self, email: &str) -> String {
        let res = self
            .post_without_token(routes::LOGIN, &json!({"email": email, "password": PASSWORD}))
            .await;
        assert_eq!(res.status, 200, "Login failed: {}", res.text);

        res.data()["token"]
            .as_str()
            .expect("Login response should contain a token")
            .to_string()
    }

    /// Wait until the signup trigger and the role sync it causes have both run.
    ///
    /// The signup trigger creates the role document; role sync then rewrites it, so a
    /// document updated after creation means the account has settled.
    pub async fn wait_for_signup(&self, email: &str) {
        let store = self.store.clone();
        let path = paths::role(email);
        eventually("signup to settle", || {
            let store = store.clone();
            let path = path.clone();
            async move {
                matches!(
                    store.get(&path).await,
                    Ok(Some(doc)) if doc.update_time > doc.create_time
                )
            }
        })
        .await;
    }

    /// Wait until the account's claims carry `role`.
    pub async fn wait_for_claim(&self, email: &str, role: UserRole) {
        let identity = self.identity.clone();
        let email = email.to_string();
        eventually(&format!("{email} to have role {role}"), || {
            let identity = identity.clone();
            let email = email.clone();
            async move {
                identity
                    .get_user_by_email(&email)
                    .await
                    .is_ok_and(|user| user.role() == Some(role))
            }
        })
        .await;
    }

    /// Submit an application without a login, wait for the signup trigger, and sign in.
    pub async fn create_applicant(&self, email: &str, phone: &str) -> String {
        let res = self
            .post_without_token(
                routes::APPLICATION_UNAUTHENTICATED,
                &application_body(email, phone),
            )
            .await;
        assert_eq!(res.status, 200, "Application failed: {}", res.text);

        self.wait_for_signup(email).await;
        self.login(email).await
    }

    /// Create an applicant, promote them by writing their role document, and sign in
    /// again so the token carries the new role.
    ///
    /// Returns once role sync has stamped the document, so no trigger write is still
    /// pending for this account.
    pub async fn create_user_with_role(&self, email: &str, phone: &str, role: UserRole) -> String {
        let token = self.create_applicant(email, phone).await;
        if role == UserRole::Applicant {
            return token;
        }

        self.write_role_document(email, json!({"role": role, "_last_committed": PENDING}))
            .await;
        self.wait_for_claim(email, role).await;

        let store = self.store.clone();
        let path = paths::role(email);
        eventually("role sync to stamp the role document", || {
            let store = store.clone();
            let path = path.clone();
            async move {
                matches!(
                    store.get(&path).await,
                    Ok(Some(doc)) if doc.data["_last_committed"] != PENDING
                )
            }
        })
        .await;

        self.login(email).await
    }

    pub async fn write_role_document(&self, email: &str, body: Value) {
        let doc: Map<String, Value> = body.as_object().cloned().expect("role body is an object");
        self.store
            .merge(&paths::role(email), doc)
            .await
            .expect("Failed to write role document");
    }
}
