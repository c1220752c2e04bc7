use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of issued bearer tokens.
    pub token_ttl_hours: i64,
    /// Email granted every role regardless of its claims. Unset in production.
    #[serde(default)]
    pub dev_override_email: Option<String>,
}

impl AuthConfig {
    pub fn is_dev_override(&self, email: &str) -> bool {
        self.dev_override_email
            .as_deref()
            .is_some_and(|dev| !dev.is_empty() && dev.eq_ignore_ascii_case(email))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StatisticsConfig {
    /// School name reported as "Affiliated" in the demographics breakdown.
    pub host_institution: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub statistics: StatisticsConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", vec!["*"])?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "sqlite://portal.db?mode=rwc")?
            .set_default("auth.token_ttl_hours", 24)?
            .set_default(
                "statistics.host_institution",
                "University of California, Santa Cruz",
            )?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., PORTAL__AUTH__JWT_SECRET)
            .add_source(
                Environment::with_prefix("PORTAL")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
