use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use server::config::AppConfig;
use server::database::init_db;
use server::feed::ChangeFeed;
use server::identity::LocalIdentityProvider;
use server::state::AppState;
use server::store::SeaOrmDocumentStore;
use server::triggers::spawn_triggers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::load().context("Failed to load config")?;
    let db = init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;

    let feed = ChangeFeed::default();
    // Subscribe before anything can write.
    let events = feed.subscribe();

    let store = Arc::new(SeaOrmDocumentStore::new(db.clone(), feed.clone()));
    let identity = Arc::new(LocalIdentityProvider::new(db, feed, &config.auth));

    // TODO: Keep the handle and drain pending events on shutdown.
    let _triggers = spawn_triggers(store.clone(), identity.clone(), events);

    if let Some(email) = &config.auth.dev_override_email {
        warn!(%email, "Dev override enabled, this account is granted every role");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        config: Arc::new(config),
        store,
        identity,
    };
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);
    info!("API docs at http://{}/scalar", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
