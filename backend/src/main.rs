use std::sync::Arc;
use pollbot::{
    config::Settings,
    queries::PgPollStore,
    registry::PollRegistry,
    routes::{build_rocket, AppState},
};
use shuttle_runtime::CustomError;
use sqlx::PgPool;
use tracing::{info, error, warn};

async fn build_registry(pool: PgPool, settings: &Settings) -> Result<PollRegistry, CustomError> {
    if !settings.persistence {
        warn!("PERSISTENCE is off - polls live in memory only");
        return Ok(PollRegistry::new());
    }

    let store = PgPollStore::new(pool);
    store.migrate().await.map_err(CustomError::new)?;
    info!("📋 Migrations complete");

    let registry = PollRegistry::with_store(Arc::new(store), settings.persist_timeout);
    if settings.rehydrate {
        if let Err(e) = registry.rehydrate().await {
            error!("Rehydration stopped early, serving {} polls: {}", registry.len(), e);
        }
    }
    Ok(registry)
}

#[shuttle_runtime::main]
async fn rocket(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secret_store: shuttle_runtime::SecretStore,
) -> shuttle_rocket::ShuttleRocket {
    info!("🚀 Starting poll bot");

    let settings = Settings::from_lookup(|key| secret_store.get(key));
    info!(
        "Persistence {} (timeout {} ms), rehydrate {}",
        if settings.persistence { "on" } else { "off" },
        settings.persist_timeout.as_millis(),
        settings.rehydrate
    );

    let registry = build_registry(pool, &settings).await?;
    Ok(build_rocket(AppState::new(registry)).into())
}
