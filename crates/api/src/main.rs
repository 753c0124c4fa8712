//! Service binary: wires configuration, storage, the remote client, the
//! scheduler and the HTTP surface together.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use harvester_api::{build_router, AppState};
use harvester_core::{ApplyBonusCardsJob, AuthService, HarvestJob, NotificationDispatcher};
use harvester_infra::config::{self, HarvesterConfig};
use harvester_infra::{
    AutomationScheduler, DbManager, HttpChannelSender, HttpChannelSenderConfig,
    RewardsApiClient, RewardsApiClientConfig, SchedulerConfig, SqliteChannelRepository,
    SqliteLoginRepository,
};
use tokio::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::load().context("failed to load configuration")?;
    run(config).await
}

async fn run(config: HarvesterConfig) -> anyhow::Result<()> {
    let db = Arc::new(
        DbManager::new(&config.database.path, config.database.pool_size)
            .context("failed to open database")?,
    );
    db.run_migrations().context("failed to run migrations")?;

    let login_store = Arc::new(SqliteLoginRepository::new(Arc::clone(&db)));
    let channel_store = Arc::new(SqliteChannelRepository::new(Arc::clone(&db)));

    let api_client = Arc::new(
        RewardsApiClient::new(RewardsApiClientConfig {
            base_url: config.rewards.base_url.clone(),
            request_timeout: Duration::from_secs(config.rewards.request_timeout_secs),
        })
        .context("failed to build rewards api client")?,
    );
    let sender = Arc::new(
        HttpChannelSender::new(HttpChannelSenderConfig::default())
            .context("failed to build notification sender")?,
    );

    let auth = Arc::new(AuthService::new(api_client.clone(), login_store.clone()));
    let dispatcher = Arc::new(NotificationDispatcher::new(channel_store, sender));

    let mut scheduler = AutomationScheduler::new(SchedulerConfig {
        job_timeout: Duration::from_secs(config.jobs.job_timeout_secs),
        ..SchedulerConfig::default()
    })
    .await
    .context("failed to build scheduler")?;

    scheduler
        .register(
            Arc::new(HarvestJob::new(
                api_client.clone(),
                login_store.clone(),
                dispatcher.clone(),
            )),
            &config.jobs.harvest_cron,
        )
        .await
        .context("failed to register harvest job")?;
    scheduler
        .register(
            Arc::new(ApplyBonusCardsJob::new(api_client, login_store)),
            &config.jobs.bonus_cards_cron,
        )
        .await
        .context("failed to register bonus card job")?;
    scheduler.start().await.context("failed to start scheduler")?;

    let scheduler = Arc::new(Mutex::new(scheduler));
    let state = AppState::new(auth, dispatcher, Arc::clone(&scheduler), db);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.listen_addr))?;
    info!(addr = %config.server.listen_addr, "http server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;

    info!("http server stopped, shutting down scheduler");
    if let Err(err) = scheduler.lock().await.stop().await {
        error!(error = ?err, "scheduler shutdown failed");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = ?err, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}
