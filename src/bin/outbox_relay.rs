//! Binary entry point for the outbox relay worker.
//!
//! Claims pending click events from the outbox under a time-bounded lease
//! and publishes them to Kafka, keyed by slug. Multiple instances may run
//! concurrently; the claim's skip-locked semantics and owner-conditional
//! status transitions keep them from stepping on each other.

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use snaplink::config;
use snaplink::domain::relay_worker::{run_relay_worker, RelayConfig};
use snaplink::infrastructure::broker::KafkaClickPublisher;
use snaplink::infrastructure::persistence::PgClickOutboxRepository;
use snaplink::server::shutdown_signal;
use snaplink::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Failed to load .env: {} (using system environment)", e);
    }

    let cfg = config::load_from_env()?;
    telemetry::init(&cfg)?;

    let pool = PgPoolOptions::new()
        .max_connections(cfg.db_max_connections)
        .acquire_timeout(Duration::from_secs(cfg.db_connect_timeout))
        .connect(&cfg.database_url)
        .await?;
    tracing::info!("Connected to database");

    let outbox = Arc::new(PgClickOutboxRepository::new(Arc::new(pool)));
    let publisher = Arc::new(KafkaClickPublisher::new(
        &cfg.kafka_brokers,
        cfg.kafka_click_topic.clone(),
    )?);

    tracing::info!(
        kafka_brokers = %cfg.kafka_brokers,
        kafka_topic = %cfg.kafka_click_topic,
        "Kafka producer ready"
    );

    let relay_config = RelayConfig {
        worker_id: cfg.worker_id.clone(),
        batch_size: cfg.outbox_batch_size,
        poll_interval: cfg.outbox_poll_interval,
        idle_wait: cfg.outbox_idle_wait,
        claim_lease: cfg.outbox_claim_lease,
        retry_base: cfg.outbox_retry_base_delay,
        retry_max: cfg.outbox_retry_max_delay,
        write_timeout: cfg.outbox_write_timeout,
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    run_relay_worker(outbox, publisher, relay_config, shutdown_rx).await;

    tracing::info!("Outbox relay shut down");
    Ok(())
}
