//! Binary entry point for the click consumer.
//!
//! Reads click events from Kafka as part of a consumer group and applies
//! each to the aggregate counters inside one transaction, deduplicated by
//! event id. Offsets are committed only after the transaction commits, so
//! redeliveries are harmless.

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use snaplink::config;
use snaplink::domain::click_consumer::{run_click_consumer, ConsumerConfig};
use snaplink::infrastructure::broker::KafkaClickStream;
use snaplink::infrastructure::persistence::PgClickProcessor;
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

    let stream = Arc::new(KafkaClickStream::new(
        &cfg.kafka_brokers,
        cfg.kafka_click_topic.clone(),
        &cfg.consumer_group_id,
        cfg.consumer_max_wait,
    )?);
    let processor = Arc::new(PgClickProcessor::new(Arc::new(pool)));

    tracing::info!(
        kafka_brokers = %cfg.kafka_brokers,
        kafka_topic = %cfg.kafka_click_topic,
        consumer_group = %cfg.consumer_group_id,
        "Kafka consumer ready"
    );

    let consumer_config = ConsumerConfig {
        operation_timeout: cfg.consumer_operation_timeout,
        consume_backoff: cfg.consumer_backoff,
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    run_click_consumer(stream, processor, consumer_config, shutdown_rx).await;

    tracing::info!("Click consumer shut down");
    Ok(())
}
