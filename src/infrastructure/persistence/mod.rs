//! PostgreSQL repository implementations.
//!
//! Concrete implementations of the domain repository traits using SQLx.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - link storage and retrieval
//! - [`PgClickOutboxRepository`] - outbox append, leased claim, and status
//!   transitions
//! - [`PgStatsRepository`] - daily counter reads and cleanup
//! - [`PgClickProcessor`] - the consumer-side transaction over the dedup
//!   registry, link counter, and daily counters

pub mod pg_click_processor;
pub mod pg_link_repository;
pub mod pg_outbox_repository;
pub mod pg_stats_repository;

pub use pg_click_processor::PgClickProcessor;
pub use pg_link_repository::PgLinkRepository;
pub use pg_outbox_repository::PgClickOutboxRepository;
pub use pg_stats_repository::PgStatsRepository;
