//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the three stores of the click pipeline following the
//! Repository pattern. Concrete implementations live in
//! `crate::infrastructure::persistence`; mock implementations are
//! auto-generated via `mockall` for testing.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - slug to destination mapping (Link Store)
//! - [`ClickOutboxRepository`] - durable queue of click events with lease
//!   fields (Outbox Store)
//! - [`StatsRepository`] - per-day counter reads and cleanup (Aggregate Store)
//! - [`ClickProcessor`] - the consumer-side transaction combining the dedup
//!   registry with the counter upserts (Aggregate Store writes)

pub mod click_processor;
pub mod link_repository;
pub mod outbox_repository;
pub mod stats_repository;

pub use click_processor::{ClickOutcome, ClickProcessor};
pub use link_repository::LinkRepository;
pub use outbox_repository::ClickOutboxRepository;
pub use stats_repository::StatsRepository;

#[cfg(test)]
pub use click_processor::MockClickProcessor;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use outbox_repository::MockClickOutboxRepository;
#[cfg(test)]
pub use stats_repository::MockStatsRepository;
