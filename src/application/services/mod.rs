//! Business logic services.
//!
//! Services receive their repositories as capability bundles at construction
//! time; there is no runtime lookup or global registry.

pub mod link_service;
pub mod stats_service;

pub use link_service::{CreateLinkInput, LinkService};
pub use stats_service::StatsService;
