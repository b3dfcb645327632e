//! Core business data structures.

pub mod daily_count;
pub mod link;
pub mod outbox_event;

pub use daily_count::DailyCount;
pub use link::{Link, NewLink};
pub use outbox_event::ClaimedClickEvent;
