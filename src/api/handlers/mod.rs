//! HTTP request handlers.

pub mod links;
pub mod redirect;
pub mod stats;

pub use links::{create_link_handler, delete_link_handler};
pub use redirect::redirect_handler;
pub use stats::stats_handler;
