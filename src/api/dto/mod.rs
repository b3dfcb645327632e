//! Request and response DTOs.

pub mod envelope;
pub mod links;
pub mod stats;

pub use envelope::{success, success_codes, ApiEnvelope, CorrelationId, Failure};
