//! AI estimation gateway.
//!
//! Builds requests from the active day's context, calls the service, and
//! parses the reply into an [`Estimate`]. The ledger only ever sees the
//! resulting [`NewMealEntry`](crate::models::NewMealEntry) after a
//! [`PendingEstimate`] is confirmed.

mod client;
mod error;
mod pending;
mod request;
mod response;

pub use client::{GroqClient, DEFAULT_BASE_URL, DEFAULT_TEXT_MODEL, DEFAULT_VISION_MODEL};
pub use error::EstimateError;
pub use pending::PendingEstimate;
pub use request::{Attachment, EstimateRequest, PresetUsage, PriorEntry, MAX_ATTACHMENT_BYTES};
pub use response::{parse_calorie_answer, parse_estimate, Estimate};
