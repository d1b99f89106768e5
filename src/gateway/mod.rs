//! Axum HTTP gateway receiving questionnaire submissions.
//!
//! - `POST /api/adoptar`: multipart submission, answered with a
//!   [`SubmissionResponse`]
//! - `GET /health`: liveness plus whether mail delivery is configured
//!
//! Body size is capped just above the aggregate file ceiling so oversized
//! batches still reach the business check and get a JSON answer.

mod handlers;
pub mod normalizer;
pub mod response;
mod server;

pub use normalizer::{FILE_COUNT_FIELD, FILE_PART_PREFIX, NormalizedRequest, RawPart, normalize};
pub use response::SubmissionResponse;
pub use server::{
    build_app, build_state, run_gateway, run_gateway_with_listener, serve, state_with_transport,
};

use crate::config::LimitsConfig;
use crate::pipeline::SubmissionProcessor;
use std::sync::Arc;

pub const SUBMISSION_PATH: &str = "/api/adoptar";
/// Headroom above `max_total_size` for answers and multipart framing.
pub const BODY_HEADROOM: usize = 10 * 1024 * 1024;
/// Request timeout (120s); delivery includes an SMTP round trip.
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Whether submissions can be delivered.
#[derive(Clone, Debug)]
pub enum Delivery {
    Ready(Arc<SubmissionProcessor>),
    /// Mail is not configured. Submissions fail with this message.
    Misconfigured(Arc<str>),
}

impl Delivery {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Shared state for all axum handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub delivery: Delivery,
    pub limits: LimitsConfig,
}

impl AppState {
    /// Largest request body accepted.
    #[must_use]
    pub fn body_limit(&self) -> usize {
        usize::try_from(self.limits.max_total_size)
            .unwrap_or(usize::MAX)
            .saturating_add(BODY_HEADROOM)
    }
}
