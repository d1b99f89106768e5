use super::normalizer::{normalize, read_multipart};
use super::response::{SubmissionResponse, failure_response};
use super::{AppState, Delivery};
use crate::error::{AdoptarError, NormalizeError};
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::IntoResponse,
};

fn failure(error: &AdoptarError) -> (StatusCode, Json<SubmissionResponse>) {
    let (status, body) = failure_response(error);
    if status.is_server_error() {
        tracing::error!(error = %error, "submission failed");
    } else {
        tracing::warn!(error = %error, "submission rejected");
    }
    (status, Json(body))
}

/// GET /health
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "mail_configured": state.delivery.is_ready(),
    }))
}

/// POST /api/adoptar
pub(super) async fn handle_submission(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> impl IntoResponse {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            return failure(&NormalizeError::Multipart(rejection.body_text()).into());
        }
    };

    let parts = match read_multipart(multipart).await {
        Ok(parts) => parts,
        Err(error) => return failure(&error.into()),
    };

    let request = match normalize(parts, &state.limits) {
        Ok(request) => request,
        Err(error) => return failure(&error.into()),
    };

    let processor = match &state.delivery {
        Delivery::Ready(processor) => processor,
        Delivery::Misconfigured(reason) => {
            tracing::error!(reason = %reason, "submission received but mail is not configured");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SubmissionResponse::failed(reason.as_ref(), reason.as_ref())),
            );
        }
    };

    match processor.process(request).await {
        Ok(receipt) => {
            tracing::info!(
                submission_id = %receipt.submission_id,
                attachments = receipt.attachments.len(),
                skipped = receipt.skipped.len(),
                "submission accepted"
            );
            (StatusCode::OK, Json(SubmissionResponse::delivered()))
        }
        Err(error) => failure(&error),
    }
}
