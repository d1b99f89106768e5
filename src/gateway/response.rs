use crate::error::AdoptarError;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

pub const SUCCESS_MESSAGE: &str = "Formulario enviado correctamente";
pub const GENERIC_FAILURE_MESSAGE: &str = "Error al enviar el formulario";

/// Body of every submission answer. Clients must look at `success`, not
/// only at the status code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmissionResponse {
    #[must_use]
    pub fn delivered() -> Self {
        Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>, error: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            message: if message.is_empty() {
                GENERIC_FAILURE_MESSAGE.to_string()
            } else {
                message
            },
            error: Some(error.into()),
        }
    }
}

/// Status and body for a failed submission: business failures answer 200,
/// configuration and unexpected failures 500.
#[must_use]
pub fn failure_response(error: &AdoptarError) -> (StatusCode, SubmissionResponse) {
    let status = if error.is_business_failure() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        SubmissionResponse::failed(error.detail(), error.to_string()),
    )
}
