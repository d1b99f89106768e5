//! Multipart submission of answers and staged photos.

use crate::error::TransportError;
use crate::form::{AnswerSet, ValidationReport, validate};
use crate::gateway::{FILE_COUNT_FIELD, FILE_PART_PREFIX, SubmissionResponse};
use crate::media::UploadedFile;
use reqwest::multipart::{Form, Part};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const SUCCESS_ALERT: &str = "Formulario enviado correctamente";
pub const RETRY_ALERT: &str = "Error al enviar el formulario. Por favor, inténtalo de nuevo.";

/// Field the aggregate-size problem is reported under.
pub const FILES_FIELD: &str = "files";

#[allow(clippy::cast_precision_loss)]
const MIB: f64 = (1024 * 1024) as f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Invalid,
    Assembling,
    Transmitting,
}

/// How one call to [`SubmissionTransport::submit`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was sent; the report lists the offending fields.
    Invalid(ValidationReport),
    /// Another submission was already in flight.
    Ignored,
    Success { message: String },
    TransportFailure { message: String },
    ServerReportedFailure { message: String },
}

impl SubmitOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Alert text for the outcome, if the user should see one.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Success { .. } => Some(SUCCESS_ALERT.to_string()),
            Self::ServerReportedFailure { message } => {
                Some(format!("Error al enviar el formulario: {message}"))
            }
            Self::TransportFailure { .. } => Some(RETRY_ALERT.to_string()),
            Self::Invalid(_) | Self::Ignored => None,
        }
    }
}

pub struct SubmissionTransport {
    client: reqwest::Client,
    endpoint: String,
    max_total_size: u64,
    submitting: AtomicBool,
    state: Mutex<SubmissionState>,
}

impl std::fmt::Debug for SubmissionTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionTransport")
            .field("endpoint", &self.endpoint)
            .field("max_total_size", &self.max_total_size)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Clears the in-flight flag and returns to `Idle` however the attempt ends.
struct InFlight<'a> {
    transport: &'a SubmissionTransport,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.transport.set_state(SubmissionState::Idle);
        self.transport.submitting.store(false, Ordering::Release);
    }
}

impl SubmissionTransport {
    pub fn new(
        endpoint: impl Into<String>,
        max_total_size: u64,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self::with_client(client, endpoint, max_total_size))
    }

    #[must_use]
    pub fn with_client(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        max_total_size: u64,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            max_total_size,
            submitting: AtomicBool::new(false),
            state: Mutex::new(SubmissionState::Idle),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn state(&self) -> SubmissionState {
        *self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    fn set_state(&self, next: SubmissionState) {
        *self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = next;
    }

    /// Validate, assemble and send one submission. A call made while another
    /// is in flight returns [`SubmitOutcome::Ignored`] without touching the
    /// network.
    pub async fn submit(&self, answers: &AnswerSet, files: &[UploadedFile]) -> SubmitOutcome {
        if self.submitting.swap(true, Ordering::AcqRel) {
            debug!("submission already in flight, ignoring");
            return SubmitOutcome::Ignored;
        }
        let _in_flight = InFlight { transport: self };

        self.set_state(SubmissionState::Validating);
        let report = self.validate(answers, files);
        if !report.is_valid() {
            self.set_state(SubmissionState::Invalid);
            debug!(
                first_invalid = report.first_invalid_field().unwrap_or_default(),
                errors = report.errors.len(),
                "submission blocked by validation"
            );
            return SubmitOutcome::Invalid(report);
        }

        self.set_state(SubmissionState::Assembling);
        let form = match build_form(answers, files) {
            Ok(form) => form,
            Err(error) => {
                warn!(error = %error, "failed to assemble submission");
                return SubmitOutcome::TransportFailure {
                    message: error.to_string(),
                };
            }
        };

        self.set_state(SubmissionState::Transmitting);
        let outcome = match self.transmit(form).await {
            Ok(reply) if reply.success => SubmitOutcome::Success {
                message: reply.message,
            },
            Ok(reply) => SubmitOutcome::ServerReportedFailure {
                message: reply.message,
            },
            Err(error) => {
                warn!(endpoint = %self.endpoint, error = %error, "submission transport failed");
                SubmitOutcome::TransportFailure {
                    message: error.to_string(),
                }
            }
        };

        info!(
            endpoint = %self.endpoint,
            files = files.len(),
            success = outcome.is_success(),
            "submission finished"
        );
        outcome
    }

    fn validate(&self, answers: &AnswerSet, files: &[UploadedFile]) -> ValidationReport {
        let mut report = validate(answers);
        let total: u64 = files.iter().map(|f| f.byte_size).sum();
        if total > self.max_total_size {
            #[allow(clippy::cast_precision_loss)]
            let (total_mb, max_mb) = (total as f64 / MIB, self.max_total_size as f64 / MIB);
            report.push(
                FILES_FIELD,
                format!(
                    "El tamaño total de las fotos ({total_mb:.2}MB) supera el máximo permitido ({max_mb:.1}MB)."
                ),
            );
        }
        report
    }

    async fn transmit(&self, form: Form) -> Result<SubmissionResponse, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        serde_json::from_str::<SubmissionResponse>(&body).map_err(|e| TransportError::Response {
            status: status.as_u16(),
            message: e.to_string(),
        })
    }
}

/// One text part per catalog question, `file_<i>` parts for readable files
/// in order, and the informational `fileCount`.
fn build_form(answers: &AnswerSet, files: &[UploadedFile]) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for (question, value) in answers.iter() {
        form = form.text(question.id, value.to_string());
    }

    let mut sent = 0usize;
    for file in files {
        let Ok(bytes) = file.read_bytes() else {
            warn!(file = %file.display_name, "staged file has no content, not sent");
            continue;
        };
        let mime_type = if file.mime_type.parse::<mime::Mime>().is_ok() {
            file.mime_type.as_str()
        } else {
            "application/octet-stream"
        };
        let part = Part::bytes(bytes.to_vec())
            .file_name(file.display_name.clone())
            .mime_str(mime_type)
            .map_err(|e| TransportError::Request(e.to_string()))?;
        form = form.part(format!("{FILE_PART_PREFIX}{sent}"), part);
        sent += 1;
    }

    Ok(form.text(FILE_COUNT_FIELD, sent.to_string()))
}
