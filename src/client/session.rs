use super::acquirer::{AcquisitionSource, AttachmentAcquirer, BatchReport};
use super::picker::PickerSurface;
use super::transport::{SubmissionTransport, SubmitOutcome};
use crate::config::Config;
use crate::error::TransportError;
use crate::form::{AnswerSet, FILE_MARKER_ID, ValidationReport};
use crate::media::{ImageCompressor, UploadedFile};
use std::time::Duration;

/// One person filling in the questionnaire: their answers, the photos they
/// staged and the transport that sends both.
#[derive(Debug)]
pub struct FormSession {
    answers: AnswerSet,
    acquirer: AttachmentAcquirer,
    transport: SubmissionTransport,
    errors: ValidationReport,
}

impl FormSession {
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let transport = SubmissionTransport::new(
            config.client.endpoint.clone(),
            config.limits.max_total_size,
            Duration::from_secs(config.client.request_timeout_secs),
        )?;
        let acquirer =
            AttachmentAcquirer::new(config.limits, ImageCompressor::new(config.compression));
        Ok(Self::new(acquirer, transport))
    }

    #[must_use]
    pub fn new(acquirer: AttachmentAcquirer, transport: SubmissionTransport) -> Self {
        let mut session = Self {
            answers: AnswerSet::new(),
            acquirer,
            transport,
            errors: ValidationReport::default(),
        };
        session.sync_file_marker();
        session
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    #[must_use]
    pub fn photos(&self) -> &[UploadedFile] {
        self.acquirer.files()
    }

    #[must_use]
    pub fn acquirer(&self) -> &AttachmentAcquirer {
        &self.acquirer
    }

    /// Field errors from the last blocked submission, minus fields edited
    /// since.
    #[must_use]
    pub fn errors(&self) -> &ValidationReport {
        &self.errors
    }

    /// Store an answer and drop any error shown for that field. The file
    /// question is derived from the staged photos and cannot be set here.
    pub fn set_answer(&mut self, id: &str, value: impl Into<String>) -> bool {
        if id == FILE_MARKER_ID {
            return false;
        }
        let stored = self.answers.set(id, value);
        if stored {
            self.errors.errors.retain(|e| e.field != id);
        }
        stored
    }

    pub fn add_photos<F>(
        &mut self,
        source: AcquisitionSource,
        files: Vec<UploadedFile>,
        on_progress: F,
    ) -> BatchReport
    where
        F: FnMut(f64),
    {
        let report = self.acquirer.add_batch(source, files, on_progress);
        self.sync_file_marker();
        report
    }

    pub fn pick_photos<F>(&mut self, surface: &mut dyn PickerSurface, on_progress: F) -> BatchReport
    where
        F: FnMut(f64),
    {
        let report = self.acquirer.pick(surface, on_progress);
        self.sync_file_marker();
        report
    }

    pub fn remove_photo(&mut self, index: usize) -> Option<UploadedFile> {
        let removed = self.acquirer.remove(index);
        self.sync_file_marker();
        removed
    }

    pub fn clear_photos(&mut self) {
        self.acquirer.clear();
        self.sync_file_marker();
    }

    /// Send the questionnaire. Staged photos are cleared only after the
    /// server confirms delivery.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let outcome = self
            .transport
            .submit(&self.answers, self.acquirer.files())
            .await;

        match &outcome {
            SubmitOutcome::Invalid(report) => self.errors = report.clone(),
            SubmitOutcome::Success { .. } => {
                self.errors = ValidationReport::default();
                self.clear_photos();
            }
            _ => {}
        }
        outcome
    }

    fn sync_file_marker(&mut self) {
        self.answers.set_attached_files(self.acquirer.files().len());
    }
}
