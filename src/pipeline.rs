//! Server-side processing of one submission, from normalized request to
//! delivered email.

use crate::config::SmtpSettings;
use crate::document::{LayoutGeometry, encode, render};
use crate::error::Result;
use crate::form::AnswerSet;
use crate::gateway::normalizer::NormalizedRequest;
use crate::mail::{MailDispatcher, MailTemplates, assemble, compose};
use crate::utils::text::truncate_with_ellipsis;
use std::sync::Arc;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

/// What happened to a submission that was delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub submission_id: Uuid,
    pub pages: usize,
    pub attachments: Vec<String>,
    /// Photos dropped because their content could not be read.
    pub skipped: Vec<String>,
}

/// Stateless per submission; the only shared piece is the mail transport
/// behind the dispatcher.
#[derive(Clone)]
pub struct SubmissionProcessor {
    sender: String,
    recipient: String,
    geometry: LayoutGeometry,
    templates: Arc<MailTemplates>,
    dispatcher: MailDispatcher,
}

impl SubmissionProcessor {
    pub fn new(smtp: &SmtpSettings, dispatcher: MailDispatcher) -> Result<Self> {
        Ok(Self {
            sender: smtp.sender().to_string(),
            recipient: smtp.recipient.clone(),
            geometry: LayoutGeometry::A4,
            templates: Arc::new(MailTemplates::new()?),
            dispatcher,
        })
    }

    pub async fn process(&self, request: NormalizedRequest) -> Result<SubmissionReceipt> {
        let submission_id = Uuid::new_v4();
        let span = info_span!("submission", submission_id = %submission_id);
        self.process_inner(submission_id, request)
            .instrument(span)
            .await
    }

    async fn process_inner(
        &self,
        submission_id: Uuid,
        request: NormalizedRequest,
    ) -> Result<SubmissionReceipt> {
        let total_bytes = request.total_file_bytes();
        let NormalizedRequest {
            mut answers,
            files,
            declared_file_count,
        } = request;

        info!(
            applicant = %truncate_with_ellipsis(answers.full_name(), 60),
            files = files.len(),
            declared_files = ?declared_file_count,
            total_bytes,
            "processing submission"
        );

        answers.set_attached_files(files.len());
        let layout = render(&answers, &self.geometry);
        let pdf = encode(&layout)?;
        info!(pages = layout.page_count(), bytes = pdf.len(), "document rendered");

        let assembled = assemble(answers.full_name(), pdf, &files);
        let attachments: Vec<String> = assembled
            .filenames()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        let skipped = assembled.skipped;

        let message = compose(
            &self.templates,
            &self.sender,
            &self.recipient,
            &answers,
            files.len(),
            assembled.attachments,
        )?;
        self.dispatcher.dispatch(&message).await?;
        info!(attachments = attachments.len(), skipped = skipped.len(), "submission delivered");

        Ok(SubmissionReceipt {
            submission_id,
            pages: layout.page_count(),
            attachments,
            skipped,
        })
    }
}

impl std::fmt::Debug for SubmissionProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionProcessor")
            .field("recipient", &self.recipient)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

/// Lay out and encode answers without sending anything.
pub fn render_document(answers: &AnswerSet) -> Result<Vec<u8>> {
    Ok(crate::document::render_pdf(answers)?)
}
