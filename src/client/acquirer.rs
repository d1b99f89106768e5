//! Working set of photos staged for one submission.

use super::picker::{PickerOutcome, PickerSurface, pick_once};
use crate::config::LimitsConfig;
use crate::error::AcquisitionError;
use crate::media::detection::is_accepted_image;
use crate::media::{ImageCompressor, UploadedFile};
use tracing::{debug, info, warn};

#[allow(clippy::cast_precision_loss)]
const MIB: f64 = (1024 * 1024) as f64;

/// Where a batch of files came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionSource {
    DragDrop,
    Picker,
}

impl AcquisitionSource {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DragDrop => "drag_drop",
            Self::Picker => "picker",
        }
    }
}

/// Result of offering one batch to the acquirer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub accepted: usize,
    pub rejections: Vec<AcquisitionError>,
}

impl BatchReport {
    fn rejected(error: AcquisitionError) -> Self {
        Self {
            accepted: 0,
            rejections: vec![error],
        }
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rejections.is_empty()
    }

    /// One line per rejection, or `None` when nothing was rejected.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        if self.rejections.is_empty() {
            return None;
        }
        Some(
            self.rejections
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }
}

#[derive(Debug, Clone)]
pub struct AttachmentAcquirer {
    limits: LimitsConfig,
    compressor: ImageCompressor,
    files: Vec<UploadedFile>,
    pending_error: Option<String>,
    processing: bool,
    progress: f64,
}

impl AttachmentAcquirer {
    #[must_use]
    pub fn new(limits: LimitsConfig, compressor: ImageCompressor) -> Self {
        Self {
            limits,
            compressor,
            files: Vec::new(),
            pending_error: None,
            processing: false,
            progress: 0.0,
        }
    }

    #[must_use]
    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    #[must_use]
    pub fn pending_error(&self) -> Option<&str> {
        self.pending_error.as_deref()
    }

    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Last reported compression progress, 0..=100.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    #[must_use]
    pub fn can_accept_more(&self) -> bool {
        !self.processing && self.files.len() < self.limits.max_files
    }

    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.byte_size).sum()
    }

    /// Offer a batch. The count ceiling is checked for the whole batch first;
    /// after that each file is checked on its own, and the accepted ones are
    /// compressed in order and appended.
    pub fn add_batch<F>(
        &mut self,
        source: AcquisitionSource,
        batch: Vec<UploadedFile>,
        mut on_progress: F,
    ) -> BatchReport
    where
        F: FnMut(f64),
    {
        if batch.is_empty() {
            return BatchReport::default();
        }

        if self.files.len() + batch.len() > self.limits.max_files {
            let report = BatchReport::rejected(AcquisitionError::CountExceeded {
                max_files: self.limits.max_files,
            });
            warn!(
                source = source.as_str(),
                current = self.files.len(),
                incoming = batch.len(),
                max_files = self.limits.max_files,
                "batch rejected: too many files"
            );
            self.pending_error = report.message();
            return report;
        }

        let mut rejections = Vec::new();
        let mut accepted = Vec::with_capacity(batch.len());
        for file in batch {
            match self.check_file(&file) {
                Ok(()) => accepted.push(file),
                Err(error) => {
                    debug!(file = %file.display_name, error = %error, "file rejected");
                    rejections.push(error);
                }
            }
        }

        self.processing = true;
        self.progress = 0.0;
        let compressed = self.compressor.compress_batch(&accepted, |percent| {
            self.progress = percent;
            on_progress(percent);
        });
        self.processing = false;

        let report = BatchReport {
            accepted: compressed.len(),
            rejections,
        };
        self.files.extend(compressed);
        self.pending_error = report.message();

        info!(
            source = source.as_str(),
            accepted = report.accepted,
            rejected = report.rejections.len(),
            staged = self.files.len(),
            "photo batch staged"
        );
        report
    }

    /// Run the picker once and stage whatever it returns. The surface is
    /// released on every outcome.
    pub fn pick<F>(&mut self, surface: &mut dyn PickerSurface, on_progress: F) -> BatchReport
    where
        F: FnMut(f64),
    {
        self.processing = true;
        let outcome = pick_once(surface);
        self.processing = false;

        match outcome {
            PickerOutcome::Selected(files) => {
                self.add_batch(AcquisitionSource::Picker, files, on_progress)
            }
            PickerOutcome::Cancelled => {
                debug!("picker cancelled");
                BatchReport::default()
            }
            PickerOutcome::Failed(reason) => {
                warn!(reason = %reason, "picker failed");
                let report = BatchReport::rejected(AcquisitionError::Picker(reason));
                self.pending_error = report.message();
                report
            }
        }
    }

    /// Drop the file at `index`. Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<UploadedFile> {
        if index >= self.files.len() {
            return None;
        }
        self.pending_error = None;
        Some(self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.pending_error = None;
        self.progress = 0.0;
    }

    fn check_file(&self, file: &UploadedFile) -> Result<(), AcquisitionError> {
        if file.byte_size > self.limits.max_file_size {
            #[allow(clippy::cast_precision_loss)]
            let max_mb = self.limits.max_file_size as f64 / MIB;
            return Err(AcquisitionError::TooLarge {
                name: file.display_name.clone(),
                max_mb: format!("{max_mb:.1}"),
            });
        }
        if !is_accepted_image(&file.display_name, &file.mime_type) {
            return Err(AcquisitionError::InvalidType {
                name: file.display_name.clone(),
            });
        }
        Ok(())
    }
}
