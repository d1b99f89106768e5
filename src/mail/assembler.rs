//! Ordered attachment list for one submission: the questionnaire PDF first,
//! then every readable photo in arrival order.

use crate::media::UploadedFile;
use crate::media::detection::extension_of;
use crate::utils::text::filename_safe_name;
use tracing::{debug, warn};

/// Extension used for photos whose name carries none.
pub const FALLBACK_PHOTO_EXTENSION: &str = "jpg";
pub const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    Base64,
}

impl TransferEncoding {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Base64 => "base64",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
    pub content_type: String,
    pub encoding: TransferEncoding,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledAttachments {
    pub attachments: Vec<Attachment>,
    /// Display names of photos that could not be read.
    pub skipped: Vec<String>,
}

impl AssembledAttachments {
    /// Number of photo attachments (everything after the document).
    #[must_use]
    pub fn photo_count(&self) -> usize {
        self.attachments.len().saturating_sub(1)
    }

    #[must_use]
    pub fn filenames(&self) -> Vec<&str> {
        self.attachments.iter().map(|a| a.filename.as_str()).collect()
    }
}

#[must_use]
pub fn document_filename(full_name: &str) -> String {
    format!("formulario-preadopcion-{}.pdf", filename_safe_name(full_name))
}

/// `sequence` is the 1-based arrival position, so numbers stay unique even
/// when earlier photos are skipped.
#[must_use]
pub fn photo_filename(sequence: usize, full_name: &str, original_name: &str) -> String {
    let extension = extension_of(original_name).unwrap_or(FALLBACK_PHOTO_EXTENSION);
    format!(
        "foto-{sequence}-{}.{extension}",
        filename_safe_name(full_name)
    )
}

pub fn assemble(full_name: &str, document: Vec<u8>, files: &[UploadedFile]) -> AssembledAttachments {
    let mut assembled = AssembledAttachments {
        attachments: Vec::with_capacity(files.len() + 1),
        skipped: Vec::new(),
    };

    assembled.attachments.push(Attachment {
        filename: document_filename(full_name),
        content: document,
        content_type: PDF_MIME.to_string(),
        encoding: TransferEncoding::Base64,
    });

    for (index, file) in files.iter().enumerate() {
        match file.read_bytes() {
            Ok(bytes) => {
                let filename = photo_filename(index + 1, full_name, &file.display_name);
                debug!(
                    index,
                    file = %file.display_name,
                    attachment = %filename,
                    size = bytes.len(),
                    "photo attached"
                );
                assembled.attachments.push(Attachment {
                    filename,
                    content: bytes.to_vec(),
                    content_type: file.mime_type.clone(),
                    encoding: TransferEncoding::Base64,
                });
            }
            Err(error) => {
                warn!(index, error = %error, "skipping unreadable photo");
                assembled.skipped.push(file.display_name.clone());
            }
        }
    }

    assembled
}
