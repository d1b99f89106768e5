use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Document,
    Unknown,
}

impl MediaType {
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("image/") {
            Self::Image
        } else if mime.starts_with("application/pdf") || mime.starts_with("text/") {
            Self::Document
        } else {
            Self::Unknown
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Document => "document",
            Self::Unknown => "unknown",
        }
    }
}

/// Content behind an [`UploadedFile`].
///
/// Some clients post only a `{name, size}` description of a file; those
/// arrive as `Unreadable` and are skipped when attachments are assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileBody {
    Bytes(Vec<u8>),
    Unreadable,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileReadError {
    #[error("{name}: file content is not readable")]
    Unreadable { name: String },
}

/// A photo as staged by the client or received by the server. Never mutated
/// in place: compression produces a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub display_name: String,
    pub mime_type: String,
    pub byte_size: u64,
    pub body: FileBody,
}

impl UploadedFile {
    pub fn from_bytes(
        display_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            mime_type: mime_type.into(),
            byte_size: bytes.len() as u64,
            body: FileBody::Bytes(bytes),
        }
    }

    /// A file known only by its metadata.
    pub fn unreadable(
        display_name: impl Into<String>,
        mime_type: impl Into<String>,
        byte_size: u64,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            mime_type: mime_type.into(),
            byte_size,
            body: FileBody::Unreadable,
        }
    }

    pub fn read_bytes(&self) -> Result<&[u8], FileReadError> {
        match &self.body {
            FileBody::Bytes(bytes) => Ok(bytes),
            FileBody::Unreadable => Err(FileReadError::Unreadable {
                name: self.display_name.clone(),
            }),
        }
    }

    #[must_use]
    pub fn media_type(&self) -> MediaType {
        MediaType::from_mime(&self.mime_type)
    }

    /// Extension of the display name, if it has a non-empty one.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        super::detection::extension_of(&self.display_name)
    }
}
