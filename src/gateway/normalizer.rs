//! Turns an inbound multipart body back into answers and files.
//!
//! Clients do not agree on how a photo part looks on the wire. Each
//! `file_*` part is classified once, here, and everything downstream sees a
//! plain [`UploadedFile`].

use crate::config::LimitsConfig;
use crate::error::NormalizeError;
use crate::form::AnswerSet;
use crate::media::UploadedFile;
use crate::media::detection::{detect_mime, detect_mime_from_extension};
use axum::extract::Multipart;
use serde::Deserialize;
use tracing::{debug, warn};

pub const FILE_PART_PREFIX: &str = "file_";
pub const FILE_COUNT_FIELD: &str = "fileCount";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// One multipart part as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl RawPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_name: None,
            content_type: None,
            data: value.into().into_bytes(),
        }
    }

    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            file_name: Some(file_name.into()),
            content_type: Some(content_type.into()),
            data,
        }
    }
}

/// The shapes a file part can take, in classification priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileLike {
    /// A regular file part with a filename.
    NativeFile {
        name: String,
        mime_type: Option<String>,
        data: Vec<u8>,
    },
    /// Anonymous binary content.
    ReadableBlob {
        mime_type: Option<String>,
        data: Vec<u8>,
    },
    /// A JSON `{name, size, type?}` description with no content.
    NamedSizedRecord {
        name: String,
        size: u64,
        mime_type: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct NamedSized {
    name: String,
    size: u64,
    #[serde(default, rename = "type")]
    mime_type: Option<String>,
}

fn is_textual(content_type: Option<&str>) -> bool {
    content_type.is_none_or(|ct| {
        ct.parse::<mime::Mime>().is_ok_and(|m| {
            m.type_() == mime::TEXT || m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON)
        })
    })
}

/// Classify a `file_*` part. `None` means the part is not file-like.
#[must_use]
pub fn classify(part: RawPart) -> Option<FileLike> {
    if let Some(name) = part.file_name.filter(|n| !n.trim().is_empty()) {
        return Some(FileLike::NativeFile {
            name,
            mime_type: part.content_type,
            data: part.data,
        });
    }

    if !part.data.is_empty() && !is_textual(part.content_type.as_deref()) {
        return Some(FileLike::ReadableBlob {
            mime_type: part.content_type,
            data: part.data,
        });
    }

    serde_json::from_slice::<NamedSized>(&part.data)
        .ok()
        .filter(|record| !record.name.trim().is_empty())
        .map(|record| FileLike::NamedSizedRecord {
            name: record.name,
            size: record.size,
            mime_type: record.mime_type.filter(|t| !t.is_empty()),
        })
}

fn resolve_mime(declared: Option<String>, data: &[u8], name: &str) -> String {
    declared
        .filter(|ct| !ct.is_empty() && ct != mime::APPLICATION_OCTET_STREAM.as_ref())
        .or_else(|| detect_mime(data))
        .or_else(|| detect_mime_from_extension(name))
        .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string())
}

impl FileLike {
    /// Collapse into the uniform file value. `part_name` names anonymous
    /// blobs.
    #[must_use]
    pub fn into_uploaded(self, part_name: &str) -> UploadedFile {
        match self {
            Self::NativeFile {
                name,
                mime_type,
                data,
            } => {
                let mime_type = resolve_mime(mime_type, &data, &name);
                UploadedFile::from_bytes(name, mime_type, data)
            }
            Self::ReadableBlob { mime_type, data } => {
                let extension = infer::get(&data).map(|kind| kind.extension());
                let name = match extension {
                    Some(ext) => format!("{part_name}.{ext}"),
                    None => part_name.to_string(),
                };
                let mime_type = resolve_mime(mime_type, &data, &name);
                UploadedFile::from_bytes(name, mime_type, data)
            }
            Self::NamedSizedRecord {
                name,
                size,
                mime_type,
            } => {
                let mime_type = mime_type
                    .or_else(|| detect_mime_from_extension(&name))
                    .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());
                UploadedFile::unreadable(name, mime_type, size)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRequest {
    pub answers: AnswerSet,
    /// Recognized files in arrival order.
    pub files: Vec<UploadedFile>,
    /// What the client claimed to send. Logged, never trusted.
    pub declared_file_count: Option<usize>,
}

impl NormalizedRequest {
    #[must_use]
    pub fn total_file_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.byte_size).sum()
    }
}

/// Partition parts into answers and files and enforce the aggregate size
/// ceiling before anything else looks at the files.
pub fn normalize(
    parts: Vec<RawPart>,
    limits: &LimitsConfig,
) -> Result<NormalizedRequest, NormalizeError> {
    let request = partition(parts);
    let total = enforce_total_size(&request.files, limits.max_total_size)?;
    debug!(files = request.files.len(), total_bytes = total, "request normalized");
    Ok(request)
}

/// Split parts into answers and files, keeping arrival order.
#[must_use]
pub fn partition(parts: Vec<RawPart>) -> NormalizedRequest {
    let mut request = NormalizedRequest::default();
    let mut fields: Vec<(String, String)> = Vec::new();

    for part in parts {
        if part.name.starts_with(FILE_PART_PREFIX) {
            let part_name = part.name.clone();
            match classify(part) {
                Some(file_like) => request.files.push(file_like.into_uploaded(&part_name)),
                None => debug!(part = %part_name, "dropping part that is not file-like"),
            }
            continue;
        }

        let value = String::from_utf8_lossy(&part.data).into_owned();
        if part.name == FILE_COUNT_FIELD {
            request.declared_file_count = value.trim().parse().ok();
            continue;
        }
        fields.push((part.name, value));
    }

    request.answers = AnswerSet::from_fields(fields);
    request.answers.set_attached_files(request.files.len());

    if let Some(declared) = request.declared_file_count
        && declared != request.files.len()
    {
        warn!(
            declared,
            received = request.files.len(),
            "declared file count does not match received files"
        );
    }

    request
}

fn megabytes(bytes: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let mb = bytes as f64 / BYTES_PER_MB;
    format!("{mb:.2}")
}

/// Fail when the files together exceed `max_total_size` bytes.
pub fn enforce_total_size(files: &[UploadedFile], max_total_size: u64) -> Result<u64, NormalizeError> {
    let total: u64 = files.iter().map(|f| f.byte_size).sum();
    if total > max_total_size {
        return Err(NormalizeError::TotalSizeExceeded {
            total_mb: megabytes(total),
            max_mb: megabytes(max_total_size),
        });
    }
    Ok(total)
}

/// Drain an axum multipart body into raw parts.
pub async fn read_multipart(mut multipart: Multipart) -> Result<Vec<RawPart>, NormalizeError> {
    let mut parts = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| NormalizeError::Multipart(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(ToString::to_string);
        let content_type = field.content_type().map(ToString::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| NormalizeError::Multipart(e.body_text()))?
            .to_vec();

        parts.push(RawPart {
            name,
            file_name,
            content_type,
            data,
        });
    }

    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00];

    #[test]
    fn native_file_wins_over_other_shapes() {
        let part = RawPart::file("file_0", "patio.jpg", "image/jpeg", JPEG.to_vec());
        assert!(matches!(classify(part), Some(FileLike::NativeFile { .. })));
    }

    #[test]
    fn blob_without_filename_is_named_after_its_part() {
        let part = RawPart {
            name: "file_1".into(),
            file_name: None,
            content_type: Some("application/octet-stream".into()),
            data: PNG.to_vec(),
        };
        let file = classify(part).unwrap().into_uploaded("file_1");
        assert_eq!(file.display_name, "file_1.png");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.byte_size, PNG.len() as u64);
    }

    #[test]
    fn name_and_size_record_becomes_unreadable_file() {
        let part = RawPart::text("file_2", r#"{"name":"IMG_0042.HEIC","size":2048}"#);
        let file = classify(part).unwrap().into_uploaded("file_2");
        assert_eq!(file.display_name, "IMG_0042.HEIC");
        assert_eq!(file.byte_size, 2048);
        assert_eq!(file.mime_type, "image/heic");
        assert!(file.read_bytes().is_err());
    }

    #[test]
    fn plain_text_under_file_key_is_dropped() {
        assert_eq!(classify(RawPart::text("file_3", "[object Object]")), None);
        assert_eq!(classify(RawPart::text("file_3", r#"{"name":"x.jpg"}"#)), None);
        assert_eq!(classify(RawPart::file("file_3", "", "", Vec::new())), None);
    }

    #[test]
    fn three_valid_files_one_malformed_and_a_count() {
        let parts = vec![
            RawPart::text("fullName", "Juana Pérez"),
            RawPart::file("file_0", "a.jpg", "image/jpeg", JPEG.to_vec()),
            RawPart::file("file_1", "b.png", "image/png", PNG.to_vec()),
            RawPart::text("file_2", "undefined"),
            RawPart::file("file_3", "c.jpg", "image/jpeg", JPEG.to_vec()),
            RawPart::text("fileCount", "3"),
        ];
        let request = normalize(parts, &LimitsConfig::default()).unwrap();

        assert_eq!(request.files.len(), 3);
        assert_eq!(request.declared_file_count, Some(3));
        let names: Vec<_> = request.files.iter().map(|f| f.display_name.as_str()).collect();
        assert_eq!(names, ["a.jpg", "b.png", "c.jpg"]);
        assert_eq!(request.answers.full_name(), "Juana Pérez");
        assert_eq!(request.answers.attached_files(), 3);
        assert_eq!(
            request.total_file_bytes(),
            (2 * JPEG.len() + PNG.len()) as u64
        );
    }

    #[test]
    fn file_count_is_never_an_answer() {
        let request = partition(vec![RawPart::text("fileCount", "7")]);
        assert!(request.answers.iter().all(|(_, value)| value != "7"));
        assert_eq!(request.declared_file_count, Some(7));
        assert!(request.files.is_empty());
    }

    #[test]
    fn oversized_request_is_rejected_whole() {
        let limits = LimitsConfig {
            max_total_size: 10,
            ..LimitsConfig::default()
        };
        let parts = vec![
            RawPart::file("file_0", "a.jpg", "image/jpeg", vec![0; 6]),
            RawPart::file("file_1", "b.jpg", "image/jpeg", vec![0; 6]),
        ];
        assert!(matches!(
            normalize(parts, &limits),
            Err(NormalizeError::TotalSizeExceeded { .. })
        ));
    }

    #[test]
    fn aggregate_size_limit() {
        let mb = 1024 * 1024;
        let under = vec![UploadedFile::unreadable("a.jpg", "image/jpeg", 49 * mb)];
        let over = vec![
            UploadedFile::unreadable("a.jpg", "image/jpeg", 26 * mb),
            UploadedFile::unreadable("b.jpg", "image/jpeg", 25 * mb),
        ];

        assert_eq!(enforce_total_size(&under, 50 * mb).unwrap(), 49 * mb);
        let err = enforce_total_size(&over, 50 * mb).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Total file size too large: 51.00MB > 50.00MB"
        );
    }
}
