use super::types::MediaType;

/// Extensions the photo picker offers alongside the `image/*` wildcard.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "webp"];

#[must_use]
pub fn detect_mime(data: &[u8]) -> Option<String> {
    infer::get(data).map(|info| info.mime_type().to_string())
}

#[must_use]
pub fn detect_mime_from_extension(filename: &str) -> Option<String> {
    let ext = extension_of(filename)?;
    match ext.to_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg".into()),
        "png" => Some("image/png".into()),
        "gif" => Some("image/gif".into()),
        "webp" => Some("image/webp".into()),
        "heic" => Some("image/heic".into()),
        "pdf" => Some("application/pdf".into()),
        "txt" => Some("text/plain".into()),
        _ => None,
    }
}

#[must_use]
pub fn detect_media_type(data: &[u8], filename: Option<&str>) -> (String, MediaType) {
    let mime = detect_mime(data)
        .or_else(|| filename.and_then(detect_mime_from_extension))
        .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());
    let media_type = MediaType::from_mime(&mime);
    (mime, media_type)
}

/// Non-empty extension after the last dot, ignoring dotfiles like `.jpg`.
#[must_use]
pub fn extension_of(filename: &str) -> Option<&str> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

#[must_use]
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type
        .parse::<mime::Mime>()
        .is_ok_and(|m| m.type_() == mime::IMAGE)
}

/// Accept-list check: any `image/*` type, or one of the listed extensions.
#[must_use]
pub fn is_accepted_image(filename: &str, mime_type: &str) -> bool {
    is_image_mime(mime_type)
        || extension_of(filename).is_some_and(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(ext))
        })
}
