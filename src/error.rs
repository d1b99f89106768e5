use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `adoptar`.
///
/// Each stage of the submission pipeline defines its own error variant so the
/// HTTP boundary can decide between a business failure (`success: false`,
/// status 200) and an unexpected failure (status 500). Binary and CLI code keep
/// using `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum AdoptarError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Client-side acquisition ─────────────────────────────────────────
    #[error("acquisition: {0}")]
    Acquisition(#[from] AcquisitionError),

    // ── Inbound request normalization ───────────────────────────────────
    #[error("request: {0}")]
    Normalize(#[from] NormalizeError),

    // ── Document layout / encoding ──────────────────────────────────────
    #[error("document: {0}")]
    Layout(#[from] LayoutError),

    // ── Mail delivery ───────────────────────────────────────────────────
    #[error("mail: {0}")]
    Mail(#[from] MailError),

    // ── Client transport ────────────────────────────────────────────────
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AdoptarError {
    /// Business failures complete the request normally and report
    /// `success: false`; everything else maps to a 500-class response.
    #[must_use]
    pub fn is_business_failure(&self) -> bool {
        matches!(
            self,
            Self::Normalize(NormalizeError::TotalSizeExceeded { .. }) | Self::Mail(_)
        )
    }

    /// The underlying message without the subsystem prefix.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Config(e) => e.to_string(),
            Self::Acquisition(e) => e.to_string(),
            Self::Normalize(e) => e.to_string(),
            Self::Layout(e) => e.to_string(),
            Self::Mail(e) => e.to_string(),
            Self::Transport(e) => e.to_string(),
            Self::Other(e) => e.to_string(),
        }
    }
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("{0} environment variable is not set")]
    MissingCredential(&'static str),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Acquisition errors ─────────────────────────────────────────────────────

/// Per-file or per-batch rejection while staging photos.
///
/// The `Display` output is the user-facing Spanish message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquisitionError {
    #[error("{name}: archivo demasiado grande (máximo {max_mb}MB)")]
    TooLarge { name: String, max_mb: String },

    #[error("{name}: tipo de archivo no permitido")]
    InvalidType { name: String },

    #[error("Máximo {max_files} archivos permitidos")]
    CountExceeded { max_files: usize },

    #[error("{0}")]
    Picker(String),
}

// ─── Request normalization errors ───────────────────────────────────────────

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Total file size too large: {total_mb}MB > {max_mb}MB")]
    TotalSizeExceeded { total_mb: String, max_mb: String },

    #[error("malformed multipart body: {0}")]
    Multipart(String),
}

// ─── Layout errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("pdf encoding failed: {0}")]
    Encode(String),
}

// ─── Mail errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTP server connection failed: {0}")]
    Unavailable(String),

    #[error("failed to send message: {0}")]
    Send(String),

    #[error("failed to compose message: {0}")]
    Compose(String),
}

// ─── Client transport errors ────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unreadable response ({status}): {message}")]
    Response { status: u16, message: String },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, AdoptarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_names_missing_variable() {
        let err = AdoptarError::Config(ConfigError::MissingCredential("SMTP_USER"));
        assert!(err.to_string().contains("SMTP_USER environment variable is not set"));
        assert_eq!(err.detail(), "SMTP_USER environment variable is not set");
    }

    #[test]
    fn acquisition_messages_are_user_facing() {
        let too_large = AcquisitionError::TooLarge {
            name: "patio.jpg".into(),
            max_mb: "5.0".into(),
        };
        assert_eq!(
            too_large.to_string(),
            "patio.jpg: archivo demasiado grande (máximo 5.0MB)"
        );
        assert_eq!(
            AcquisitionError::CountExceeded { max_files: 10 }.to_string(),
            "Máximo 10 archivos permitidos"
        );
    }

    #[test]
    fn anyhow_interop() {
        let anyhow_err = anyhow::anyhow!("something went wrong");
        let err: AdoptarError = anyhow_err.into();
        assert!(err.to_string().contains("something went wrong"));
    }

    #[test]
    fn business_failures_are_classified() {
        let size = AdoptarError::Normalize(NormalizeError::TotalSizeExceeded {
            total_mb: "51.00".into(),
            max_mb: "50".into(),
        });
        assert!(size.is_business_failure());

        let verify = AdoptarError::Mail(MailError::Unavailable("refused".into()));
        assert!(verify.is_business_failure());

        let config = AdoptarError::Config(ConfigError::MissingCredential("SMTP_PASS"));
        assert!(!config.is_business_failure());

        let multipart = AdoptarError::Normalize(NormalizeError::Multipart("eof".into()));
        assert!(!multipart.is_business_failure());
    }
}
