use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// Relay host (default: smtp.gmail.com)
    #[serde(default = "default_smtp_host")]
    pub host: String,
    /// Submission port, STARTTLS is required (default: 587)
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Account name; also used as the sender address. Read from `SMTP_USER`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Read from `SMTP_PASS`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass: Option<String>,
    /// Destination mailbox for every submission (default: adopciones@refugio.com)
    #[serde(default = "default_recipient")]
    pub recipient: String,
    /// Skip certificate verification on the relay (default: false)
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".into()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_recipient() -> String {
    "adopciones@refugio.com".into()
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            user: None,
            pass: None,
            recipient: default_recipient(),
            accept_invalid_certs: false,
        }
    }
}

/// Fully resolved relay settings. Only constructible when credentials exist.
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub recipient: String,
    pub accept_invalid_certs: bool,
}

impl SmtpSettings {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, ConfigError> {
        let user = config
            .user
            .clone()
            .filter(|user| !user.trim().is_empty())
            .ok_or(ConfigError::MissingCredential("SMTP_USER"))?;
        let pass = config
            .pass
            .clone()
            .filter(|pass| !pass.is_empty())
            .ok_or(ConfigError::MissingCredential("SMTP_PASS"))?;

        if config.host.trim().is_empty() {
            return Err(ConfigError::Validation("smtp.host is empty".into()));
        }

        Ok(Self {
            host: config.host.clone(),
            port: config.port,
            user,
            pass,
            recipient: config.recipient.clone(),
            accept_invalid_certs: config.accept_invalid_certs,
        })
    }

    /// Messages are always sent from the authenticated account.
    #[must_use]
    pub fn sender(&self) -> &str {
        &self.user
    }
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .field("recipient", &self.recipient)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}
