use super::super::{CompressionConfig, GatewayConfig, LimitsConfig, SmtpConfig};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub smtp: SmtpConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub compression: CompressionConfig,

    #[serde(default)]
    pub client: ClientConfig,
}

/// Settings for the submitting side (`adoptar submit`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Submission endpoint (default: <http://127.0.0.1:3000/api/adoptar>)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Whole-request timeout in seconds, delegated to the HTTP client
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:3000/api/adoptar".into()
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());

        Self {
            config_path: home.join(".adoptar").join("config.toml"),
            gateway: GatewayConfig::default(),
            smtp: SmtpConfig::default(),
            limits: LimitsConfig::default(),
            compression: CompressionConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_home_directory() {
        let config = Config::default();
        assert!(config.config_path.ends_with(".adoptar/config.toml"));
        assert_eq!(config.client.endpoint, "http://127.0.0.1:3000/api/adoptar");
        assert_eq!(config.limits.max_files, 10);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let raw = r#"
            [smtp]
            host = "mail.example.org"

            [limits]
            max_files = 4
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.smtp.host, "mail.example.org");
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.limits.max_files, 4);
        assert_eq!(config.limits.max_file_size, 5 * 1024 * 1024);
        assert_eq!(config.gateway.port, 3000);
    }
}
