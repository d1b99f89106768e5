use super::Config;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::Path;

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let config_path = home.join(".adoptar").join("config.toml");
        let mut config = Self::load_or_init_at(&config_path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load `config_path`, writing defaults there first when it does not exist.
    pub fn load_or_init_at(config_path: &Path) -> Result<Self> {
        if let Some(dir) = config_path.parent()
            && !dir.exists()
        {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        if config_path.exists() {
            let contents =
                fs::read_to_string(config_path).context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            config.config_path = config_path.to_path_buf();
            Ok(config)
        } else {
            let config = Self {
                config_path: config_path.to_path_buf(),
                ..Self::default()
            };
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let persisted = self.config_for_persistence();
        let toml_str = toml::to_string_pretty(&persisted).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }

    /// Credentials only ever come from the environment; never write them to disk.
    fn config_for_persistence(&self) -> Self {
        let mut persisted = self.clone();
        persisted.smtp.user = None;
        persisted.smtp.pass = None;
        persisted
    }

    pub fn validate(&self) -> Result<()> {
        if self.limits.max_files == 0 {
            anyhow::bail!("limits.max_files must be at least 1");
        }
        if self.limits.max_file_size > self.limits.max_total_size {
            anyhow::bail!(
                "limits.max_file_size ({}) exceeds limits.max_total_size ({})",
                self.limits.max_file_size,
                self.limits.max_total_size
            );
        }
        if !(1..=100).contains(&self.compression.quality) {
            anyhow::bail!("compression.quality must be within 1..=100");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use tempfile::TempDir;

    #[test]
    fn load_or_init_writes_defaults_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = Config::load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created.config_path, path);

        let reloaded = Config::load_or_init_at(&path).unwrap();
        assert_eq!(reloaded.limits.max_files, created.limits.max_files);
        assert_eq!(reloaded.smtp.recipient, "adopciones@refugio.com");
    }

    #[test]
    fn save_strips_credentials() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::load_or_init_at(&path).unwrap();
        config.smtp.user = Some("refugio@example.org".into());
        config.smtp.pass = Some("hunter2".into());
        config.save().unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("hunter2"));
        assert!(!raw.contains("refugio@example.org"));
    }

    #[test]
    fn validate_rejects_inconsistent_limits() {
        let mut config = Config::default();
        config.limits.max_file_size = config.limits.max_total_size + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.limits.max_files = 0;
        assert!(config.validate().is_err());

        assert!(Config::default().validate().is_ok());
    }
}
