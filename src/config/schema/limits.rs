use serde::{Deserialize, Serialize};

const MIB: u64 = 1024 * 1024;

/// Resource ceilings shared by the acquirer (client) and the normalizer (server).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Per-file ceiling in bytes (default: 5 MiB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Ceiling across all files of one submission in bytes (default: 50 MiB)
    #[serde(default = "default_max_total_size")]
    pub max_total_size: u64,
    /// Maximum number of staged photos (default: 10)
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

fn default_max_file_size() -> u64 {
    5 * MIB
}

fn default_max_total_size() -> u64 {
    50 * MIB
}

fn default_max_files() -> usize {
    10
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            max_total_size: default_max_total_size(),
            max_files: default_max_files(),
        }
    }
}

/// Bounds for client-side photo re-encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionConfig {
    #[serde(default = "default_max_dimension")]
    pub max_width: u32,
    #[serde(default = "default_max_dimension")]
    pub max_height: u32,
    /// JPEG quality, 1..=100 (default: 70)
    #[serde(default = "default_quality")]
    pub quality: u8,
}

fn default_max_dimension() -> u32 {
    1200
}

fn default_quality() -> u8 {
    70
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_dimension(),
            max_height: default_max_dimension(),
            quality: default_quality(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_defaults_match_expected_values() {
        let limits = LimitsConfig::default();
        assert_eq!(limits.max_file_size, 5_242_880);
        assert_eq!(limits.max_total_size, 52_428_800);
        assert_eq!(limits.max_files, 10);
    }

    #[test]
    fn compression_defaults_match_expected_values() {
        let compression = CompressionConfig::default();
        assert_eq!(compression.max_width, 1200);
        assert_eq!(compression.max_height, 1200);
        assert_eq!(compression.quality, 70);
    }
}
