//! CLI configuration.

use std::path::PathBuf;

use tracing::warn;
use vsec_report::{ComposerConfig, EmptyTextPolicy};

/// Settings read from the environment (and `.env`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliConfig {
    /// Directory for temporary thumbnails
    pub temp_dir: Option<PathBuf>,
    /// FFmpeg executable to use instead of the one on `PATH`
    pub ffmpeg_bin: Option<String>,
    /// Handling of requests without report text
    pub empty_text: EmptyTextPolicy,
}

impl CliConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let empty_text = match non_empty("VSEC_EMPTY_TEXT") {
            Some(value) => value.parse().unwrap_or_else(|e| {
                warn!("Ignoring VSEC_EMPTY_TEXT: {}", e);
                EmptyTextPolicy::default()
            }),
            None => EmptyTextPolicy::default(),
        };

        Self {
            temp_dir: non_empty("VSEC_TEMP_DIR").map(PathBuf::from),
            ffmpeg_bin: non_empty("VSEC_FFMPEG_BIN"),
            empty_text,
        }
    }

    /// Composer settings, with defaults for everything not configured here.
    pub fn composer_config(&self) -> ComposerConfig {
        ComposerConfig {
            temp_dir: self.temp_dir.clone(),
            ffmpeg_bin: self.ffmpeg_bin.clone(),
            empty_text: self.empty_text,
            ..ComposerConfig::default()
        }
    }

    /// Directory used for temporary files.
    pub fn effective_temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CliConfig::from_lookup(lookup(&[]));
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.composer_config(), ComposerConfig::default());
    }

    #[test]
    fn test_reads_variables() {
        let config = CliConfig::from_lookup(lookup(&[
            ("VSEC_TEMP_DIR", "/var/tmp/vsec"),
            ("VSEC_FFMPEG_BIN", "/opt/ffmpeg/bin/ffmpeg"),
            ("VSEC_EMPTY_TEXT", "reject"),
        ]));
        assert_eq!(config.temp_dir, Some(PathBuf::from("/var/tmp/vsec")));
        assert_eq!(config.ffmpeg_bin.as_deref(), Some("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.empty_text, EmptyTextPolicy::Reject);
        assert_eq!(config.effective_temp_dir(), PathBuf::from("/var/tmp/vsec"));
    }

    #[test]
    fn test_blank_and_invalid_values_fall_back() {
        let config = CliConfig::from_lookup(lookup(&[
            ("VSEC_TEMP_DIR", "  "),
            ("VSEC_EMPTY_TEXT", "sometimes"),
        ]));
        assert_eq!(config.temp_dir, None);
        assert_eq!(config.empty_text, EmptyTextPolicy::Render);
    }
}
