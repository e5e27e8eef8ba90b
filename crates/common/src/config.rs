//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MoviekitError, MoviekitResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// External engine settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Where transient artifacts are written.
    #[serde(default)]
    pub temp: TempConfig,

    /// Edit-chain defaults.
    #[serde(default)]
    pub edit: EditDefaults,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// External transcoding and inspection tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path or name of the `ffmpeg` binary.
    pub ffmpeg_path: String,

    /// Path or name of the `ffprobe` binary.
    pub ffprobe_path: String,

    /// Value passed to `-loglevel`.
    pub loglevel: String,
}

/// Temporary artifact placement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TempConfig {
    /// Directory for transient renders and manifests. `None` means the system temp dir.
    pub dir: Option<PathBuf>,
}

/// Defaults applied to freshly loaded clips.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditDefaults {
    /// Stage `c:v copy` / `c:a copy` on load when no codec is staged yet.
    ///
    /// Off by default. Stream copy cannot be combined with a filter on the same
    /// stream, and every render carries a video scale filter, so the staged
    /// `c:v copy` is dropped at compile time and only audio is passed through
    /// (until an audio fade is staged).
    pub stream_copy_defaults: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "moviekit=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            loglevel: "error".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from `path`, falling back to defaults when missing or malformed.
    pub fn load_from(path: &Path) -> Self {
        match Self::try_load_from(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Using default config");
                Self::default()
            }
        }
    }

    /// Load config from `path`. A missing file yields defaults; an unreadable
    /// or malformed one is an error.
    pub fn try_load_from(path: &Path) -> MoviekitResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            MoviekitError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            MoviekitError::config(format!("failed to parse {}: {e}", path.display()))
        })
    }

    /// Save config to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Temp directory to allocate transient artifacts in.
    pub fn temp_dir(&self) -> PathBuf {
        self.temp.dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("moviekit").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_stream_copy_hook_off() {
        let config = AppConfig::default();
        assert!(!config.edit.stream_copy_defaults);
        assert_eq!(config.engine.ffmpeg_path, "ffmpeg");
        assert_eq!(config.engine.ffprobe_path, "ffprobe");
        assert_eq!(config.temp_dir(), std::env::temp_dir());
    }

    #[test]
    fn test_partial_config_fills_missing_sections() {
        let config: AppConfig =
            serde_json::from_str(r#"{"edit":{"stream_copy_defaults":true}}"#).unwrap();
        assert!(config.edit.stream_copy_defaults);
        assert_eq!(config.engine.loglevel, "error");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_save_then_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.engine.ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg".to_string();
        config.temp.dir = Some(dir.path().to_path_buf());
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.engine.ffmpeg_path, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(loaded.temp_dir(), dir.path());
    }

    #[test]
    fn test_malformed_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.engine.ffmpeg_path, "ffmpeg");
    }

    #[test]
    fn test_strict_load_reports_malformed_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = AppConfig::try_load_from(&path).unwrap_err();
        assert!(matches!(err, MoviekitError::Config { .. }));
        assert!(err.to_string().contains("config.json"));

        let missing = AppConfig::try_load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(missing.engine.loglevel, "error");
    }
}
