use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::LoggingConfig;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CaptureConfig {
    /// Local HTML document to render.
    pub input: PathBuf,
    /// Where the PNG lands. Overwritten on every run.
    pub output: PathBuf,
    /// Budget in milliseconds for the page to settle after navigation.
    pub settle_ms: u64,
    pub width: u32,
    pub height: u32,
    /// Capture the full scrollable page instead of the viewport.
    pub full_page: bool,
    /// Run with a visible window. Headless otherwise.
    pub headed: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("repro.html"),
            output: PathBuf::from("screenshot.png"),
            settle_ms: 2000,
            width: 1280,
            height: 720,
            full_page: false,
            headed: false,
        }
    }
}

/// What happened during config discovery. Loading runs before the
/// tracing subscriber exists, so diagnostics are carried here and
/// emitted by the caller once logging is up.
#[derive(Debug, Default)]
pub struct ConfigReport {
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

impl AppConfig {
    pub fn load() -> (Self, ConfigReport) {
        let paths = vec![
            PathBuf::from("config.toml"),
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("page-snap/config.toml"),
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".page-snap/config.toml"),
        ];

        let mut report = ConfigReport::default();
        for path in paths {
            if !path.exists() {
                continue;
            }
            match Self::try_read(&path) {
                Ok(config) => {
                    report.source = Some(path);
                    return (config, report);
                }
                Err(warning) => report.warnings.push(warning),
            }
        }
        (Self::default(), report)
    }

    /// Load a specific config file, falling back to defaults if it is
    /// missing or malformed.
    pub fn load_from(path: &Path) -> (Self, ConfigReport) {
        let mut report = ConfigReport::default();
        match Self::try_read(path) {
            Ok(config) => {
                report.source = Some(path.to_path_buf());
                (config, report)
            }
            Err(warning) => {
                report.warnings.push(warning);
                (Self::default(), report)
            }
        }
    }

    fn try_read(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
        toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config at {}: {}", path.display(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = CaptureConfig::default();
        assert_eq!(config.input, PathBuf::from("repro.html"));
        assert_eq!(config.output, PathBuf::from("screenshot.png"));
        assert_eq!(config.settle_ms, 2000);
        assert_eq!((config.width, config.height), (1280, 720));
        assert!(!config.full_page);
        assert!(!config.headed);
    }

    #[test]
    fn parses_partial_capture_section() {
        let config: AppConfig = toml::from_str(
            r#"
            [capture]
            output = "out/shot.png"
            settle_ms = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.capture.output, PathBuf::from("out/shot.png"));
        assert_eq!(config.capture.settle_ms, 500);
        // Unspecified fields keep their defaults.
        assert_eq!(config.capture.input, PathBuf::from("repro.html"));
        assert_eq!(config.capture.width, 1280);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.capture.output, PathBuf::from("screenshot.png"));
        assert!(config.logging.log_level.is_none());
    }

    #[test]
    fn load_from_missing_file_falls_back_with_warning() {
        let (config, report) = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.capture.input, PathBuf::from("repro.html"));
        assert!(report.source.is_none());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("/nonexistent/config.toml"));
    }

    #[test]
    fn load_from_malformed_file_reports_parse_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[capture\nbroken").unwrap();

        let (config, report) = AppConfig::load_from(&path);
        assert_eq!(config.capture.width, 1280);
        assert!(report.source.is_none());
        assert!(report.warnings[0].contains("Failed to parse"));
    }

    #[test]
    fn load_from_records_source_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[capture]\nsettle_ms = 100\n").unwrap();

        let (config, report) = AppConfig::load_from(&path);
        assert_eq!(config.capture.settle_ms, 100);
        assert_eq!(report.source.as_deref(), Some(path.as_path()));
        assert!(report.warnings.is_empty());
    }
}
