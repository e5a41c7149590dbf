//! Configuration file handling.
//!
//! Settings live in an INI file at `~/.config/luopan/config.ini` (or the
//! platform equivalent). Every key is optional; absent or empty keys take
//! their defaults.
//!
//! ```ini
//! [survey]
//! bearing_offset = 0.0
//! angle_tolerance = 0.0
//!
//! [search]
//! providers = amap,tianditu,overpass
//! max_results = 50
//! max_radius_km = 250
//! timeout_secs = 10
//! amap_key =
//! tianditu_key =
//!
//! [camera]
//! timeout_ms = 3000
//!
//! [life_circle]
//! home_keywords = 家,小区,公寓
//! work_keywords = 公司,大厦,办公
//! leisure_keywords = 公园,商场,广场
//!
//! [logging]
//! level = info
//! directory =
//! ```
//!
//! [`ConfigKey`] enumerates every settable key as `section.key`, which is
//! what the CLI `config get/set/list` commands operate on.

mod keys;

pub use keys::ConfigKey;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::camera::DEFAULT_TIMEOUT;
use crate::life_circle::{
    KeywordSets, DEFAULT_HOME_KEYWORDS, DEFAULT_LEISURE_KEYWORDS, DEFAULT_WORK_KEYWORDS,
};
use crate::logging::LoggingConfig;

/// Name of the configuration directory under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "luopan";

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Provider names accepted in `search.providers`.
pub const KNOWN_PROVIDERS: &[&str] = &["amap", "tianditu", "overpass"];

/// Default provider fallback order.
pub const DEFAULT_PROVIDERS: &[&str] = &["amap", "tianditu", "overpass"];

/// Default cap on returned search results.
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Default ceiling on the search radius, in kilometres.
pub const DEFAULT_MAX_RADIUS_KM: f64 = 250.0;

/// Default per-provider timeout, in seconds.
pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 10;

/// Errors from loading, saving or editing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// `[survey]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveySettings {
    /// Added to every measured bearing (magnetic declination correction).
    pub bearing_offset: f64,
    /// Widening applied to both edges of search sectors.
    pub angle_tolerance: f64,
}

impl Default for SurveySettings {
    fn default() -> Self {
        Self {
            bearing_offset: 0.0,
            angle_tolerance: 0.0,
        }
    }
}

/// `[search]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    /// Provider names in fallback order.
    pub providers: Vec<String>,
    pub max_results: usize,
    pub max_radius_km: f64,
    pub timeout_secs: u64,
    pub amap_key: Option<String>,
    pub tianditu_key: Option<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            providers: DEFAULT_PROVIDERS.iter().map(|p| p.to_string()).collect(),
            max_results: DEFAULT_MAX_RESULTS,
            max_radius_km: DEFAULT_MAX_RADIUS_KM,
            timeout_secs: DEFAULT_SEARCH_TIMEOUT_SECS,
            amap_key: None,
            tianditu_key: None,
        }
    }
}

impl SearchSettings {
    pub fn max_radius_meters(&self) -> f64 {
        self.max_radius_km * 1_000.0
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[camera]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraSettings {
    pub timeout_ms: u64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
        }
    }
}

impl CameraSettings {
    /// Staleness timeout; a zero value falls back to the default.
    pub fn timeout(&self) -> Duration {
        if self.timeout_ms == 0 {
            return DEFAULT_TIMEOUT;
        }
        Duration::from_millis(self.timeout_ms)
    }
}

/// `[life_circle]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifeCircleSettings {
    pub home_keywords: Vec<String>,
    pub work_keywords: Vec<String>,
    pub leisure_keywords: Vec<String>,
}

impl Default for LifeCircleSettings {
    fn default() -> Self {
        let owned = |words: &[&str]| words.iter().map(|w| w.to_string()).collect();
        Self {
            home_keywords: owned(DEFAULT_HOME_KEYWORDS),
            work_keywords: owned(DEFAULT_WORK_KEYWORDS),
            leisure_keywords: owned(DEFAULT_LEISURE_KEYWORDS),
        }
    }
}

impl LifeCircleSettings {
    /// Keyword sets for the role assigner.
    pub fn keyword_sets(&self) -> KeywordSets {
        KeywordSets::new(
            &self.home_keywords,
            &self.work_keywords,
            &self.leisure_keywords,
        )
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub survey: SurveySettings,
    pub search: SearchSettings,
    pub camera: CameraSettings,
    pub life_circle: LifeCircleSettings,
    pub logging: LoggingConfig,
}

impl ConfigFile {
    /// Load from the default location, or defaults if the file is absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, or defaults if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut config = Self::default();
        for key in ConfigKey::all() {
            let raw = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()))
                .map(str::trim);
            match raw {
                Some(value) if !value.is_empty() => key.set(&mut config, value)?,
                _ => {}
            }
        }

        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini.write_to_file(path)?;

        tracing::debug!(path = %path.display(), "Saved config file");
        Ok(())
    }
}

/// Directory holding the configuration file.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Full path of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ConfigFile::default();
        assert_eq!(config.search.providers, vec!["amap", "tianditu", "overpass"]);
        assert_eq!(config.search.max_results, 50);
        assert_eq!(config.search.max_radius_meters(), 250_000.0);
        assert_eq!(config.camera.timeout(), Duration::from_millis(3_000));
        assert_eq!(config.logging.level, "info");
        assert!(config.search.amap_key.is_none());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("absent.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = ConfigFile::default();
        config.survey.bearing_offset = -6.5;
        config.search.providers = vec!["overpass".to_string()];
        config.search.amap_key = Some("secret".to_string());
        config.life_circle.work_keywords = vec!["lab".to_string(), "studio".to_string()];
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[camera]\ntimeout_ms = 1500\n\n[search]\namap_key =\n").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.camera.timeout_ms, 1_500);
        assert_eq!(config.search, SearchSettings::default());
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[search]\nmax_results = lots\n").unwrap();

        match ConfigFile::load_from(&path) {
            Err(ConfigError::InvalidValue { key, value, .. }) => {
                assert_eq!(key, "search.max_results");
                assert_eq!(value, "lots");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_camera_timeout_uses_default() {
        let settings = CameraSettings { timeout_ms: 0 };
        assert_eq!(settings.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_keyword_sets_from_settings() {
        let mut settings = LifeCircleSettings::default();
        settings.leisure_keywords = vec!["Dojo".to_string()];
        let sets = settings.keyword_sets();
        assert_eq!(
            sets.score("Karate DOJO").get(crate::life_circle::PointRole::Leisure),
            1
        );
    }

    #[test]
    fn test_config_file_path_ends_with_expected_name() {
        let path = config_file_path();
        assert!(path.ends_with(Path::new(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)));
    }
}
