//! Settable configuration keys.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use super::{
    ConfigError, ConfigFile, DEFAULT_MAX_RADIUS_KM, DEFAULT_MAX_RESULTS, KNOWN_PROVIDERS,
};

/// A configuration key, addressed as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    SurveyBearingOffset,
    SurveyAngleTolerance,
    SearchProviders,
    SearchMaxResults,
    SearchMaxRadiusKm,
    SearchTimeoutSecs,
    SearchAmapKey,
    SearchTiandituKey,
    CameraTimeoutMs,
    LifeCircleHomeKeywords,
    LifeCircleWorkKeywords,
    LifeCircleLeisureKeywords,
    LoggingLevel,
    LoggingDirectory,
}

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::SurveyBearingOffset,
            ConfigKey::SurveyAngleTolerance,
            ConfigKey::SearchProviders,
            ConfigKey::SearchMaxResults,
            ConfigKey::SearchMaxRadiusKm,
            ConfigKey::SearchTimeoutSecs,
            ConfigKey::SearchAmapKey,
            ConfigKey::SearchTiandituKey,
            ConfigKey::CameraTimeoutMs,
            ConfigKey::LifeCircleHomeKeywords,
            ConfigKey::LifeCircleWorkKeywords,
            ConfigKey::LifeCircleLeisureKeywords,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingDirectory,
        ]
    }

    /// INI section name.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::SurveyBearingOffset | ConfigKey::SurveyAngleTolerance => "survey",
            ConfigKey::SearchProviders
            | ConfigKey::SearchMaxResults
            | ConfigKey::SearchMaxRadiusKm
            | ConfigKey::SearchTimeoutSecs
            | ConfigKey::SearchAmapKey
            | ConfigKey::SearchTiandituKey => "search",
            ConfigKey::CameraTimeoutMs => "camera",
            ConfigKey::LifeCircleHomeKeywords
            | ConfigKey::LifeCircleWorkKeywords
            | ConfigKey::LifeCircleLeisureKeywords => "life_circle",
            ConfigKey::LoggingLevel | ConfigKey::LoggingDirectory => "logging",
        }
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::SurveyBearingOffset => "bearing_offset",
            ConfigKey::SurveyAngleTolerance => "angle_tolerance",
            ConfigKey::SearchProviders => "providers",
            ConfigKey::SearchMaxResults => "max_results",
            ConfigKey::SearchMaxRadiusKm => "max_radius_km",
            ConfigKey::SearchTimeoutSecs => "timeout_secs",
            ConfigKey::SearchAmapKey => "amap_key",
            ConfigKey::SearchTiandituKey => "tianditu_key",
            ConfigKey::CameraTimeoutMs => "timeout_ms",
            ConfigKey::LifeCircleHomeKeywords => "home_keywords",
            ConfigKey::LifeCircleWorkKeywords => "work_keywords",
            ConfigKey::LifeCircleLeisureKeywords => "leisure_keywords",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingDirectory => "directory",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::SurveyBearingOffset => config.survey.bearing_offset.to_string(),
            ConfigKey::SurveyAngleTolerance => config.survey.angle_tolerance.to_string(),
            ConfigKey::SearchProviders => config.search.providers.join(","),
            ConfigKey::SearchMaxResults => config.search.max_results.to_string(),
            ConfigKey::SearchMaxRadiusKm => config.search.max_radius_km.to_string(),
            ConfigKey::SearchTimeoutSecs => config.search.timeout_secs.to_string(),
            ConfigKey::SearchAmapKey => config.search.amap_key.clone().unwrap_or_default(),
            ConfigKey::SearchTiandituKey => config.search.tianditu_key.clone().unwrap_or_default(),
            ConfigKey::CameraTimeoutMs => config.camera.timeout_ms.to_string(),
            ConfigKey::LifeCircleHomeKeywords => config.life_circle.home_keywords.join(","),
            ConfigKey::LifeCircleWorkKeywords => config.life_circle.work_keywords.join(","),
            ConfigKey::LifeCircleLeisureKeywords => config.life_circle.leisure_keywords.join(","),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingDirectory => config
                .logging
                .directory
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Parse `value` and store it. The config is untouched on error.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::SurveyBearingOffset => {
                config.survey.bearing_offset = self.parse_finite(value)?;
            }
            ConfigKey::SurveyAngleTolerance => {
                let tolerance = self.parse_finite(value)?;
                if !(0.0..180.0).contains(&tolerance) {
                    return Err(self.invalid(value, "must be in [0, 180)"));
                }
                config.survey.angle_tolerance = tolerance;
            }
            ConfigKey::SearchProviders => {
                let providers = split_list(value);
                if providers.is_empty() {
                    return Err(self.invalid(value, "at least one provider is required"));
                }
                if let Some(unknown) = providers
                    .iter()
                    .find(|p| !KNOWN_PROVIDERS.contains(&p.as_str()))
                {
                    return Err(self.invalid(
                        value,
                        &format!(
                            "unknown provider '{}' (expected one of: {})",
                            unknown,
                            KNOWN_PROVIDERS.join(", ")
                        ),
                    ));
                }
                config.search.providers = providers;
            }
            ConfigKey::SearchMaxResults => {
                let max: usize = self.parse_number(value)?;
                if !(1..=DEFAULT_MAX_RESULTS).contains(&max) {
                    return Err(self.invalid(
                        value,
                        &format!("must be between 1 and {}", DEFAULT_MAX_RESULTS),
                    ));
                }
                config.search.max_results = max;
            }
            ConfigKey::SearchMaxRadiusKm => {
                let km = self.parse_finite(value)?;
                if km <= 0.0 || km > DEFAULT_MAX_RADIUS_KM {
                    return Err(self.invalid(
                        value,
                        &format!("must be in (0, {}]", DEFAULT_MAX_RADIUS_KM),
                    ));
                }
                config.search.max_radius_km = km;
            }
            ConfigKey::SearchTimeoutSecs => {
                let secs: u64 = self.parse_number(value)?;
                if secs == 0 {
                    return Err(self.invalid(value, "must be at least 1"));
                }
                config.search.timeout_secs = secs;
            }
            ConfigKey::SearchAmapKey => config.search.amap_key = optional(value),
            ConfigKey::SearchTiandituKey => config.search.tianditu_key = optional(value),
            ConfigKey::CameraTimeoutMs => {
                let ms: u64 = self.parse_number(value)?;
                if ms == 0 {
                    return Err(self.invalid(value, "must be at least 1"));
                }
                config.camera.timeout_ms = ms;
            }
            ConfigKey::LifeCircleHomeKeywords => {
                config.life_circle.home_keywords = split_list(value);
            }
            ConfigKey::LifeCircleWorkKeywords => {
                config.life_circle.work_keywords = split_list(value);
            }
            ConfigKey::LifeCircleLeisureKeywords => {
                config.life_circle.leisure_keywords = split_list(value);
            }
            ConfigKey::LoggingLevel => {
                if value.is_empty() {
                    return Err(self.invalid(value, "must not be empty"));
                }
                EnvFilter::try_new(value).map_err(|e| self.invalid(value, &e.to_string()))?;
                config.logging.level = value.to_string();
            }
            ConfigKey::LoggingDirectory => {
                config.logging.directory = optional(value).map(PathBuf::from);
            }
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse_number<T: FromStr>(&self, value: &str) -> Result<T, ConfigError>
    where
        T::Err: fmt::Display,
    {
        value
            .parse()
            .map_err(|e: T::Err| self.invalid(value, &e.to_string()))
    }

    fn parse_finite(&self, value: &str) -> Result<f64, ConfigError> {
        let number: f64 = self.parse_number(value)?;
        if number.is_finite() {
            Ok(number)
        } else {
            Err(self.invalid(value, "must be a finite number"))
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split([',', '，'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
