use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::grid::GridLayout;
use crate::holidays::LunarPolicy;

/// Environment variable naming a configuration file (TOML, or JSON when the
/// file ends in `.json`).
pub const CONFIG_ENV: &str = "TASK_CALENDAR_CONFIG";

/// Largest accepted `prefetch_years`.
pub const MAX_PREFETCH_YEARS: u32 = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub grid_layout: GridLayout,
    pub lunar_policy: LunarPolicy,
    /// Years on each side of the current one to derive holidays for at
    /// startup.
    pub prefetch_years: u32,
}

impl CalendarConfig {
    pub fn from_toml_str(input: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(input: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.prefetch_years > MAX_PREFETCH_YEARS {
            return Err(ConfigError::Invalid(format!(
                "prefetch_years must be at most {MAX_PREFETCH_YEARS}, got {}",
                self.prefetch_years
            )));
        }
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&contents)?,
            _ => Self::from_toml_str(&contents)?,
        };
        tracing::info!(
            path = %path.display(),
            grid_layout = ?config.grid_layout,
            lunar_policy = ?config.lunar_policy,
            prefetch_years = config.prefetch_years,
            "loaded calendar config"
        );
        Ok(config)
    }

    /// Load from the file named by [`CONFIG_ENV`], or defaults when unset.
    pub fn from_env() -> ConfigResult<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load(PathBuf::from(path)),
            _ => Ok(Self::default()),
        }
    }

    /// Years to prefetch around `around`. Values above
    /// [`MAX_PREFETCH_YEARS`] are capped for configs built in code.
    pub fn prefetch_range(&self, around: i32) -> RangeInclusive<i32> {
        let radius = self.prefetch_years.min(MAX_PREFETCH_YEARS) as i32;
        around.saturating_sub(radius)..=around.saturating_add(radius)
    }
}
