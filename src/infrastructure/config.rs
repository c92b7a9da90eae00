use crate::domain::daily::Estimations;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/boiler";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub estimations: Estimations,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    /// Append-only sample log
    pub data: PathBuf,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Short trend window, counted back from now
    pub window_minutes: i64,
    /// Range of the hourly chart
    pub history_hours: i64,
    /// Below this many rows no report is built
    pub min_samples: usize,
    pub smoothing_radius: usize,
    pub chart_height: usize,
    /// Columns drawn per hour in the hourly chart
    pub hourly_repeat: usize,
    pub exclude_out_of_range: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_minutes: 42,
            history_hours: 24,
            min_samples: 15,
            smoothing_radius: 3,
            chart_height: 10,
            hourly_repeat: 3,
            exclude_out_of_range: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("estimations.{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("estimations.pellet_kg_power must be positive, got {0}")]
    NonPositiveBurnRate(f64),
    #[error("analysis.{0} must be positive")]
    NonPositiveWindow(&'static str),
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let e = &self.estimations;
        for (field, value) in [
            ("pellet_kg_power", e.pellet_kg_power),
            ("pellet_kg_cost", e.pellet_kg_cost),
            ("last_fuel_level", e.last_fuel_level),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }
        if e.pellet_kg_power <= 0.0 {
            return Err(ConfigError::NonPositiveBurnRate(e.pellet_kg_power));
        }
        if self.analysis.window_minutes <= 0 {
            return Err(ConfigError::NonPositiveWindow("window_minutes"));
        }
        if self.analysis.history_hours <= 0 {
            return Err(ConfigError::NonPositiveWindow("history_hours"));
        }
        Ok(())
    }
}

/// Load `path` (extension optional) with `BOILER__SECTION__KEY` environment overrides
pub fn load_config(path: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(config::Environment::with_prefix("BOILER").separator("__"))
        .build()?;

    into_app_config(settings)
}

fn into_app_config(settings: config::Config) -> anyhow::Result<AppConfig> {
    let config: AppConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
