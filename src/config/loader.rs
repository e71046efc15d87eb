//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{CalculationSettings, EngineConfig, EngineMetadata};

/// Loads and provides access to engine configuration.
///
/// # File Format
///
/// ```text
/// engine:
///   name: "Payroll Invoice Engine"
///   version: "2026-10-01"
/// calculation:
///   overtime_multiplier: "1.5"
///   fallback_date: "1970-01-01"
///   money_decimal_places: 2
///   hours_decimal_places: 2
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/engine.yaml").unwrap();
/// println!("Overtime multiplier: {}", loader.settings().overtime_multiplier);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified YAML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if the file does not exist and
    /// `ConfigParseError` if it cannot be read or is not valid YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        if !path.exists() {
            return Err(EngineError::ConfigNotFound { path: path_str });
        }

        let contents = fs::read_to_string(path).map_err(|e| EngineError::ConfigParseError {
            path: path_str.clone(),
            message: e.to_string(),
        })?;

        let config: EngineConfig =
            serde_yaml::from_str(&contents).map_err(|e| EngineError::ConfigParseError {
                path: path_str.clone(),
                message: e.to_string(),
            })?;

        tracing::debug!(
            path = %path_str,
            version = %config.engine.version,
            "Loaded engine configuration"
        );

        Ok(Self { config })
    }

    /// Builds a loader around in-memory settings, bypassing the filesystem.
    pub fn from_settings(settings: CalculationSettings) -> Self {
        Self {
            config: EngineConfig::new(
                EngineMetadata {
                    name: "Payroll Invoice Engine".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
                settings,
            ),
        }
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the deployment metadata.
    pub fn engine(&self) -> &EngineMetadata {
        &self.config.engine
    }

    /// Returns the calculation settings.
    pub fn settings(&self) -> &CalculationSettings {
        &self.config.calculation
    }
}
