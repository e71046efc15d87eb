//! Configuration loading and management for the Payroll Invoice Engine.
//!
//! This module loads the engine configuration from a YAML file: deployment
//! metadata plus the calculation settings (default overtime multiplier,
//! fallback date for undatable shifts, presentation rounding).
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/engine.yaml").unwrap();
//! println!("Loaded: {}", config.engine().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{CalculationSettings, EngineConfig, EngineMetadata};
