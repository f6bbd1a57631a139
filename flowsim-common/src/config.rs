//! Configuration management for the feedback-flow simulator.
//!
//! Configuration lives at `~/.flowsim/config.json`, optionally accompanied by
//! a `levers.json` file holding only lever multipliers (see
//! [`crate::config_loader`]).
//!
//! # Configuration Priority
//!
//! 1. Environment variables (FLOWSIM_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `FLOWSIM_LOG_LEVEL` → observability.log_level
//! - `FLOWSIM_LOG_FORMAT` → observability.log_format

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config_loader::load_modular_config;

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".flowsim"),
        |dirs| dirs.home_dir().join(".flowsim"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Simulator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Feedback lever multipliers
    #[serde(default)]
    pub levers: LeverConfig,

    /// CSV export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Reference input ranges
    #[serde(default)]
    pub ranges: InputRangesConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default directory.
    pub fn load() -> Result<Self> {
        Self::load_from_dir(&config_dir())
    }

    /// Load configuration from a directory, merging modular files.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let value = load_modular_config(Some(dir.to_path_buf()))?;
        let config: Self = serde_json::from_value(value)
            .with_context(|| format!("Failed to parse config from {}", dir.display()))?;

        tracing::info!(
            dir = %dir.display(),
            log_level = %config.observability.log_level,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("FLOWSIM_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("FLOWSIM_LOG_FORMAT") {
            self.observability.log_format = format;
        }
    }

    /// Save configuration to a specific file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).with_context(|| {
                    format!("Failed to create config directory {}", dir.display())
                })?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}

// ============================================================================
// Lever Configuration
// ============================================================================

/// Multipliers applied by each feedback lever.
///
/// Percentages and day counts are multiplied by the factor; the margin-mix
/// lever instead removes a flat number of COGS percentage points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeverConfig {
    /// Supplier negotiation: raw material %
    #[serde(default = "default_raw_material_factor")]
    pub raw_material_factor: f64,

    /// Production optimization: labor %
    #[serde(default = "default_labor_factor")]
    pub labor_factor: f64,

    /// Production optimization: opex %
    #[serde(default = "default_production_opex_factor")]
    pub production_opex_factor: f64,

    /// Efficient logistics: logistics %
    #[serde(default = "default_logistics_factor")]
    pub logistics_factor: f64,

    /// Just-in-time: inventory days
    #[serde(default = "default_inventory_days_factor")]
    pub inventory_days_factor: f64,

    /// Improved collections: receivable days
    #[serde(default = "default_receivable_days_factor")]
    pub receivable_days_factor: f64,

    /// Improved payments: payable days
    #[serde(default = "default_payable_days_factor")]
    pub payable_days_factor: f64,

    /// Predictive maintenance: fixed assets
    #[serde(default = "default_fixed_assets_factor")]
    pub fixed_assets_factor: f64,

    /// Higher-margin mix: COGS percentage points removed
    #[serde(default = "default_margin_mix_cut_points")]
    pub margin_mix_cut_points: f64,
}

impl Default for LeverConfig {
    fn default() -> Self {
        Self {
            raw_material_factor: default_raw_material_factor(),
            labor_factor: default_labor_factor(),
            production_opex_factor: default_production_opex_factor(),
            logistics_factor: default_logistics_factor(),
            inventory_days_factor: default_inventory_days_factor(),
            receivable_days_factor: default_receivable_days_factor(),
            payable_days_factor: default_payable_days_factor(),
            fixed_assets_factor: default_fixed_assets_factor(),
            margin_mix_cut_points: default_margin_mix_cut_points(),
        }
    }
}

fn default_raw_material_factor() -> f64 {
    0.95
}

fn default_labor_factor() -> f64 {
    0.95
}

fn default_production_opex_factor() -> f64 {
    0.97
}

fn default_logistics_factor() -> f64 {
    0.90
}

fn default_inventory_days_factor() -> f64 {
    0.70
}

fn default_receivable_days_factor() -> f64 {
    0.80
}

fn default_payable_days_factor() -> f64 {
    1.15
}

fn default_fixed_assets_factor() -> f64 {
    0.90
}

fn default_margin_mix_cut_points() -> f64 {
    2.0
}

// ============================================================================
// Export Configuration
// ============================================================================

/// CSV export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// File name prefix; the export date and `.csv` are appended
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Decimals used for percentages and percentage-point deltas
    #[serde(default = "default_percent_decimals")]
    pub percent_decimals: usize,

    /// Optional label written into the metadata block
    #[serde(default)]
    pub scenario_label: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: default_file_prefix(),
            percent_decimals: default_percent_decimals(),
            scenario_label: None,
        }
    }
}

fn default_file_prefix() -> String {
    "kpis_feedback".into()
}

fn default_percent_decimals() -> usize {
    1
}

// ============================================================================
// Input Ranges
// ============================================================================

/// Closed numeric interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    pub min: f64,
    pub max: f64,
}

impl RangeConfig {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check whether `value` lies within the range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Reference ranges for business inputs.
///
/// Values outside these ranges are still simulated but reported as warnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputRangesConfig {
    #[serde(default = "default_annual_sales_range")]
    pub annual_sales: RangeConfig,

    #[serde(default = "default_raw_material_pct_range")]
    pub raw_material_pct: RangeConfig,

    #[serde(default = "default_labor_pct_range")]
    pub labor_pct: RangeConfig,

    #[serde(default = "default_logistics_pct_range")]
    pub logistics_pct: RangeConfig,

    #[serde(default = "default_opex_pct_range")]
    pub opex_pct: RangeConfig,
}

impl InputRangesConfig {
    /// Ranges paired with their field names.
    pub fn entries(&self) -> [(&'static str, RangeConfig); 5] {
        [
            ("annual_sales", self.annual_sales),
            ("raw_material_pct", self.raw_material_pct),
            ("labor_pct", self.labor_pct),
            ("logistics_pct", self.logistics_pct),
            ("opex_pct", self.opex_pct),
        ]
    }
}

impl Default for InputRangesConfig {
    fn default() -> Self {
        Self {
            annual_sales: default_annual_sales_range(),
            raw_material_pct: default_raw_material_pct_range(),
            labor_pct: default_labor_pct_range(),
            logistics_pct: default_logistics_pct_range(),
            opex_pct: default_opex_pct_range(),
        }
    }
}

fn default_annual_sales_range() -> RangeConfig {
    RangeConfig::new(500_000.0, 20_000_000.0)
}

fn default_raw_material_pct_range() -> RangeConfig {
    RangeConfig::new(0.0, 60.0)
}

fn default_labor_pct_range() -> RangeConfig {
    RangeConfig::new(0.0, 40.0)
}

fn default_logistics_pct_range() -> RangeConfig {
    RangeConfig::new(0.0, 25.0)
}

fn default_opex_pct_range() -> RangeConfig {
    RangeConfig::new(0.0, 40.0)
}

// ============================================================================
// Observability
// ============================================================================

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!((config.levers.raw_material_factor - 0.95).abs() < f64::EPSILON);
        assert!((config.levers.payable_days_factor - 1.15).abs() < f64::EPSILON);
        assert!((config.levers.margin_mix_cut_points - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.export.file_prefix, "kpis_feedback");
        assert_eq!(config.export.percent_decimals, 1);
        assert_eq!(config.observability.log_format, "pretty");
        assert!(config.ranges.annual_sales.contains(5_000_000.0));
        assert!(!config.ranges.annual_sales.contains(100.0));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "levers": { "labor_factor": 0.9 }, "observability": { "level": "debug" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!((config.levers.labor_factor - 0.9).abs() < f64::EPSILON);
        assert!((config.levers.logistics_factor - 0.90).abs() < f64::EPSILON);
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.observability.log_format, "pretty");
    }

    #[test]
    fn test_overrides_from_lookup() {
        let vars: HashMap<&str, &str> =
            [("FLOWSIM_LOG_LEVEL", "trace"), ("FLOWSIM_LOG_FORMAT", "json")]
                .into_iter()
                .collect();

        let mut config = Config::default();
        config.apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.observability.log_level, "trace");
        assert_eq!(config.observability.log_format, "json");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.export.scenario_label = Some("Plant A".into());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.export.scenario_label.as_deref(), Some("Plant A"));
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from(&dir.path().join("absent.json")).is_err());
    }
}
