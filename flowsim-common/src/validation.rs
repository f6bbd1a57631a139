//! Configuration and input validation.
//!
//! Provides validation logic for configuration sections so that lever
//! multipliers, ranges and output settings are within usable bounds before
//! any scenario is simulated.

use thiserror::Error;

use crate::config::{
    Config, ExportConfig, InputRangesConfig, LeverConfig, ObservabilityConfig, RangeConfig,
};

/// Validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Value {value} for {field} is outside [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Largest accepted lever multiplier.
pub const MAX_LEVER_FACTOR: f64 = 10.0;

/// Trait for validatable values.
pub trait Validate {
    /// Validate this value.
    fn validate(&self) -> ValidationResult<()>;
}

/// Collapse a list of errors into a single result.
pub fn collect_errors(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    if errors.is_empty() {
        Ok(())
    } else if errors.len() == 1 {
        Err(errors.remove(0))
    } else {
        Err(ValidationError::Multiple(errors))
    }
}

/// Require `value` to be finite and non-negative.
pub fn check_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("must be a finite number, got {}", value),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("must not be negative, got {}", value),
        });
    }
    Ok(())
}

/// Require `value` to lie in the closed interval `[min, max]`.
pub fn check_range(field: &str, value: f64, min: f64, max: f64) -> ValidationResult<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

impl Config {
    /// Validate the entire configuration.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = self.levers.validate() {
            errors.push(e);
        }
        if let Err(e) = self.export.validate() {
            errors.push(e);
        }
        if let Err(e) = self.ranges.validate() {
            errors.push(e);
        }
        if let Err(e) = self.observability.validate() {
            errors.push(e);
        }

        collect_errors(errors)
    }

    /// Load and validate configuration.
    pub fn load_and_validate() -> anyhow::Result<Self> {
        let config = Self::load()?;
        config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok(config)
    }
}

impl Validate for LeverConfig {
    fn validate(&self) -> ValidationResult<()> {
        let factors = [
            ("levers.raw_material_factor", self.raw_material_factor),
            ("levers.labor_factor", self.labor_factor),
            ("levers.production_opex_factor", self.production_opex_factor),
            ("levers.logistics_factor", self.logistics_factor),
            ("levers.inventory_days_factor", self.inventory_days_factor),
            ("levers.receivable_days_factor", self.receivable_days_factor),
            ("levers.payable_days_factor", self.payable_days_factor),
            ("levers.fixed_assets_factor", self.fixed_assets_factor),
        ];

        let mut errors: Vec<ValidationError> = factors
            .iter()
            .filter_map(|(field, value)| check_range(field, *value, 0.0, MAX_LEVER_FACTOR).err())
            .collect();
        let cut = check_non_negative("levers.margin_mix_cut_points", self.margin_mix_cut_points);
        if let Err(e) = cut {
            errors.push(e);
        }
        collect_errors(errors)
    }
}

impl Validate for ExportConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.file_prefix.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "export.file_prefix".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.file_prefix.contains(['/', '\\']) {
            return Err(ValidationError::InvalidValue {
                field: "export.file_prefix".into(),
                reason: "must not contain path separators".into(),
            });
        }
        if self.percent_decimals > 6 {
            return Err(ValidationError::InvalidValue {
                field: "export.percent_decimals".into(),
                reason: format!("at most 6 decimals supported, got {}", self.percent_decimals),
            });
        }
        Ok(())
    }
}

impl RangeConfig {
    fn validate_as(&self, field: &str) -> ValidationResult<()> {
        check_non_negative(&format!("{}.min", field), self.min)?;
        check_non_negative(&format!("{}.max", field), self.max)?;
        if self.min > self.max {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                reason: format!("min {} exceeds max {}", self.min, self.max),
            });
        }
        Ok(())
    }
}

impl Validate for InputRangesConfig {
    fn validate(&self) -> ValidationResult<()> {
        let errors = self
            .entries()
            .iter()
            .filter_map(|(name, range)| range.validate_as(&format!("ranges.{}", name)).err())
            .collect();
        collect_errors(errors)
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.log_format.as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: format!(
                    "must be one of {:?}, got '{}'",
                    valid_formats, self.log_format
                ),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("must be one of {:?}, got '{}'", valid_levels, self.log_level),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_negative_lever_factor_rejected() {
        let config = LeverConfig {
            labor_factor: -0.5,
            ..LeverConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("levers.labor_factor"));
    }

    #[test]
    fn test_non_finite_lever_factor_rejected() {
        let config = LeverConfig {
            payable_days_factor: f64::NAN,
            margin_mix_cut_points: f64::INFINITY,
            ..LeverConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::Multiple(ref errs)) if errs.len() == 2
        ));
    }

    #[test_case(MAX_LEVER_FACTOR, true ; "largest factor")]
    #[test_case(MAX_LEVER_FACTOR + 0.5, false ; "factor above bound")]
    #[test_case(0.0, true ; "zero factor")]
    fn test_lever_factor_bound(factor: f64, ok: bool) {
        let config = LeverConfig {
            payable_days_factor: factor,
            ..LeverConfig::default()
        };
        assert_eq!(config.validate().is_ok(), ok);
    }

    #[test_case("", false ; "empty prefix")]
    #[test_case("reports/kpis", false ; "path separator")]
    #[test_case("kpis_feedback", true ; "default prefix")]
    fn test_export_prefix(prefix: &str, ok: bool) {
        let config = ExportConfig {
            file_prefix: prefix.to_string(),
            ..ExportConfig::default()
        };
        assert_eq!(config.validate().is_ok(), ok);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut ranges = InputRangesConfig::default();
        ranges.labor_pct = RangeConfig { min: 50.0, max: 10.0 };
        let err = ranges.validate().unwrap_err();
        assert!(err.to_string().contains("ranges.labor_pct"));
    }

    #[test_case("json", "info", true)]
    #[test_case("pretty", "DEBUG", true)]
    #[test_case("xml", "info", false)]
    #[test_case("pretty", "verbose", false)]
    fn test_observability(format: &str, level: &str, ok: bool) {
        let config = ObservabilityConfig {
            log_format: format.to_string(),
            log_level: level.to_string(),
        };
        assert_eq!(config.validate().is_ok(), ok);
    }

    #[test]
    fn test_check_range() {
        assert!(check_range("tax", 0.25, 0.0, 1.0).is_ok());
        assert!(check_range("tax", 1.5, 0.0, 1.0).is_err());
        assert!(check_range("tax", f64::NAN, 0.0, 1.0).is_err());
    }
}
