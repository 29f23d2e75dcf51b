//! Error types shared by every crate in the workspace.

use thiserror::Error;

/// Rejection of a value passed through a runtime setter.
///
/// The engine state is left untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("gains must be non-negative")]
    NegativeGain,
    #[error("setpoint out of range")]
    SetpointOutOfRange,
    #[error("disturbance duration must be non-negative")]
    NegativeDuration,
    #[error("{name} must be a finite number")]
    NotFinite { name: &'static str },
}

/// Rejection of a configuration at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] ParameterError),
    #[error("{name} must be strictly positive (got {value})")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{name} must be non-negative (got {value})")]
    Negative { name: &'static str, value: f64 },
    #[error("pulse width limits must satisfy min <= base <= max (got {min} / {base} / {max} ms)")]
    PulseLimits { min: f64, base: f64, max: f64 },
    #[error("scan interval {scan_interval}s exceeds the fastest sensor time constant {tau}s")]
    LagStep { scan_interval: f64, tau: f64 },
}

impl ConfigError {
    /// Require `value > 0` and finite.
    pub fn require_positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(ConfigError::NonPositive { name, value })
        }
    }

    /// Require `value >= 0` and finite.
    pub fn require_non_negative(name: &'static str, value: f64) -> Result<f64, ConfigError> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(ConfigError::Negative { name, value })
        }
    }
}

/// Require a finite value at a setter boundary.
pub fn require_finite(name: &'static str, value: f64) -> Result<f64, ParameterError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParameterError::NotFinite { name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_setter_contract() {
        assert_eq!(ParameterError::NegativeGain.to_string(), "gains must be non-negative");
        assert_eq!(ParameterError::SetpointOutOfRange.to_string(), "setpoint out of range");
    }

    #[test]
    fn test_require_positive_rejects_zero_and_nan() {
        assert!(ConfigError::require_positive("tau", 0.0).is_err());
        assert!(ConfigError::require_positive("tau", -0.1).is_err());
        assert!(ConfigError::require_positive("tau", f64::NAN).is_err());
        assert_eq!(ConfigError::require_positive("tau", 0.05), Ok(0.05));
    }

    #[test]
    fn test_require_non_negative_accepts_zero() {
        assert_eq!(ConfigError::require_non_negative("gain", 0.0), Ok(0.0));
        assert!(matches!(
            ConfigError::require_non_negative("gain", -1.0),
            Err(ConfigError::Negative { name: "gain", .. })
        ));
    }

    #[test]
    fn test_parameter_error_converts_into_config_error() {
        let err: ConfigError = ParameterError::NegativeGain.into();
        assert_eq!(err.to_string(), "invalid parameter: gains must be non-negative");
    }
}
