//! Fuel injector actuator
//!
//! Turns the controller's correction into a pulse width with hard saturation,
//! and a pulse width into commanded fuel mass flow.

use serde::{Deserialize, Serialize};
use simcore::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorParameters {
    /// Pulse width at idle with zero correction (ms)
    pub base_pulse_ms: f64,
    pub min_pulse_ms: f64,
    pub max_pulse_ms: f64,
    /// Fuel mass flow per unit pulse width (g/s per ms)
    pub injector_gain: f64,
}

impl Default for ActuatorParameters {
    fn default() -> Self {
        // 10 g/s of air needs ~0.68 g/s of fuel at lambda 1; 0.165 * 4 ms lands just lean of that
        Self {
            base_pulse_ms: 4.0,
            min_pulse_ms: 1.5,
            max_pulse_ms: 8.0,
            injector_gain: 0.165,
        }
    }
}

impl ActuatorParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let min = ConfigError::require_non_negative("min_pulse_ms", self.min_pulse_ms)?;
        let base = ConfigError::require_non_negative("base_pulse_ms", self.base_pulse_ms)?;
        let max = ConfigError::require_non_negative("max_pulse_ms", self.max_pulse_ms)?;
        if !(min <= base && base <= max) {
            return Err(ConfigError::PulseLimits { min, base, max });
        }
        ConfigError::require_non_negative("injector_gain", self.injector_gain)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Injector {
    params: ActuatorParameters,
}

impl Injector {
    pub fn new(params: ActuatorParameters) -> Self {
        Self { params }
    }

    /// Saturate `base_pulse + correction` to the injector's limits.
    pub fn apply(&self, base_pulse: f64, correction: f64) -> f64 {
        (base_pulse + correction).clamp(self.params.min_pulse_ms, self.params.max_pulse_ms)
    }

    /// Pulse width for a correction around the configured base pulse
    pub fn command(&self, correction: f64) -> f64 {
        self.apply(self.params.base_pulse_ms, correction)
    }

    /// Commanded fuel mass flow (g/s) for a pulse width (ms)
    pub fn fuel_flow(&self, pulse_width: f64) -> f64 {
        pulse_width * self.params.injector_gain
    }

    pub fn parameters(&self) -> &ActuatorParameters {
        &self.params
    }
}
