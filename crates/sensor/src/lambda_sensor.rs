use serde::{Deserialize, Serialize};
use simcore::ConfigError;

/// Half the voltage swing of the characteristic around the setpoint (V).
pub const VOLTAGE_SWING_V: f64 = 0.45;

/// Steepness of the switching curve around lambda = 1.
pub const CURVE_STEEPNESS: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorParameters {
    /// Time constant while the voltage falls (rich -> lean) (s)
    pub tau_rich_to_lean_s: f64,
    /// Time constant while the voltage rises (lean -> rich) (s)
    pub tau_lean_to_rich_s: f64,
}

impl Default for SensorParameters {
    fn default() -> Self {
        SensorParameters {
            tau_rich_to_lean_s: 0.050,
            tau_lean_to_rich_s: 0.080,
        }
    }
}

impl SensorParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("tau_rich_to_lean_s", self.tau_rich_to_lean_s)?;
        ConfigError::require_positive("tau_lean_to_rich_s", self.tau_lean_to_rich_s)?;
        Ok(())
    }

    /// Require `dt / tau <= 1` for both time constants so the lag never overshoots.
    pub fn check_step(&self, dt: f64) -> Result<(), ConfigError> {
        let tau = self.tau_rich_to_lean_s.min(self.tau_lean_to_rich_s);
        if dt > tau {
            return Err(ConfigError::LagStep { scan_interval: dt, tau });
        }
        Ok(())
    }

    /// Time constant for a pending change of `delta` volts.
    pub fn select_tau(&self, delta: f64) -> f64 {
        match LagDirection::from_delta(delta) {
            LagDirection::LeanToRich => self.tau_lean_to_rich_s,
            LagDirection::RichToLean => self.tau_rich_to_lean_s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LagDirection {
    /// Voltage rising
    LeanToRich,
    /// Voltage falling or flat
    RichToLean,
}

impl LagDirection {
    pub fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            LagDirection::LeanToRich
        } else {
            LagDirection::RichToLean
        }
    }
}

/// Static switching curve: high voltage when rich, low when lean, `setpoint` at lambda = 1.
pub fn characteristic(lambda: f64, setpoint: f64) -> f64 {
    setpoint + VOLTAGE_SWING_V * (CURVE_STEEPNESS * (1.0 - lambda)).tanh()
}

fn first_order_lag(prior: f64, target: f64, dt: f64, tau: f64) -> f64 {
    prior + (dt / tau) * (target - prior)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub ideal_voltage: f64,
    pub filtered_voltage: f64,
    pub direction: LagDirection,
    /// Time constant used for this update (s)
    pub tau: f64,
}

impl SensorReading {
    /// Voltage seen by the ECU once EMI is superimposed
    pub fn measured(&self, emi_noise: f64) -> f64 {
        self.filtered_voltage + emi_noise
    }
}

#[derive(Debug, Clone)]
pub struct LambdaSensor {
    params: SensorParameters,
}

impl LambdaSensor {
    pub fn new(params: SensorParameters) -> Self {
        LambdaSensor { params }
    }

    /// Run the characteristic and one lag update from `prior_filtered`.
    ///
    /// The time constant is chosen from this cycle's delta only.
    pub fn measure(&self, lambda: f64, setpoint: f64, prior_filtered: f64, dt: f64) -> SensorReading {
        let ideal_voltage = characteristic(lambda, setpoint);
        let delta = ideal_voltage - prior_filtered;
        let tau = self.params.select_tau(delta);

        SensorReading {
            ideal_voltage,
            filtered_voltage: first_order_lag(prior_filtered, ideal_voltage, dt, tau),
            direction: LagDirection::from_delta(delta),
            tau,
        }
    }

    pub fn parameters(&self) -> &SensorParameters {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_characteristic_shape() {
        assert_eq!(characteristic(1.0, 0.45), 0.45);
        assert!(characteristic(0.9, 0.45) > 0.88);
        assert!(characteristic(1.1, 0.45) < 0.02);

        // Monotonically decreasing in lambda
        let mut prev = f64::INFINITY;
        for i in 0..200 {
            let v = characteristic(0.8 + i as f64 * 0.002, 0.45);
            assert!(v <= prev);
            prev = v;
        }
    }

    #[test]
    fn test_select_tau_by_direction() {
        let params = SensorParameters::default();
        assert_eq!(params.select_tau(0.1), 0.080);
        assert_eq!(params.select_tau(-0.1), 0.050);
        assert_eq!(params.select_tau(0.0), 0.050);
    }

    #[test]
    fn test_lean_step_from_rest() {
        // Idle operating point: 10 g/s air, 0.66 g/s fuel
        let sensor = LambdaSensor::new(SensorParameters::default());
        let lambda = (10.0 / 0.66) / 14.7;
        let reading = sensor.measure(lambda, 0.45, 0.45, 0.02);

        assert_abs_diff_eq!(reading.ideal_voltage, 0.203782, epsilon = 1e-5);
        assert_eq!(reading.direction, LagDirection::RichToLean);
        assert_eq!(reading.tau, 0.050);
        // alpha = 0.4
        assert_abs_diff_eq!(
            reading.filtered_voltage,
            0.45 + 0.4 * (reading.ideal_voltage - 0.45),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(reading.filtered_voltage, 0.351513, epsilon = 1e-5);
    }

    #[test]
    fn test_rising_voltage_uses_slow_tau() {
        let sensor = LambdaSensor::new(SensorParameters::default());
        let reading = sensor.measure(0.95, 0.45, 0.2, 0.02);

        assert!(reading.ideal_voltage > 0.2);
        assert_eq!(reading.direction, LagDirection::LeanToRich);
        assert_eq!(reading.tau, 0.080);
        assert_abs_diff_eq!(
            reading.filtered_voltage,
            0.2 + 0.25 * (reading.ideal_voltage - 0.2),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_tau_is_reselected_every_update() {
        let sensor = LambdaSensor::new(SensorParameters::default());
        let rising = sensor.measure(0.9, 0.45, 0.1, 0.02);
        let falling = sensor.measure(1.1, 0.45, rising.filtered_voltage, 0.02);
        assert_eq!(rising.tau, 0.080);
        assert_eq!(falling.tau, 0.050);
    }

    #[test]
    fn test_noise_is_additive() {
        let sensor = LambdaSensor::new(SensorParameters::default());
        let reading = sensor.measure(1.0, 0.45, 0.45, 0.02);
        assert_abs_diff_eq!(reading.measured(0.01), reading.filtered_voltage + 0.01);
    }

    #[test]
    fn test_step_must_not_exceed_fastest_tau() {
        let params = SensorParameters::default();
        assert!(params.check_step(0.020).is_ok());
        assert!(params.check_step(0.050).is_ok());
        assert_eq!(
            params.check_step(0.2),
            Err(ConfigError::LagStep { scan_interval: 0.2, tau: 0.050 })
        );
    }

    #[test]
    fn test_time_constants_must_be_positive() {
        let zero = SensorParameters { tau_rich_to_lean_s: 0.0, ..Default::default() };
        assert!(matches!(
            zero.validate(),
            Err(ConfigError::NonPositive { name: "tau_rich_to_lean_s", .. })
        ));
        let negative = SensorParameters { tau_lean_to_rich_s: -0.08, ..Default::default() };
        assert!(negative.validate().is_err());
    }
}
