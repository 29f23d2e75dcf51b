//! PI (Proportional-Integral) Controller
//!
//! Closed-loop mixture controller with anti-windup on the integral accumulator.
//! The output is deliberately left unclamped: saturation belongs to the
//! injector, and clamping the accumulator keeps a saturated injector from
//! winding the integral up without bound.

use serde::{Deserialize, Serialize};
use simcore::{ConfigError, Model, ParameterError, require_finite};

/// Gains and setpoint of the mixture controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerParameters {
    /// Proportional gain (ms per V)
    pub kp: f64,
    /// Integral gain (ms per V*s)
    pub ki: f64,
    /// Target sensor voltage (V)
    pub setpoint_v: f64,
    /// Maximum integral accumulator magnitude (anti-windup)
    pub integral_max: f64,
}

impl Default for ControllerParameters {
    fn default() -> Self {
        Self {
            kp: 3.0,
            ki: 6.0,
            setpoint_v: 0.45,
            integral_max: 2.5,
        }
    }
}

impl ControllerParameters {
    /// Check the values that can be changed at runtime.
    pub fn check_tuning(kp: f64, ki: f64, setpoint_v: f64) -> Result<(), ParameterError> {
        require_finite("kp", kp)?;
        require_finite("ki", ki)?;
        require_finite("setpoint", setpoint_v)?;
        if kp < 0.0 || ki < 0.0 {
            return Err(ParameterError::NegativeGain);
        }
        if !(0.0..=1.0).contains(&setpoint_v) {
            return Err(ParameterError::SetpointOutOfRange);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::check_tuning(self.kp, self.ki, self.setpoint_v)?;
        ConfigError::require_non_negative("integral_max", self.integral_max)?;
        Ok(())
    }

    pub fn with_gains(mut self, kp: f64, ki: f64) -> Self {
        self.kp = kp;
        self.ki = ki;
        self
    }

    pub fn with_setpoint(mut self, setpoint_v: f64) -> Self {
        self.setpoint_v = setpoint_v;
        self
    }

    pub fn with_integral_max(mut self, integral_max: f64) -> Self {
        self.integral_max = integral_max;
        self
    }
}

/// The three terms produced by one controller evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PiOutput {
    pub p_term: f64,
    pub i_term: f64,
    /// Pulse width correction added to the base pulse (ms)
    pub correction: f64,
}

/// PI Controller with state
#[derive(Debug, Clone)]
pub struct PiController {
    params: ControllerParameters,
    integral: f64,
}

impl PiController {
    /// Create a new controller with the given parameters
    pub fn new(params: ControllerParameters) -> Self {
        Self {
            params,
            integral: 0.0,
        }
    }

    /// Evaluate the control law for one sampled error.
    pub fn compute(&mut self, error: f64, dt: f64) -> PiOutput {
        let p_term = self.params.kp * error;

        // Anti-windup: clamp the accumulated state, not the output
        let limit = self.params.integral_max;
        self.integral = (self.integral + error * dt).clamp(-limit, limit);
        let i_term = self.params.ki * self.integral;

        PiOutput {
            p_term,
            i_term,
            correction: p_term + i_term,
        }
    }

    /// Error against the current setpoint for a given feedback voltage
    pub fn error(&self, feedback_voltage: f64) -> f64 {
        self.params.setpoint_v - feedback_voltage
    }

    /// Apply new gains and setpoint, keeping the accumulated integral.
    ///
    /// Nothing changes if the values are rejected.
    pub fn retune(&mut self, kp: f64, ki: f64, setpoint_v: f64) -> Result<(), ParameterError> {
        ControllerParameters::check_tuning(kp, ki, setpoint_v)?;
        self.params.kp = kp;
        self.params.ki = ki;
        self.params.setpoint_v = setpoint_v;
        Ok(())
    }

    /// Get the current integral accumulator value
    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn setpoint(&self) -> f64 {
        self.params.setpoint_v
    }

    /// Get a reference to the parameters
    pub fn parameters(&self) -> &ControllerParameters {
        &self.params
    }
}

impl Model for PiController {
    fn reset(&mut self) {
        self.integral = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zero_error_gives_zero_correction() {
        let mut ctrl = PiController::new(ControllerParameters::default());
        let out = ctrl.compute(0.0, 0.02);
        assert_eq!(out.p_term, 0.0);
        assert_eq!(out.i_term, 0.0);
        assert_eq!(out.correction, 0.0);
    }

    #[test]
    fn test_terms_follow_gains() {
        let params = ControllerParameters::default().with_gains(2.0, 5.0);
        let mut ctrl = PiController::new(params);

        // error = 0.1 for 0.02 s: integral = 0.002
        let out = ctrl.compute(0.1, 0.02);
        assert_abs_diff_eq!(out.p_term, 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(ctrl.integral(), 0.002, epsilon = 1e-12);
        assert_abs_diff_eq!(out.i_term, 0.01, epsilon = 1e-12);
        assert_abs_diff_eq!(out.correction, 0.21, epsilon = 1e-12);
    }

    #[test]
    fn test_anti_windup() {
        let params = ControllerParameters::default().with_integral_max(0.5);
        let mut ctrl = PiController::new(params);

        // Large persistent error tries to wind the integral up
        for _ in 0..1000 {
            let out = ctrl.compute(1.0, 0.02);
            assert!(ctrl.integral() <= 0.5);
            assert_abs_diff_eq!(out.i_term, params.ki * ctrl.integral(), epsilon = 1e-12);
        }
        assert_abs_diff_eq!(ctrl.integral(), 0.5, epsilon = 1e-12);

        // Unwinding starts immediately once the error flips sign
        ctrl.compute(-1.0, 0.02);
        assert_abs_diff_eq!(ctrl.integral(), 0.48, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_windup_is_clamped() {
        let mut ctrl = PiController::new(ControllerParameters::default());
        for _ in 0..1000 {
            ctrl.compute(-1.0, 0.02);
        }
        assert_abs_diff_eq!(ctrl.integral(), -2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_retune_rejects_negative_gain() {
        let mut ctrl = PiController::new(ControllerParameters::default());
        let before = *ctrl.parameters();

        assert_eq!(ctrl.retune(-1.0, 1.0, 0.45), Err(ParameterError::NegativeGain));
        assert_eq!(ctrl.retune(1.0, -0.1, 0.45), Err(ParameterError::NegativeGain));
        assert_eq!(*ctrl.parameters(), before);
    }

    #[test]
    fn test_retune_rejects_setpoint_out_of_range() {
        let mut ctrl = PiController::new(ControllerParameters::default());
        assert_eq!(ctrl.retune(1.0, 1.0, 1.2), Err(ParameterError::SetpointOutOfRange));
        assert_eq!(ctrl.retune(1.0, 1.0, -0.01), Err(ParameterError::SetpointOutOfRange));
        assert!(matches!(
            ctrl.retune(f64::NAN, 1.0, 0.45),
            Err(ParameterError::NotFinite { name: "kp" })
        ));
        assert_eq!(ctrl.setpoint(), 0.45);
    }

    #[test]
    fn test_retune_keeps_integral() {
        let mut ctrl = PiController::new(ControllerParameters::default());
        ctrl.compute(0.1, 0.02);
        let integral = ctrl.integral();

        ctrl.retune(1.0, 2.0, 0.5).unwrap();
        assert_eq!(ctrl.integral(), integral);
        assert_eq!(ctrl.setpoint(), 0.5);
        assert_abs_diff_eq!(ctrl.error(0.3), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_boundary_setpoints_accepted() {
        let mut ctrl = PiController::new(ControllerParameters::default());
        assert!(ctrl.retune(0.0, 0.0, 0.0).is_ok());
        assert!(ctrl.retune(0.0, 0.0, 1.0).is_ok());
    }

    #[test]
    fn test_reset_clears_state() {
        let mut ctrl = PiController::new(ControllerParameters::default());
        for _ in 0..10 {
            ctrl.compute(0.2, 0.02);
        }
        assert!(ctrl.integral() > 0.0);

        ctrl.reset();
        assert_eq!(ctrl.integral(), 0.0);
    }
}
