use serde::{Deserialize, Serialize};

/// Loop state carried from one scan cycle to the next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Clock (s), advanced once per cycle
    pub current_time: f64,
    /// Anti-windup clamped integral accumulator (V*s)
    pub integral_term: f64,
    /// Last commanded injector pulse width (ms)
    pub pulse_width: f64,
    /// Instantaneous sensor voltage before the lag (V)
    pub ideal_sensor_voltage: f64,
    /// Lagged sensor voltage before noise (V)
    pub filtered_sensor_voltage: f64,
    /// Voltage captured at the end of the previous cycle; the controller's next input (V)
    pub feedback_voltage: f64,
}

impl SimulationState {
    /// Rest condition: every voltage at the setpoint, injector at its base pulse.
    pub fn at_equilibrium(setpoint_v: f64, base_pulse_ms: f64) -> Self {
        SimulationState {
            current_time: 0.0,
            integral_term: 0.0,
            pulse_width: base_pulse_ms,
            ideal_sensor_voltage: setpoint_v,
            filtered_sensor_voltage: setpoint_v,
            feedback_voltage: setpoint_v,
        }
    }

    pub fn is_finite(&self) -> bool {
        [
            self.current_time,
            self.integral_term,
            self.pulse_width,
            self.ideal_sensor_voltage,
            self.filtered_sensor_voltage,
            self.feedback_voltage,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}
