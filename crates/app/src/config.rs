//! Simulation configuration
//!
//! One flat, serde-friendly struct holding every tunable of the loop. Missing
//! JSON fields fall back to the idle operating point defaults.

use combustion::{DisturbanceSpec, NoiseSpec, PlantParameters};
use control::{ActuatorParameters, ControllerParameters};
use sensor::SensorParameters;
use serde::{Deserialize, Serialize};
use simcore::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// ECU scan interval (s)
    pub scan_interval_s: f64,

    pub setpoint_v: f64,
    pub kp: f64,
    pub ki: f64,
    pub integral_max: f64,

    pub base_pulse_ms: f64,
    pub min_pulse_ms: f64,
    pub max_pulse_ms: f64,
    /// g/s of fuel per ms of pulse
    pub injector_gain: f64,

    pub base_air_flow_gs: f64,
    pub stoich_ratio: f64,
    pub fuel_quality_factor: f64,

    pub tau_rich_to_lean_s: f64,
    pub tau_lean_to_rich_s: f64,

    pub air_noise_half_width_gs: f64,
    pub emi_noise_bound_v: f64,

    pub disturbance_amplitude_gs: f64,
    pub disturbance_start_s: f64,
    pub disturbance_duration_s: f64,

    /// RNG seed; `None` draws one from OS entropy
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        let controller = ControllerParameters::default();
        let actuator = ActuatorParameters::default();
        let plant = PlantParameters::default();
        let sensor = SensorParameters::default();
        let noise = NoiseSpec::default();
        let disturbance = DisturbanceSpec::default();

        SimConfig {
            scan_interval_s: 0.020,
            setpoint_v: controller.setpoint_v,
            kp: controller.kp,
            ki: controller.ki,
            integral_max: controller.integral_max,
            base_pulse_ms: actuator.base_pulse_ms,
            min_pulse_ms: actuator.min_pulse_ms,
            max_pulse_ms: actuator.max_pulse_ms,
            injector_gain: actuator.injector_gain,
            base_air_flow_gs: plant.base_air_flow_gs,
            stoich_ratio: plant.stoich_ratio,
            fuel_quality_factor: plant.fuel_quality_factor,
            tau_rich_to_lean_s: sensor.tau_rich_to_lean_s,
            tau_lean_to_rich_s: sensor.tau_lean_to_rich_s,
            air_noise_half_width_gs: noise.air_half_width_gs,
            emi_noise_bound_v: noise.emi_bound_v,
            disturbance_amplitude_gs: disturbance.amplitude_gs,
            disturbance_start_s: disturbance.start_s,
            disturbance_duration_s: disturbance.duration_s,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Defaults with both noise sources switched off
    pub fn noiseless() -> Self {
        Self::default().with_noise(0.0, 0.0)
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
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

    pub fn with_noise(mut self, air_half_width_gs: f64, emi_bound_v: f64) -> Self {
        self.air_noise_half_width_gs = air_half_width_gs;
        self.emi_noise_bound_v = emi_bound_v;
        self
    }

    pub fn with_disturbance(mut self, amplitude_gs: f64, start_s: f64, duration_s: f64) -> Self {
        self.disturbance_amplitude_gs = amplitude_gs;
        self.disturbance_start_s = start_s;
        self.disturbance_duration_s = duration_s;
        self
    }

    pub fn with_injector_gain(mut self, injector_gain: f64) -> Self {
        self.injector_gain = injector_gain;
        self
    }

    pub fn with_time_constants(mut self, rich_to_lean_s: f64, lean_to_rich_s: f64) -> Self {
        self.tau_rich_to_lean_s = rich_to_lean_s;
        self.tau_lean_to_rich_s = lean_to_rich_s;
        self
    }

    pub fn controller_parameters(&self) -> ControllerParameters {
        ControllerParameters {
            kp: self.kp,
            ki: self.ki,
            setpoint_v: self.setpoint_v,
            integral_max: self.integral_max,
        }
    }

    pub fn actuator_parameters(&self) -> ActuatorParameters {
        ActuatorParameters {
            base_pulse_ms: self.base_pulse_ms,
            min_pulse_ms: self.min_pulse_ms,
            max_pulse_ms: self.max_pulse_ms,
            injector_gain: self.injector_gain,
        }
    }

    pub fn plant_parameters(&self) -> PlantParameters {
        PlantParameters {
            base_air_flow_gs: self.base_air_flow_gs,
            stoich_ratio: self.stoich_ratio,
            fuel_quality_factor: self.fuel_quality_factor,
        }
    }

    pub fn sensor_parameters(&self) -> SensorParameters {
        SensorParameters {
            tau_rich_to_lean_s: self.tau_rich_to_lean_s,
            tau_lean_to_rich_s: self.tau_lean_to_rich_s,
        }
    }

    pub fn noise_spec(&self) -> NoiseSpec {
        NoiseSpec {
            air_half_width_gs: self.air_noise_half_width_gs,
            emi_bound_v: self.emi_noise_bound_v,
        }
    }

    pub fn disturbance_spec(&self) -> Result<DisturbanceSpec, ConfigError> {
        Ok(DisturbanceSpec::new(
            self.disturbance_amplitude_gs,
            self.disturbance_start_s,
            self.disturbance_duration_s,
        )?)
    }

    /// Reject anything the engine could not run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("scan_interval_s", self.scan_interval_s)?;
        self.controller_parameters().validate()?;
        self.actuator_parameters().validate()?;
        self.plant_parameters().validate()?;
        let sensor = self.sensor_parameters();
        sensor.validate()?;
        sensor.check_step(self.scan_interval_s)?;
        self.noise_spec().validate()?;
        self.disturbance_spec()?;
        Ok(())
    }
}
