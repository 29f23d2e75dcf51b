//! Simulation Engine
//!
//! Owns every component and the loop state, and runs one scan cycle per
//! `step()` in a fixed order:
//!
//! 1. error from the feedback captured at the end of the previous cycle
//! 2. PI correction, saturated into an injector pulse width
//! 3. step disturbance and noise draws for the current clock value
//! 4. combustion: lambda and exhaust O2
//! 5. sensor characteristic, asymmetric lag, EMI
//! 6. measured voltage becomes the next cycle's feedback
//! 7. clock advance and history append
//! 8. status line to the registered log sink, or to the trace log without one

use combustion::{CombustionPlant, DisturbanceSource, DisturbanceSpec, NoiseSpec, seeded_rng};
use control::{ControllerParameters, Injector, PiController};
use log::{debug, log_enabled, trace, warn, Level};
use rand::rngs::StdRng;
use rand::Rng;
use sensor::LambdaSensor;
use simcore::{
    ConfigError, HistoryLog, MixtureState, ParameterError, Sample, SimContext, SimulationState,
};

use crate::config::SimConfig;
use crate::status::status_line;

/// Receives one formatted status line per cycle.
pub type LogSink = Box<dyn FnMut(&str)>;

pub struct Engine<R: Rng = StdRng> {
    scan_interval: f64,
    controller: PiController,
    injector: Injector,
    plant: CombustionPlant,
    sensor: LambdaSensor,
    disturbance: DisturbanceSource<R>,
    state: SimulationState,
    history: HistoryLog,
    log_sink: Option<LogSink>,
}

impl Engine<StdRng> {
    /// Build an engine whose noise comes from `config.seed`, or from OS entropy if unset.
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, seeded_rng(config.seed))
    }
}

impl<R: Rng> Engine<R> {
    /// Build an engine drawing its noise from an injected generator.
    pub fn with_rng(config: &SimConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let controller = config.controller_parameters();
        let actuator = config.actuator_parameters();
        debug!(
            "engine: scan {:.3}s, Kp={} Ki={} setpoint={}V, pulse {}..{}ms",
            config.scan_interval_s,
            controller.kp,
            controller.ki,
            controller.setpoint_v,
            actuator.min_pulse_ms,
            actuator.max_pulse_ms
        );

        Ok(Engine {
            scan_interval: config.scan_interval_s,
            controller: PiController::new(controller),
            injector: Injector::new(actuator),
            plant: CombustionPlant::new(config.plant_parameters()),
            sensor: LambdaSensor::new(config.sensor_parameters()),
            disturbance: DisturbanceSource::with_rng(
                config.disturbance_spec()?,
                config.noise_spec(),
                rng,
            ),
            state: SimulationState::at_equilibrium(controller.setpoint_v, actuator.base_pulse_ms),
            history: HistoryLog::new(),
            log_sink: None,
        })
    }

    /// Advance the loop by one scan cycle and return what happened in it.
    pub fn step(&mut self) -> Sample {
        let ctx = SimContext::new(self.scan_interval, self.state.current_time);
        let setpoint = self.controller.setpoint();

        // Controller only ever sees last cycle's measurement (ADC/scan delay)
        let error = self.controller.error(self.state.feedback_voltage);
        let pi = self.controller.compute(error, ctx.dt);
        let pulse_width = self.injector.command(pi.correction);

        let disturbance = self.disturbance.sample(ctx.t);

        let air_flow = self.plant.air_flow(disturbance.air_disturbance, disturbance.air_noise);
        let fuel_flow = self.plant.effective_fuel_flow(self.injector.fuel_flow(pulse_width));
        let combustion = self.plant.combust(air_flow, fuel_flow);

        let reading = self.sensor.measure(
            combustion.lambda,
            setpoint,
            self.state.filtered_sensor_voltage,
            ctx.dt,
        );
        let measured_voltage = reading.measured(disturbance.emi_noise);

        self.state = SimulationState {
            current_time: ctx.t + ctx.dt,
            integral_term: self.controller.integral(),
            pulse_width,
            ideal_sensor_voltage: reading.ideal_voltage,
            filtered_sensor_voltage: reading.filtered_voltage,
            feedback_voltage: measured_voltage,
        };

        let sample = Sample {
            time: self.state.current_time,
            setpoint,
            measured_voltage,
            pulse_width,
            air_flow,
            lambda: combustion.lambda,
            o2_percent: combustion.o2_percent,
            error,
            p_term: pi.p_term,
            i_term: pi.i_term,
            disturbance_applied: disturbance.air_disturbance,
        };
        self.history.push(sample);

        // A registered sink takes the status line in place of the trace log
        match self.log_sink.as_mut() {
            Some(sink) => sink(&status_line(&sample)),
            None if log_enabled!(Level::Trace) => trace!("{}", status_line(&sample)),
            None => {}
        }

        sample
    }

    /// Run `cycles` steps back to back, returning the last sample produced.
    pub fn run(&mut self, cycles: usize) -> Option<Sample> {
        (0..cycles).map(|_| self.step()).last()
    }

    /// Retune the controller from the next cycle on. Nothing changes on rejection.
    pub fn set_controller(&mut self, kp: f64, ki: f64, setpoint_v: f64) -> Result<(), ParameterError> {
        match self.controller.retune(kp, ki, setpoint_v) {
            Ok(()) => {
                debug!("controller updated: Kp={kp}, Ki={ki}, setpoint={setpoint_v}V");
                Ok(())
            }
            Err(err) => {
                warn!("controller update rejected (Kp={kp}, Ki={ki}, setpoint={setpoint_v}): {err}");
                Err(err)
            }
        }
    }

    /// Replace the step disturbance window from the next cycle on.
    pub fn set_disturbance(&mut self, amplitude_gs: f64, start_s: f64, duration_s: f64) -> Result<(), ParameterError> {
        match DisturbanceSpec::new(amplitude_gs, start_s, duration_s) {
            Ok(spec) => {
                debug!("disturbance set: {amplitude_gs}g/s from {start_s}s for {duration_s}s");
                self.disturbance.set_spec(spec);
                Ok(())
            }
            Err(err) => {
                warn!("disturbance rejected: {err}");
                Err(err)
            }
        }
    }

    pub fn set_log_sink(&mut self, sink: impl FnMut(&str) + 'static) {
        self.log_sink = Some(Box::new(sink));
    }

    pub fn clear_log_sink(&mut self) {
        self.log_sink = None;
    }

    /// The last `window` samples, oldest first.
    pub fn history(&self, window: usize) -> &[Sample] {
        self.history.trailing(window)
    }

    pub fn history_log(&self) -> &HistoryLog {
        &self.history
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn controller_parameters(&self) -> &ControllerParameters {
        self.controller.parameters()
    }

    pub fn disturbance(&self) -> &DisturbanceSpec {
        self.disturbance.spec()
    }

    pub fn noise(&self) -> &NoiseSpec {
        self.disturbance.noise()
    }

    pub fn base_pulse_width(&self) -> f64 {
        self.injector.parameters().base_pulse_ms
    }

    pub fn scan_interval(&self) -> f64 {
        self.scan_interval
    }

    /// Display classification of the latest measurement; `None` before the first cycle.
    pub fn mixture_state(&self) -> Option<MixtureState> {
        self.history.mixture_state()
    }
}
