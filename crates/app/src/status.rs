use simcore::Sample;

/// One-line cycle summary handed to the log sink.
pub fn status_line(sample: &Sample) -> String {
    let side = if sample.measured_voltage > sample.setpoint { "RICH" } else { "LEAN" };
    let pert = if sample.disturbance_applied != 0.0 {
        format!("Pert: {:.2}g/s", sample.disturbance_applied)
    } else {
        "No pert.".to_string()
    };
    format!(
        "T: {:.2}s | {} | State: {} | V_sensor: {:.3}V | Lambda: {:.3} | Error: {:.3}V | Pulse: {:.2}ms",
        sample.time, pert, side, sample.measured_voltage, sample.lambda, sample.error, sample.pulse_width
    )
}
