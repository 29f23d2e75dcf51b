use simcore::Sample;

/// Summary of a window of samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub samples: usize,
    pub mean_voltage: f64,
    pub min_voltage: f64,
    pub max_voltage: f64,
    pub mean_lambda: f64,
    pub mean_pulse_width: f64,
}

impl WindowStats {
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let n = samples.len() as f64;
        let (min_voltage, max_voltage) = samples.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), s| (lo.min(s.measured_voltage), hi.max(s.measured_voltage)),
        );

        Some(WindowStats {
            samples: samples.len(),
            mean_voltage: samples.iter().map(|s| s.measured_voltage).sum::<f64>() / n,
            min_voltage,
            max_voltage,
            mean_lambda: samples.iter().map(|s| s.lambda).sum::<f64>() / n,
            mean_pulse_width: samples.iter().map(|s| s.pulse_width).sum::<f64>() / n,
        })
    }

    pub fn peak_to_peak_voltage(&self) -> f64 {
        self.max_voltage - self.min_voltage
    }
}
