//! Per-cycle records and the append-only log that displays read from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trailing samples shown by a display: 15 s at the 20 ms scan interval.
pub const DISPLAY_WINDOW: usize = 750;

/// Half-width of the band around the setpoint classified as stoichiometric (V).
pub const STOICH_BAND_V: f64 = 0.05;

/// Everything computed during one scan cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Clock value after the cycle advanced it (s)
    pub time: f64,
    /// Setpoint in force during the cycle (V)
    pub setpoint: f64,
    /// Lagged sensor voltage plus EMI noise; next cycle's feedback (V)
    pub measured_voltage: f64,
    /// Saturated injector command (ms)
    pub pulse_width: f64,
    /// Total air flow fed to the plant, disturbance and noise included (g/s)
    pub air_flow: f64,
    pub lambda: f64,
    /// Exhaust oxygen (%)
    pub o2_percent: f64,
    /// Setpoint minus previous feedback (V)
    pub error: f64,
    pub p_term: f64,
    pub i_term: f64,
    /// Step disturbance alone, without noise (g/s)
    pub disturbance_applied: f64,
}

/// Display-only reading of the mixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MixtureState {
    Rich,
    Lean,
    Stoich,
}

impl MixtureState {
    /// Classify a sensor voltage against the setpoint. The stoichiometric band wins over rich/lean.
    pub fn classify(voltage: f64, setpoint: f64) -> Self {
        if (voltage - setpoint).abs() < STOICH_BAND_V {
            MixtureState::Stoich
        } else if voltage > setpoint {
            MixtureState::Rich
        } else {
            MixtureState::Lean
        }
    }

    /// Classify the true mixture from lambda (no stoichiometric band).
    pub fn from_lambda(lambda: f64) -> Self {
        if lambda < 1.0 {
            MixtureState::Rich
        } else {
            MixtureState::Lean
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MixtureState::Rich => "RICH MIXTURE (excess fuel)",
            MixtureState::Lean => "LEAN MIXTURE (excess air)",
            MixtureState::Stoich => "STOICHIOMETRIC (λ≈1)",
        }
    }
}

impl fmt::Display for MixtureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MixtureState::Rich => "RICH",
            MixtureState::Lean => "LEAN",
            MixtureState::Stoich => "STOICH",
        };
        f.write_str(name)
    }
}

/// Append-only, insertion-ordered sample log.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    samples: Vec<Sample>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// The last `window` samples in insertion order, or all of them if fewer exist.
    pub fn trailing(&self, window: usize) -> &[Sample] {
        let start = self.samples.len().saturating_sub(window);
        &self.samples[start..]
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Classification of the most recent measurement against its own setpoint.
    pub fn mixture_state(&self) -> Option<MixtureState> {
        self.last()
            .map(|s| MixtureState::classify(s.measured_voltage, s.setpoint))
    }

    /// Extract one field of the trailing window as `[time, value]` points for plotting.
    pub fn series(&self, window: usize, field: impl Fn(&Sample) -> f64) -> Vec<[f64; 2]> {
        self.trailing(window)
            .iter()
            .map(|s| [s.time, field(s)])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_at(time: f64, measured_voltage: f64) -> Sample {
        Sample {
            time,
            setpoint: 0.45,
            measured_voltage,
            pulse_width: 4.0,
            air_flow: 10.0,
            lambda: 1.0,
            o2_percent: 0.5,
            error: 0.0,
            p_term: 0.0,
            i_term: 0.0,
            disturbance_applied: 0.0,
        }
    }

    #[test]
    fn test_trailing_window_shorter_than_log() {
        let mut log = HistoryLog::new();
        for i in 0..10 {
            log.push(sample_at(i as f64, 0.45));
        }
        let tail = log.trailing(3);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0].time, 7.0);
        assert_eq!(tail[2].time, 9.0);
    }

    #[test]
    fn test_trailing_window_longer_than_log() {
        let mut log = HistoryLog::new();
        log.push(sample_at(0.02, 0.45));
        log.push(sample_at(0.04, 0.45));
        assert_eq!(log.trailing(DISPLAY_WINDOW).len(), 2);
        assert!(HistoryLog::new().trailing(5).is_empty());
    }

    #[test]
    fn test_classification_band() {
        assert_eq!(MixtureState::classify(0.45, 0.45), MixtureState::Stoich);
        assert_eq!(MixtureState::classify(0.49, 0.45), MixtureState::Stoich);
        assert_eq!(MixtureState::classify(0.41, 0.45), MixtureState::Stoich);
        assert_eq!(MixtureState::classify(0.60, 0.45), MixtureState::Rich);
        assert_eq!(MixtureState::classify(0.20, 0.45), MixtureState::Lean);
    }

    #[test]
    fn test_mixture_from_lambda() {
        assert_eq!(MixtureState::from_lambda(0.95), MixtureState::Rich);
        assert_eq!(MixtureState::from_lambda(1.0), MixtureState::Lean);
    }

    #[test]
    fn test_mixture_state_uses_last_sample() {
        let mut log = HistoryLog::new();
        assert_eq!(log.mixture_state(), None);
        log.push(sample_at(0.02, 0.8));
        log.push(sample_at(0.04, 0.1));
        assert_eq!(log.mixture_state(), Some(MixtureState::Lean));
    }

    #[test]
    fn test_series_pairs_time_and_field() {
        let mut log = HistoryLog::new();
        log.push(sample_at(0.02, 0.3));
        log.push(sample_at(0.04, 0.6));
        let pts = log.series(10, |s| s.measured_voltage);
        assert_eq!(pts, vec![[0.02, 0.3], [0.04, 0.6]]);
    }
}
