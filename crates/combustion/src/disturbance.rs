//! Disturbance and noise injection
//!
//! A rectangular air-flow step plus two uniform noise sources: intake air
//! flow jitter and EMI on the sensor line. The generator is owned by the
//! source and can be seeded for reproducible runs.

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use simcore::{ConfigError, ParameterError, require_finite};

/// Rectangular step window on intake air flow
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisturbanceSpec {
    /// Extra air while the window is open (g/s)
    pub amplitude_gs: f64,
    pub start_s: f64,
    pub duration_s: f64,
}

impl Default for DisturbanceSpec {
    fn default() -> Self {
        DisturbanceSpec {
            amplitude_gs: 0.0,
            start_s: 5.0,
            duration_s: 5.0,
        }
    }
}

impl DisturbanceSpec {
    pub fn new(amplitude_gs: f64, start_s: f64, duration_s: f64) -> Result<Self, ParameterError> {
        require_finite("amplitude", amplitude_gs)?;
        require_finite("start time", start_s)?;
        require_finite("duration", duration_s)?;
        if duration_s < 0.0 {
            return Err(ParameterError::NegativeDuration);
        }
        Ok(DisturbanceSpec {
            amplitude_gs,
            start_s,
            duration_s,
        })
    }

    /// Half-open window: `start <= t < start + duration`.
    pub fn is_active(&self, t: f64) -> bool {
        self.start_s <= t && t < self.start_s + self.duration_s
    }

    pub fn value_at(&self, t: f64) -> f64 {
        if self.is_active(t) { self.amplitude_gs } else { 0.0 }
    }
}

/// Half-widths of the uniform noise sources
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseSpec {
    /// Intake air flow jitter (g/s)
    pub air_half_width_gs: f64,
    /// Sensor EMI (V)
    pub emi_bound_v: f64,
}

impl Default for NoiseSpec {
    fn default() -> Self {
        NoiseSpec {
            air_half_width_gs: 0.05,
            emi_bound_v: 0.015,
        }
    }
}

impl NoiseSpec {
    pub fn noiseless() -> Self {
        NoiseSpec {
            air_half_width_gs: 0.0,
            emi_bound_v: 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_non_negative("air_noise_half_width_gs", self.air_half_width_gs)?;
        ConfigError::require_non_negative("emi_noise_bound_v", self.emi_bound_v)?;
        Ok(())
    }
}

/// What the disturbance source produced for one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisturbanceSample {
    pub air_disturbance: f64,
    pub air_noise: f64,
    pub emi_noise: f64,
}

fn symmetric(half_width: f64) -> Option<Uniform<f64>> {
    (half_width > 0.0).then(|| Uniform::new_inclusive(-half_width, half_width))
}

#[derive(Debug, Clone)]
pub struct DisturbanceSource<R: Rng = StdRng> {
    spec: DisturbanceSpec,
    noise: NoiseSpec,
    air_noise: Option<Uniform<f64>>,
    emi_noise: Option<Uniform<f64>>,
    rng: R,
}

/// Generator for `seed`, or one drawn from OS entropy when `None`.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

impl DisturbanceSource<StdRng> {
    pub fn new(spec: DisturbanceSpec, noise: NoiseSpec, seed: Option<u64>) -> Self {
        Self::with_rng(spec, noise, seeded_rng(seed))
    }
}

impl<R: Rng> DisturbanceSource<R> {
    pub fn with_rng(spec: DisturbanceSpec, noise: NoiseSpec, rng: R) -> Self {
        DisturbanceSource {
            spec,
            noise,
            air_noise: symmetric(noise.air_half_width_gs),
            emi_noise: symmetric(noise.emi_bound_v),
            rng,
        }
    }

    /// Step value and fresh noise draws for the cycle starting at `t`.
    ///
    /// A disabled noise source returns exactly zero and does not touch the generator.
    pub fn sample(&mut self, t: f64) -> DisturbanceSample {
        let air_noise = match &self.air_noise {
            Some(dist) => dist.sample(&mut self.rng),
            None => 0.0,
        };
        let emi_noise = match &self.emi_noise {
            Some(dist) => dist.sample(&mut self.rng),
            None => 0.0,
        };
        DisturbanceSample {
            air_disturbance: self.spec.value_at(t),
            air_noise,
            emi_noise,
        }
    }

    pub fn set_spec(&mut self, spec: DisturbanceSpec) {
        self.spec = spec;
    }

    pub fn spec(&self) -> &DisturbanceSpec {
        &self.spec
    }

    pub fn noise(&self) -> &NoiseSpec {
        &self.noise
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_is_half_open() {
        let spec = DisturbanceSpec::new(2.0, 1.0, 0.5).unwrap();
        assert_eq!(spec.value_at(0.999), 0.0);
        assert_eq!(spec.value_at(1.0), 2.0);
        assert_eq!(spec.value_at(1.25), 2.0);
        assert_eq!(spec.value_at(1.5), 0.0);
        assert_eq!(spec.value_at(3.0), 0.0);
    }

    #[test]
    fn test_zero_duration_never_fires() {
        let spec = DisturbanceSpec::new(2.0, 1.0, 0.0).unwrap();
        assert!(!spec.is_active(1.0));
    }

    #[test]
    fn test_negative_duration_rejected() {
        assert_eq!(DisturbanceSpec::new(1.0, 0.0, -0.1), Err(ParameterError::NegativeDuration));
        assert!(DisturbanceSpec::new(f64::INFINITY, 0.0, 1.0).is_err());
        // Negative amplitude and start are accepted
        assert!(DisturbanceSpec::new(-3.0, -1.0, 1.0).is_ok());
    }

    #[test]
    fn test_noise_within_bounds() {
        let mut source = DisturbanceSource::new(DisturbanceSpec::default(), NoiseSpec::default(), Some(7));
        for i in 0..2000 {
            let s = source.sample(i as f64 * 0.02);
            assert!(s.air_noise.abs() <= 0.05);
            assert!(s.emi_noise.abs() <= 0.015);
        }
    }

    #[test]
    fn test_noise_is_not_constant() {
        let mut source = DisturbanceSource::new(DisturbanceSpec::default(), NoiseSpec::default(), Some(7));
        let first = source.sample(0.0);
        let differs = (0..50).any(|_| source.sample(0.0).emi_noise != first.emi_noise);
        assert!(differs);
    }

    #[test]
    fn test_seed_reproduces_sequence() {
        let mut a = DisturbanceSource::new(DisturbanceSpec::default(), NoiseSpec::default(), Some(42));
        let mut b = DisturbanceSource::new(DisturbanceSpec::default(), NoiseSpec::default(), Some(42));
        for i in 0..100 {
            let t = i as f64 * 0.02;
            assert_eq!(a.sample(t), b.sample(t));
        }
    }

    #[test]
    fn test_seeded_rng_matches_explicit_seed() {
        let mut a = seeded_rng(Some(3));
        let mut b = StdRng::seed_from_u64(3);
        assert_eq!(a.r#gen::<u64>(), b.r#gen::<u64>());
    }

    #[test]
    fn test_noiseless_is_exactly_zero() {
        let spec = DisturbanceSpec::new(1.5, 0.0, 1.0).unwrap();
        let mut source = DisturbanceSource::new(spec, NoiseSpec::noiseless(), None);
        let s = source.sample(0.5);
        assert_eq!(s.air_noise, 0.0);
        assert_eq!(s.emi_noise, 0.0);
        assert_eq!(s.air_disturbance, 1.5);
    }

    #[test]
    fn test_set_spec_applies_to_next_sample() {
        let mut source = DisturbanceSource::new(DisturbanceSpec::default(), NoiseSpec::noiseless(), Some(1));
        assert_eq!(source.sample(0.0).air_disturbance, 0.0);

        source.set_spec(DisturbanceSpec::new(0.8, 0.0, 10.0).unwrap());
        assert_eq!(source.sample(0.0).air_disturbance, 0.8);
    }
}
