/// Converts elapsed wall time into a whole number of fixed scan cycles.
///
/// Leftover time that doesn't fill a cycle is carried into the next call, so a
/// driver that polls at an irregular rate still steps the loop at `fixed_dt` on
/// average.
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    pub fixed_dt: f64,
    pub accumulator: f64,
    /// Upper bound on cycles released per call; protects a slow frame from a spiral of catch-up work.
    pub max_cycles_per_call: usize,
}

impl FixedStepClock {
    pub fn new(fixed_dt: f64) -> Self {
        FixedStepClock {
            fixed_dt,
            accumulator: 0.0,
            max_cycles_per_call: 50,
        }
    }

    pub fn with_max_cycles(mut self, max_cycles_per_call: usize) -> Self {
        self.max_cycles_per_call = max_cycles_per_call;
        self
    }

    /// Accumulates `elapsed` seconds and returns how many cycles are due.
    pub fn advance(&mut self, elapsed: f64) -> usize {
        if elapsed.is_finite() && elapsed > 0.0 {
            self.accumulator += elapsed;
        }

        let mut cycles = 0;
        while self.accumulator >= self.fixed_dt && cycles < self.max_cycles_per_call {
            self.accumulator -= self.fixed_dt;
            cycles += 1;
        }

        // Drop the backlog we refused to run
        if cycles == self.max_cycles_per_call {
            self.accumulator = self.accumulator.min(self.fixed_dt);
        }
        cycles
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
