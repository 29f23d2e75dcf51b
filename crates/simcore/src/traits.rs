use serde::{Deserialize, Serialize};

/// Timing information handed to every stage of a scan cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimContext {
    /// Scan interval (s)
    pub dt: f64,
    /// Clock value at the start of the cycle (s)
    pub t: f64,
}

impl SimContext {
    pub fn new(dt: f64, t: f64) -> Self {
        SimContext { dt, t }
    }
}

pub trait Model {
    fn reset(&mut self);
}
