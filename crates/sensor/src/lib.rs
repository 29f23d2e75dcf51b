//! Lambda (exhaust oxygen) sensor model
//!
//! Switching-type probe: a tanh characteristic around lambda = 1 followed by
//! a first-order lag whose time constant depends on the direction of change.

pub mod lambda_sensor;

pub use lambda_sensor::*;
