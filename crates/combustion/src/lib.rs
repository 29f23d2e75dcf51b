//! Air-side physics of the lambda loop
//!
//! - `plant`: combustion map from air and fuel flow to lambda and exhaust O2
//! - `disturbance`: air-flow step window and the noise sources feeding the loop

pub mod disturbance;
pub mod plant;

pub use disturbance::{DisturbanceSample, DisturbanceSource, DisturbanceSpec, NoiseSpec, seeded_rng};
pub use plant::{
    Combustion, CombustionPlant, LEAN_SENTINEL_LAMBDA, O2_CEILING_PERCENT, PlantParameters,
    lambda_from_flows, o2_percent,
};
