//! Closed-loop lambda control simulation
//!
//! Wires the PI controller, injector, combustion plant, disturbance source and
//! lambda sensor into a single fixed-timestep [`Engine`]. Presentation layers
//! (the headless runner, the live dashboard example) drive `step()` and read
//! the history.

pub mod config;
pub mod engine;
pub mod stats;
pub mod status;

pub use config::SimConfig;
pub use engine::{Engine, LogSink};
pub use stats::WindowStats;
pub use status::status_line;

pub use simcore::{DISPLAY_WINDOW, MixtureState, Sample, SimulationState};
