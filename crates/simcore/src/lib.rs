//! Shared vocabulary for the lambda-probe control loop simulation.
//!
//! Every other crate in the workspace speaks in these types: the timing
//! context handed to each stage, the loop state the engine owns, the
//! per-cycle `Sample` record and the errors raised at configuration time.

pub mod cadence;
pub mod error;
pub mod history;
pub mod state;
pub mod traits;

pub use cadence::FixedStepClock;
pub use error::{ConfigError, ParameterError, require_finite};
pub use history::{DISPLAY_WINDOW, HistoryLog, MixtureState, STOICH_BAND_V, Sample};
pub use state::SimulationState;
pub use traits::{Model, SimContext};
