//! Game state and logic module
//!
//! Scene vocabulary, the per-cycle state machine and the controller that
//! runs cycles against the live game.

pub mod controller;
pub mod cycle;
pub mod scene;

pub use controller::{CycleController, CycleError, RunSummary};
pub use cycle::{CycleState, CycleTimings, Directive, Phase};
pub use scene::Scene;
