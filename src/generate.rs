//! Song generation collaborator.
//!
//! `Generator` is the seam the shell talks to. `SimulatedGenerator` stands
//! in for a real backend: it waits, then returns a record pointing at one of
//! the configured sample recordings.

mod samples;
mod simulated;
mod types;

pub use simulated::SimulatedGenerator;
pub use types::*;

#[cfg(test)]
mod tests;
