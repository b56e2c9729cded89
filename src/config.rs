//! Configuration loader and schema types.
//!
//! This module exposes the settings tree that drives the generator, the
//! playback controllers, downloads, the UI and logging, plus helpers to
//! load it from disk and the environment.

mod load;
mod schema;

pub use load::default_log_path;
pub use schema::*;

#[cfg(test)]
mod tests;
