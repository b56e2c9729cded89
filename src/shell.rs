//! Track list and generation workflow.
//!
//! The `Shell` keeps the generated records (most recent first), owns one
//! `PlaybackController` per record and drives generation requests on a
//! worker thread. It holds no playback logic of its own.

mod model;

pub use model::*;
