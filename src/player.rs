//! Playback controller: binds one `TrackRecord` to one media handle.
//!
//! The controller owns a `PlaybackState`, applies lifecycle signals from its
//! currently bound handle, issues transport commands and produces a
//! `TransportView` for rendering.

mod controller;
mod state;
mod view;

pub use controller::*;
pub use state::*;
pub use view::*;
