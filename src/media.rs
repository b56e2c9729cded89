//! Media playback primitive.
//!
//! A `MediaBackend` opens one `MediaHandle` per resource locator. Handles
//! accept transport commands and report lifecycle signals (`MediaSignal`)
//! to whoever subscribed through `MediaHandle::subscribe`. The returned
//! `Subscription` detaches the listener when dropped.
//!
//! The concrete backend (`RodioBackend`) decodes and plays audio on a
//! dedicated thread using `rodio`.

mod backend;
mod loader;
mod registry;
mod sink;
mod thread;
mod types;

pub use backend::RodioBackend;
pub(crate) use loader::{FetchError, fetch_bytes};
pub use registry::{Listeners, Subscription};
pub use types::*;

#[cfg(test)]
pub(crate) mod testing;
