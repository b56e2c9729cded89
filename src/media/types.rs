//! Media handle interface and the signals it emits.

use std::sync::mpsc::Sender;

use thiserror::Error;

use super::registry::Subscription;

/// Identity of one opened media handle. Never reused by a backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct HandleId(pub u64);

/// Lifecycle events reported by a media handle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MediaEvent {
    /// The resource is decoded and its duration (seconds) is known.
    DataReady { duration: f64 },
    /// Playback moved to `position` seconds.
    PositionAdvanced { position: f64 },
    /// Playback reached the natural end of the resource.
    PlaybackEnded,
    /// The resource could not be fetched or decoded.
    LoadFailed,
}

/// A `MediaEvent` tagged with the handle that emitted it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MediaSignal {
    pub source: HandleId,
    pub event: MediaEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// The resource is not loaded (still pending, or failed) at call time.
    #[error("media resource is unavailable")]
    Unavailable,
    /// The playback thread has shut down.
    #[error("media playback thread is not running")]
    Disconnected,
}

/// One attached, decodable audio resource.
///
/// `play` may be rejected synchronously; every other command is
/// fire-and-forget and its effect is observed through signals.
pub trait MediaHandle {
    fn id(&self) -> HandleId;

    /// Register `listener` for this handle's signals. Dropping the returned
    /// guard detaches it.
    fn subscribe(&self, listener: Sender<MediaSignal>) -> Subscription;

    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self);
    fn set_position(&mut self, seconds: f64);
    fn set_volume(&mut self, volume: f32);
    fn set_muted(&mut self, muted: bool);
}

/// Opens media handles for resource locators.
pub trait MediaBackend {
    fn open(&mut self, url: &str) -> Box<dyn MediaHandle>;
}
