//! The playback controller state machine.
//!
//! Field ownership:
//! - set eagerly by commands: `status` (Playing/Paused from `toggle_play`,
//!   Errored on a rejected play), `position_seconds` (from `seek`),
//!   `volume`, `muted`.
//! - set only by signals: `duration_seconds`, `status = Ready`
//!   (DataReady / PlaybackEnded), `status = Errored` on load failure, and
//!   `position_seconds` while playing.

use std::sync::mpsc::Sender;

use tracing::debug;

use crate::config::PlayerSettings;
use crate::download::{Downloader, suggested_filename};
use crate::media::{HandleId, MediaBackend, MediaEvent, MediaHandle, MediaSignal, Subscription};
use crate::track::TrackRecord;

use super::state::{LOAD_FAILED_MESSAGE, PLAY_FAILED_MESSAGE, PlaybackState, PlaybackStatus};
use super::view::TransportView;

/// Caller-supplied replacement for the default download behavior.
pub type DownloadHandler = Box<dyn Fn(&TrackRecord)>;

/// A media handle plus the subscription that routes its signals to us.
/// Dropping it detaches the listener and releases the handle.
struct Binding {
    // Declared first so the listener is gone before the handle closes.
    _subscription: Subscription,
    handle: Box<dyn MediaHandle>,
}

pub struct PlaybackController {
    track: TrackRecord,
    state: PlaybackState,
    binding: Option<Binding>,
    // Restored when unmuting with the stored volume at zero.
    last_audible_volume: f32,
    on_download: Option<DownloadHandler>,
    download_extension: String,
}

impl PlaybackController {
    /// Create an unbound controller. Call `attach` to start loading.
    pub fn new(track: TrackRecord, settings: &PlayerSettings) -> Self {
        let state = PlaybackState::new(settings.initial_volume);
        let last_audible_volume = if state.volume > 0.0 { state.volume } else { 1.0 };
        Self {
            track,
            state,
            binding: None,
            last_audible_volume,
            on_download: None,
            download_extension: settings.download_extension.clone(),
        }
    }

    pub fn with_download_handler(mut self, handler: DownloadHandler) -> Self {
        self.on_download = Some(handler);
        self
    }

    pub fn track(&self) -> &TrackRecord {
        &self.track
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn view(&self) -> TransportView {
        TransportView::from_state(&self.state)
    }

    /// Id of the currently bound handle, if any.
    pub fn bound_handle(&self) -> Option<HandleId> {
        self.binding.as_ref().map(|b| b.handle.id())
    }

    /// Bind to a fresh media handle for the track's URL.
    ///
    /// Any previous binding is released first, so signals from the old
    /// handle can no longer reach this controller. Volume and mute carry
    /// over to the new handle.
    pub fn attach(&mut self, backend: &mut dyn MediaBackend, listener: &Sender<MediaSignal>) {
        self.detach();

        let mut handle = backend.open(&self.track.url);
        let subscription = handle.subscribe(listener.clone());
        handle.set_volume(self.state.volume);
        handle.set_muted(self.state.muted);

        self.state.status = PlaybackStatus::Loading;
        self.state.error_message = None;
        self.state.position_seconds = 0.0;
        self.state.duration_seconds = 0.0;

        debug!(track = %self.track.id, handle = handle.id().0, "controller attached");
        self.binding = Some(Binding {
            _subscription: subscription,
            handle,
        });
    }

    /// Replace the track record; rebinds only when the URL changed.
    pub fn update_track(
        &mut self,
        track: TrackRecord,
        backend: &mut dyn MediaBackend,
        listener: &Sender<MediaSignal>,
    ) {
        let url_changed = track.url != self.track.url;
        self.track = track;
        if url_changed || self.binding.is_none() {
            self.attach(backend, listener);
        }
    }

    /// Release the current binding (listener first, then the handle).
    pub fn detach(&mut self) {
        if let Some(binding) = self.binding.take() {
            debug!(track = %self.track.id, handle = binding.handle.id().0, "controller detached");
        }
    }

    /// Apply a lifecycle signal. Returns false when it was ignored because
    /// it came from a handle other than the current binding.
    pub fn handle_signal(&mut self, signal: MediaSignal) -> bool {
        if self.bound_handle() != Some(signal.source) {
            return false;
        }
        if self.state.is_errored() {
            return true;
        }

        match signal.event {
            MediaEvent::DataReady { duration } => {
                self.state.duration_seconds = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
                self.state.status = PlaybackStatus::Ready;
            }
            MediaEvent::PositionAdvanced { position } => {
                // Ticks queued before a pause must not undo a later seek.
                if self.state.status != PlaybackStatus::Playing {
                    return true;
                }
                let mut position = position.max(0.0);
                if self.state.duration_known() {
                    position = position.min(self.state.duration_seconds);
                }
                self.state.position_seconds = position;
            }
            MediaEvent::PlaybackEnded => {
                self.state.status = PlaybackStatus::Ready;
                self.state.position_seconds = 0.0;
            }
            MediaEvent::LoadFailed => {
                self.state.fail(LOAD_FAILED_MESSAGE);
            }
        }
        debug!(track = %self.track.id, status = ?self.state.status, event = ?signal.event, "signal applied");
        true
    }

    pub fn toggle_play(&mut self) {
        let Some(binding) = self.binding.as_mut() else {
            return;
        };
        match self.state.status {
            PlaybackStatus::Loading | PlaybackStatus::Errored => {}
            PlaybackStatus::Playing => {
                binding.handle.pause();
                self.state.status = PlaybackStatus::Paused;
            }
            PlaybackStatus::Paused | PlaybackStatus::Ready => match binding.handle.play() {
                Ok(()) => self.state.status = PlaybackStatus::Playing,
                Err(e) => {
                    debug!(track = %self.track.id, "play rejected: {e}");
                    self.state.fail(PLAY_FAILED_MESSAGE);
                }
            },
        }
    }

    /// Seek to `fraction` of the duration (clamped to `[0, 1]`).
    pub fn seek(&mut self, fraction: f64) {
        if matches!(
            self.state.status,
            PlaybackStatus::Loading | PlaybackStatus::Errored
        ) || !self.state.duration_known()
        {
            return;
        }
        let Some(binding) = self.binding.as_mut() else {
            return;
        };
        let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
        let target = fraction * self.state.duration_seconds;
        binding.handle.set_position(target);
        // Don't wait for the next position signal.
        self.state.position_seconds = target;
    }

    /// Seek relative to the current position by `delta` seconds.
    pub fn seek_by(&mut self, delta: f64) {
        if !self.state.duration_known() {
            return;
        }
        let fraction = (self.state.position_seconds + delta) / self.state.duration_seconds;
        self.seek(fraction);
    }

    pub fn toggle_mute(&mut self) {
        let muted = !self.state.muted;
        if !muted && self.state.volume == 0.0 {
            // Unmuting at zero volume would stay silent.
            self.state.volume = self.last_audible_volume;
            if let Some(binding) = self.binding.as_mut() {
                binding.handle.set_volume(self.state.volume);
            }
        }
        if let Some(binding) = self.binding.as_mut() {
            binding.handle.set_muted(muted);
        }
        self.state.muted = muted;
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 0.0 };
        if let Some(binding) = self.binding.as_mut() {
            binding.handle.set_volume(volume);
            binding.handle.set_muted(volume == 0.0);
        }
        self.state.volume = volume;
        self.state.muted = volume == 0.0;
        if volume > 0.0 {
            self.last_audible_volume = volume;
        }
    }

    /// Step the volume from the level currently shown (zero while muted).
    pub fn step_volume(&mut self, delta: f32) {
        let shown = if self.state.muted { 0.0 } else { self.state.volume };
        // Round to the step grid so repeated steps don't drift.
        let next = ((shown + delta) * 100.0).round() / 100.0;
        self.set_volume(next);
    }

    /// Save the track, through the caller's handler when one was supplied.
    pub fn download(&self, downloader: &dyn Downloader) {
        match self.on_download.as_ref() {
            Some(handler) => handler(&self.track),
            None => {
                let filename = suggested_filename(&self.track.title, &self.download_extension);
                downloader.save(&self.track.url, &filename);
            }
        }
    }
}
