//! Playback status and the per-controller state record.

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load audio";
pub const PLAY_FAILED_MESSAGE: &str = "Failed to play audio";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Waiting for the handle to report its data.
    Loading,
    /// Loaded and at rest (never played, or rewound after the end).
    Ready,
    Playing,
    Paused,
    /// Terminal for the current binding.
    Errored,
}

impl Default for PlaybackStatus {
    fn default() -> Self {
        Self::Loading
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    pub position_seconds: f64,
    /// `0.0` until the handle reports its data.
    pub duration_seconds: f64,
    pub volume: f32,
    pub muted: bool,
    /// Only set while `status` is `Errored`.
    pub error_message: Option<String>,
}

impl PlaybackState {
    pub fn new(volume: f32) -> Self {
        let volume = volume.clamp(0.0, 1.0);
        Self {
            status: PlaybackStatus::Loading,
            position_seconds: 0.0,
            duration_seconds: 0.0,
            volume,
            muted: volume == 0.0,
            error_message: None,
        }
    }

    pub fn is_errored(&self) -> bool {
        self.status == PlaybackStatus::Errored
    }

    pub fn duration_known(&self) -> bool {
        self.duration_seconds.is_finite() && self.duration_seconds > 0.0
    }

    pub(super) fn fail(&mut self, message: &str) {
        self.status = PlaybackStatus::Errored;
        self.error_message = Some(message.to_string());
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(1.0)
    }
}
