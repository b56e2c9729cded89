//! Observable rendering model for a controller's transport controls.

use super::state::{PlaybackState, PlaybackStatus};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransportIcon {
    Spinner,
    Error,
    Pause,
    Play,
}

impl TransportIcon {
    pub fn for_status(status: PlaybackStatus) -> Self {
        match status {
            PlaybackStatus::Loading => Self::Spinner,
            PlaybackStatus::Errored => Self::Error,
            PlaybackStatus::Playing => Self::Pause,
            PlaybackStatus::Paused | PlaybackStatus::Ready => Self::Play,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransportView {
    pub icon: TransportIcon,
    /// Progress fill in `[0, 1]`.
    pub progress: f64,
    pub elapsed: String,
    pub total: String,
    /// Level shown on the volume control; zero while muted.
    pub volume_level: f32,
    /// Show the muted speaker (muted, or volume at zero).
    pub muted_icon: bool,
    /// Play and download are disabled while loading or errored.
    pub controls_enabled: bool,
    pub error: Option<String>,
}

impl TransportView {
    pub fn from_state(state: &PlaybackState) -> Self {
        Self {
            icon: TransportIcon::for_status(state.status),
            progress: progress_fraction(state.position_seconds, state.duration_seconds),
            elapsed: format_time(state.position_seconds),
            total: format_time(state.duration_seconds),
            volume_level: if state.muted { 0.0 } else { state.volume },
            muted_icon: state.muted || state.volume == 0.0,
            controls_enabled: !matches!(
                state.status,
                PlaybackStatus::Loading | PlaybackStatus::Errored
            ),
            error: state.error_message.clone(),
        }
    }
}

/// Format seconds as `M:SS`, truncating fractional seconds.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// `position / duration` clamped to `[0, 1]`; zero while duration is unknown.
pub fn progress_fraction(position: f64, duration: f64) -> f64 {
    if !(duration.is_finite() && duration > 0.0) || !position.is_finite() {
        return 0.0;
    }
    (position / duration).clamp(0.0, 1.0)
}

/// Fraction of a horizontal bar at pointer `column`. Not clamped; `seek`
/// clamps.
pub fn pointer_fraction(column: u16, bar_x: u16, bar_width: u16) -> f64 {
    if bar_width == 0 {
        return 0.0;
    }
    (f64::from(column) - f64::from(bar_x)) / f64::from(bar_width)
}
