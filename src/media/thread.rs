//! The audio thread: owns the output stream and one sink per open handle.
//!
//! Commands arrive over an mpsc channel. Positions are reported and
//! end-of-stream detected on a fixed cadence whether or not commands keep
//! arriving.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rodio::decoder::DecoderError;
use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use super::loader::FetchError;
use super::registry::Listeners;
use super::sink::{create_sink_at, decode_duration};
use super::types::{HandleId, MediaEvent};

pub(super) const TICK: Duration = Duration::from_millis(200);

/// Fixed-cadence deadline for position reports.
#[derive(Debug, Clone, Copy)]
pub(super) struct Ticker {
    period: Duration,
    last: Instant,
}

impl Ticker {
    pub(super) fn new(period: Duration, now: Instant) -> Self {
        Self { period, last: now }
    }

    /// True once a full period has passed since the last tick; restarts the
    /// period when it fires.
    pub(super) fn due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.period {
            self.last = now;
            true
        } else {
            false
        }
    }

    /// How long to block for a command before the next tick is owed.
    pub(super) fn wait(&self, now: Instant) -> Duration {
        self.period
            .saturating_sub(now.saturating_duration_since(self.last))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) enum LoadState {
    Pending,
    Ready,
    Failed,
}

/// Load state shared between a handle and the audio thread, so `play` can
/// be rejected without a round trip.
pub(super) type LoadHandle = Arc<Mutex<LoadState>>;

pub(super) enum AudioCmd {
    Open { id: HandleId, load: LoadHandle },
    Loaded { id: HandleId, result: Result<Vec<u8>, FetchError> },
    /// A listener was registered; repeat the load outcome if nobody heard it.
    Subscribed(HandleId),
    Play(HandleId),
    Pause(HandleId),
    Seek { id: HandleId, seconds: f64 },
    SetVolume { id: HandleId, volume: f32 },
    SetMuted { id: HandleId, muted: bool },
    Close(HandleId),
    Quit,
}

struct Slot {
    load: LoadHandle,
    bytes: Option<Arc<[u8]>>,
    sink: Option<Sink>,
    playing: bool,
    duration: f64,
    // Whether the load outcome reached a listener.
    announced: bool,
    volume: f32,
    muted: bool,
    // Where the next sink starts after end-of-stream dropped the old one.
    resume_at: Duration,
    // Added to `Sink::get_pos` when a sink had to be built with `skip_duration`.
    offset: Duration,
}

impl Slot {
    fn new(load: LoadHandle) -> Self {
        Self {
            load,
            bytes: None,
            sink: None,
            playing: false,
            duration: 0.0,
            announced: false,
            volume: 1.0,
            muted: false,
            resume_at: Duration::ZERO,
            offset: Duration::ZERO,
        }
    }

    fn set_load(&self, state: LoadState) {
        if let Ok(mut l) = self.load.lock() {
            *l = state;
        }
    }

    fn apply_volume(&self) {
        if let Some(s) = self.sink.as_ref() {
            s.set_volume(if self.muted { 0.0 } else { self.volume });
        }
    }

    fn position(&self) -> Duration {
        self.sink
            .as_ref()
            .map(|s| self.offset + s.get_pos())
            .unwrap_or(self.resume_at)
    }

    /// Replace the sink with a fresh one positioned at `at`.
    fn rebuild_sink(&mut self, stream: &OutputStream, at: Duration) -> Result<(), DecoderError> {
        let Some(bytes) = self.bytes.as_ref() else {
            return Ok(());
        };
        if let Some(old) = self.sink.take() {
            old.stop();
        }

        let mut sink = create_sink_at(stream, bytes, Duration::ZERO)?;
        self.offset = Duration::ZERO;
        if !at.is_zero() && sink.try_seek(at).is_err() {
            sink = create_sink_at(stream, bytes, at)?;
            self.offset = at;
        }
        self.sink = Some(sink);
        self.apply_volume();
        Ok(())
    }
}

pub(super) fn spawn_audio_thread(rx: Receiver<AudioCmd>, listeners: Listeners) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut s) => {
                // rodio logs to stderr when the stream is dropped, which
                // would scribble over the TUI.
                s.log_on_drop(false);
                Some(s)
            }
            Err(e) => {
                warn!("no audio output device, every load will fail: {e}");
                None
            }
        };

        let mut slots: HashMap<HandleId, Slot> = HashMap::new();

        let fail = |id: HandleId, slot: &mut Slot, reason: &dyn std::fmt::Display| {
            warn!(handle = id.0, "media load failed: {reason}");
            if let Some(s) = slot.sink.take() {
                s.stop();
            }
            slot.playing = false;
            slot.set_load(LoadState::Failed);
            slot.announced = listeners.emit(id, MediaEvent::LoadFailed);
        };

        let mut ticker = Ticker::new(TICK, Instant::now());
        loop {
            if ticker.due(Instant::now()) {
                report_progress(&mut slots, &listeners);
            }
            match rx.recv_timeout(ticker.wait(Instant::now())) {
                Ok(cmd) => match cmd {
                    AudioCmd::Open { id, load } => {
                        slots.insert(id, Slot::new(load));
                    }

                    AudioCmd::Loaded { id, result } => {
                        // The handle may have been closed while fetching.
                        let Some(slot) = slots.get_mut(&id) else {
                            continue;
                        };
                        let bytes: Arc<[u8]> = match result {
                            Ok(b) => b.into(),
                            Err(e) => {
                                fail(id, slot, &e);
                                continue;
                            }
                        };
                        let Some(stream) = stream.as_ref() else {
                            fail(id, slot, &"no audio output device");
                            continue;
                        };
                        let duration = match decode_duration(&bytes) {
                            Ok(d) => d,
                            Err(e) => {
                                fail(id, slot, &e);
                                continue;
                            }
                        };
                        slot.bytes = Some(bytes);
                        slot.duration = duration;
                        if let Err(e) = slot.rebuild_sink(stream, Duration::ZERO) {
                            fail(id, slot, &e);
                            continue;
                        }
                        slot.set_load(LoadState::Ready);
                        debug!(handle = id.0, duration, "media ready");
                        slot.announced = listeners.emit(id, MediaEvent::DataReady { duration });
                    }

                    AudioCmd::Subscribed(id) => {
                        let Some(slot) = slots.get_mut(&id) else {
                            continue;
                        };
                        if slot.announced {
                            continue;
                        }
                        let state = slot.load.lock().map(|l| *l).unwrap_or(LoadState::Pending);
                        slot.announced = match state {
                            LoadState::Pending => false,
                            LoadState::Ready => listeners.emit(
                                id,
                                MediaEvent::DataReady {
                                    duration: slot.duration,
                                },
                            ),
                            LoadState::Failed => listeners.emit(id, MediaEvent::LoadFailed),
                        };
                    }

                    AudioCmd::Play(id) => {
                        let (Some(slot), Some(stream)) = (slots.get_mut(&id), stream.as_ref()) else {
                            continue;
                        };
                        if slot.bytes.is_none() {
                            continue;
                        }
                        if slot.sink.is_none() {
                            let at = slot.resume_at;
                            if let Err(e) = slot.rebuild_sink(stream, at) {
                                fail(id, slot, &e);
                                continue;
                            }
                        }
                        if let Some(s) = slot.sink.as_ref() {
                            s.play();
                            slot.playing = true;
                        }
                    }

                    AudioCmd::Pause(id) => {
                        if let Some(slot) = slots.get_mut(&id) {
                            if let Some(s) = slot.sink.as_ref() {
                                s.pause();
                            }
                            slot.playing = false;
                        }
                    }

                    AudioCmd::Seek { id, seconds } => {
                        let (Some(slot), Some(stream)) = (slots.get_mut(&id), stream.as_ref()) else {
                            continue;
                        };
                        let target = Duration::from_secs_f64(seconds.max(0.0));
                        let seeked = match slot.sink.as_ref() {
                            Some(s) => s.try_seek(target).is_ok(),
                            None => {
                                slot.resume_at = target;
                                continue;
                            }
                        };
                        if seeked {
                            slot.offset = Duration::ZERO;
                            continue;
                        }
                        if let Err(e) = slot.rebuild_sink(stream, target) {
                            fail(id, slot, &e);
                            continue;
                        }
                        if slot.playing {
                            if let Some(s) = slot.sink.as_ref() {
                                s.play();
                            }
                        }
                    }

                    AudioCmd::SetVolume { id, volume } => {
                        if let Some(slot) = slots.get_mut(&id) {
                            slot.volume = volume.clamp(0.0, 1.0);
                            slot.apply_volume();
                        }
                    }

                    AudioCmd::SetMuted { id, muted } => {
                        if let Some(slot) = slots.get_mut(&id) {
                            slot.muted = muted;
                            slot.apply_volume();
                        }
                    }

                    AudioCmd::Close(id) => {
                        if let Some(slot) = slots.remove(&id) {
                            if let Some(s) = slot.sink {
                                s.stop();
                            }
                            debug!(handle = id.0, "media closed");
                        }
                    }

                    AudioCmd::Quit => {
                        for slot in slots.values() {
                            if let Some(s) = slot.sink.as_ref() {
                                s.stop();
                            }
                        }
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

/// Emit a position for every playing slot, or end it if its sink ran dry.
fn report_progress(slots: &mut HashMap<HandleId, Slot>, listeners: &Listeners) {
    for (&id, slot) in slots.iter_mut() {
        if !slot.playing {
            continue;
        }
        let ended = slot.sink.as_ref().map(Sink::empty).unwrap_or(true);
        if ended {
            slot.playing = false;
            slot.sink = None;
            slot.resume_at = Duration::ZERO;
            slot.offset = Duration::ZERO;
            listeners.emit(id, MediaEvent::PlaybackEnded);
        } else {
            let position = slot.position().as_secs_f64();
            listeners.emit(id, MediaEvent::PositionAdvanced { position });
        }
    }
}
