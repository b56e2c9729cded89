use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::PlayerSettings;
use crate::download::{Downloader, suggested_filename};
use crate::generate::{GenerateOptions, GenerationError, Generator};
use crate::media::{MediaBackend, MediaSignal};
use crate::player::PlaybackController;
use crate::track::TrackRecord;

/// Errors shown inline under the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShellError {
    #[error("Please enter a prompt")]
    EmptyPrompt,
    #[error("Failed to generate song. Please try again.")]
    GenerationFailed,
}

/// Which part of the screen receives key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Prompt,
    Title,
    Tags,
    Tracks,
}

type GenerationResult = Result<TrackRecord, GenerationError>;

pub struct Shell {
    pub prompt: String,
    pub title_input: String,
    pub tags_input: String,
    pub focus: Focus,
    pub lyrics_window: bool,

    custom_mode: bool,
    submitting: bool,
    error: Option<ShellError>,

    tracks: Vec<TrackRecord>,
    controllers: HashMap<String, PlaybackController>,
    demo: Option<PlaybackController>,
    selected: usize,

    generator: Arc<dyn Generator>,
    pending: Option<Receiver<GenerationResult>>,
    downloader: Arc<dyn Downloader>,
    player: PlayerSettings,
    signals: Sender<MediaSignal>,
}

impl Shell {
    /// Create an empty shell. Media signals for every controller it creates
    /// are routed to `signals`.
    pub fn new(
        generator: Arc<dyn Generator>,
        downloader: Arc<dyn Downloader>,
        player: PlayerSettings,
        signals: Sender<MediaSignal>,
    ) -> Self {
        Self {
            prompt: String::new(),
            title_input: String::new(),
            tags_input: String::new(),
            focus: Focus::Prompt,
            lyrics_window: false,

            custom_mode: false,
            submitting: false,
            error: None,

            tracks: Vec::new(),
            controllers: HashMap::new(),
            demo: None,
            selected: 0,

            generator,
            pending: None,
            downloader,
            player,
            signals,
        }
    }

    /// Add the standalone demo player, listed after the generated songs.
    pub fn attach_demo(&mut self, track: TrackRecord, backend: &mut dyn MediaBackend) {
        let mut controller = PlaybackController::new(track, &self.player);
        controller.attach(backend, &self.signals);
        self.demo = Some(controller);
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error(&self) -> Option<ShellError> {
        self.error
    }

    pub fn custom_mode(&self) -> bool {
        self.custom_mode
    }

    /// Generated records, most recent first.
    pub fn tracks(&self) -> &[TrackRecord] {
        &self.tracks
    }

    /// True when there is nothing to list and nothing on the way.
    pub fn is_empty_state(&self) -> bool {
        self.tracks.is_empty() && !self.submitting
    }

    #[cfg(test)]
    pub fn controller(&self, id: &str) -> Option<&PlaybackController> {
        self.controllers.get(id)
    }

    #[cfg(test)]
    pub fn demo(&self) -> Option<&PlaybackController> {
        self.demo.as_ref()
    }

    // ---- generation ----

    /// Submit the current prompt.
    ///
    /// A blank prompt fails validation without touching anything else.
    /// While a request is in flight further submissions are ignored.
    pub fn generate(&mut self) -> Result<(), ShellError> {
        if self.submitting {
            return Ok(());
        }
        if self.prompt.trim().is_empty() {
            self.error = Some(ShellError::EmptyPrompt);
            return Err(ShellError::EmptyPrompt);
        }

        let options = GenerateOptions {
            title: self.custom_mode.then(|| self.title_input.clone()),
            tags: self.custom_mode.then(|| self.tags_input.clone()),
            custom: self.custom_mode,
            existing: self.tracks.len(),
        };

        // Custom-mode lyrics keep their layout; only validation trims.
        let prompt = self.prompt.clone();
        let (tx, rx) = mpsc::channel();
        let generator = Arc::clone(&self.generator);
        info!(custom = options.custom, "generation started");
        thread::spawn(move || {
            let result = generator.generate(&prompt, &options);
            let _ = tx.send(result);
        });

        self.pending = Some(rx);
        self.submitting = true;
        self.error = None;
        Ok(())
    }

    /// Collect a finished generation request, if one has replied.
    /// Returns true when the shell changed.
    pub fn poll_generation(&mut self, backend: &mut dyn MediaBackend) -> bool {
        let Some(rx) = self.pending.as_ref() else {
            return false;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(GenerationError::WorkerGone),
        };
        self.finish_generation(result, backend);
        true
    }

    fn finish_generation(&mut self, result: GenerationResult, backend: &mut dyn MediaBackend) {
        self.pending = None;
        self.submitting = false;

        match result {
            Ok(track) => {
                info!(id = %track.id, title = %track.title, "generation finished");
                let mut tracks = Vec::with_capacity(self.tracks.len() + 1);
                tracks.push(track);
                tracks.extend(self.tracks.iter().cloned());
                self.set_tracks(tracks, backend);

                self.prompt.clear();
                self.title_input.clear();
                self.tags_input.clear();
                self.error = None;
                self.selected = 0;
            }
            Err(e) => {
                warn!("generation failed: {e}");
                self.error = Some(ShellError::GenerationFailed);
            }
        }
    }

    // ---- track list ----

    /// Replace the record sequence and reconcile the controller arena:
    /// new ids get a fresh attached controller, changed records are handed
    /// to their controller, and vanished ids are disposed.
    pub fn set_tracks(&mut self, tracks: Vec<TrackRecord>, backend: &mut dyn MediaBackend) {
        self.controllers
            .retain(|id, _| tracks.iter().any(|t| &t.id == id));

        for track in &tracks {
            match self.controllers.get_mut(&track.id) {
                Some(controller) => {
                    if controller.track() != track {
                        controller.update_track(track.clone(), backend, &self.signals);
                    }
                }
                None => {
                    let mut controller = self.new_controller(track.clone());
                    controller.attach(backend, &self.signals);
                    self.controllers.insert(track.id.clone(), controller);
                }
            }
        }

        self.tracks = tracks;
        self.clamp_selection();
    }

    /// Drop a record and its controller. Returns false for an unknown id.
    pub fn remove_track(&mut self, id: &str) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.id != id);
        if self.tracks.len() == before {
            return false;
        }
        self.controllers.remove(id);
        debug!(id, "track removed");
        self.clamp_selection();
        true
    }

    fn new_controller(&self, track: TrackRecord) -> PlaybackController {
        let downloader = Arc::clone(&self.downloader);
        let extension = self.player.download_extension.clone();
        PlaybackController::new(track, &self.player).with_download_handler(Box::new(
            move |t: &TrackRecord| {
                debug!(id = %t.id, "download requested");
                downloader.save(&t.url, &suggested_filename(&t.title, &extension));
            },
        ))
    }

    /// Route a media signal to the controller bound to its source.
    pub fn dispatch_signal(&mut self, signal: MediaSignal) -> bool {
        if let Some(demo) = self.demo.as_mut() {
            if demo.bound_handle() == Some(signal.source) {
                return demo.handle_signal(signal);
            }
        }
        self.controllers
            .values_mut()
            .find(|c| c.bound_handle() == Some(signal.source))
            .map(|c| c.handle_signal(signal))
            .unwrap_or(false)
    }

    // ---- selection ----

    /// Number of selectable entries: generated songs, then the demo.
    pub fn entry_count(&self) -> usize {
        self.tracks.len() + usize::from(self.demo.is_some())
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select(&mut self, idx: usize) {
        if idx < self.entry_count() {
            self.selected = idx;
        }
    }

    pub fn next(&mut self) {
        let n = self.entry_count();
        if n > 0 {
            self.selected = (self.selected + 1) % n;
        }
    }

    pub fn prev(&mut self) {
        let n = self.entry_count();
        if n > 0 {
            self.selected = (self.selected + n - 1) % n;
        }
    }

    fn clamp_selection(&mut self) {
        let n = self.entry_count();
        if self.selected >= n {
            self.selected = n.saturating_sub(1);
        }
    }

    pub fn entry(&self, idx: usize) -> Option<&PlaybackController> {
        match self.tracks.get(idx) {
            Some(track) => self.controllers.get(&track.id),
            None if idx == self.tracks.len() => self.demo.as_ref(),
            None => None,
        }
    }

    pub fn entry_mut(&mut self, idx: usize) -> Option<&mut PlaybackController> {
        match self.tracks.get(idx) {
            Some(track) => self.controllers.get_mut(&track.id),
            None if idx == self.tracks.len() => self.demo.as_mut(),
            None => None,
        }
    }

    pub fn selected_entry(&self) -> Option<&PlaybackController> {
        self.entry(self.selected)
    }

    pub fn selected_entry_mut(&mut self) -> Option<&mut PlaybackController> {
        self.entry_mut(self.selected)
    }

    /// Download the selected entry through its controller.
    pub fn download_selected(&self) {
        if let Some(controller) = self.selected_entry() {
            controller.download(self.downloader.as_ref());
        }
    }

    /// Remove the selected generated song. The demo entry is not removable.
    pub fn remove_selected(&mut self) -> bool {
        match self.tracks.get(self.selected) {
            Some(track) => {
                let id = track.id.clone();
                self.remove_track(&id)
            }
            None => false,
        }
    }

    /// Lyrics of the selected entry, if it has any.
    pub fn selected_lyrics(&self) -> Option<&str> {
        self.selected_entry().and_then(|c| c.track().lyrics())
    }

    pub fn toggle_lyrics_window(&mut self) {
        self.lyrics_window = !self.lyrics_window;
    }

    // ---- inputs ----

    pub fn toggle_custom_mode(&mut self) {
        self.custom_mode = !self.custom_mode;
        if !self.custom_mode && matches!(self.focus, Focus::Title | Focus::Tags) {
            self.focus = Focus::Prompt;
        }
    }

    /// Cycle focus through the visible inputs, then the track list.
    pub fn cycle_focus(&mut self) {
        self.focus = match (self.focus, self.custom_mode) {
            (Focus::Prompt, true) => Focus::Title,
            (Focus::Prompt, false) => Focus::Tracks,
            (Focus::Title, _) => Focus::Tags,
            (Focus::Tags, _) => Focus::Tracks,
            (Focus::Tracks, _) => Focus::Prompt,
        };
    }

    fn focused_input(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Prompt => Some(&mut self.prompt),
            Focus::Title => Some(&mut self.title_input),
            Focus::Tags => Some(&mut self.tags_input),
            Focus::Tracks => None,
        }
    }

    /// Type into the focused input. Editing the prompt clears the error.
    pub fn push_char(&mut self, c: char) {
        if let Some(input) = self.focused_input() {
            input.push(c);
        }
        if self.focus == Focus::Prompt {
            self.error = None;
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(input) = self.focused_input() {
            input.pop();
        }
        if self.focus == Focus::Prompt {
            self.error = None;
        }
    }
}
