//! In-memory `MediaBackend` that records every command it receives.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::mpsc::Sender;

use super::registry::{Listeners, Subscription};
use super::types::{HandleId, MediaBackend, MediaError, MediaEvent, MediaHandle, MediaSignal};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Open(String),
    Play,
    Pause,
    SetPosition(f64),
    SetVolume(f32),
    SetMuted(bool),
    Close,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    pub listeners: Listeners,
    next_id: Rc<Cell<u64>>,
    log: Rc<RefCell<Vec<(HandleId, Command)>>>,
    reject_play: Rc<Cell<bool>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `play` fail synchronously.
    pub fn reject_play(&self, reject: bool) {
        self.reject_play.set(reject);
    }

    pub fn emit(&self, id: HandleId, event: MediaEvent) -> bool {
        self.listeners.emit(id, event)
    }

    pub fn commands(&self) -> Vec<(HandleId, Command)> {
        self.log.borrow().clone()
    }

    pub fn commands_for(&self, id: HandleId) -> Vec<Command> {
        self.log
            .borrow()
            .iter()
            .filter(|(h, _)| *h == id)
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub fn last_command(&self) -> Option<Command> {
        self.log.borrow().last().map(|(_, c)| c.clone())
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

impl MediaBackend for FakeBackend {
    fn open(&mut self, url: &str) -> Box<dyn MediaHandle> {
        let id = HandleId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        self.log.borrow_mut().push((id, Command::Open(url.to_string())));
        Box::new(FakeHandle {
            id,
            backend: self.clone(),
        })
    }
}

struct FakeHandle {
    id: HandleId,
    backend: FakeBackend,
}

impl FakeHandle {
    fn record(&self, cmd: Command) {
        self.backend.log.borrow_mut().push((self.id, cmd));
    }
}

impl MediaHandle for FakeHandle {
    fn id(&self) -> HandleId {
        self.id
    }

    fn subscribe(&self, listener: Sender<MediaSignal>) -> Subscription {
        self.backend.listeners.register(self.id, listener)
    }

    fn play(&mut self) -> Result<(), MediaError> {
        if self.backend.reject_play.get() {
            return Err(MediaError::Unavailable);
        }
        self.record(Command::Play);
        Ok(())
    }

    fn pause(&mut self) {
        self.record(Command::Pause);
    }

    fn set_position(&mut self, seconds: f64) {
        self.record(Command::SetPosition(seconds));
    }

    fn set_volume(&mut self, volume: f32) {
        self.record(Command::SetVolume(volume));
    }

    fn set_muted(&mut self, muted: bool) {
        self.record(Command::SetMuted(muted));
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        self.record(Command::Close);
    }
}
