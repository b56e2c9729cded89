use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::debug;

use super::loader::fetch_bytes;
use super::registry::{Listeners, Subscription};
use super::thread::{AudioCmd, LoadHandle, LoadState, spawn_audio_thread};
use super::types::{HandleId, MediaBackend, MediaError, MediaHandle, MediaSignal};

/// `MediaBackend` playing through the default output device via `rodio`.
pub struct RodioBackend {
    tx: Sender<AudioCmd>,
    listeners: Listeners,
    next_id: u64,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl RodioBackend {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let listeners = Listeners::new();
        let join = spawn_audio_thread(rx, listeners.clone());
        Self {
            tx,
            listeners,
            next_id: 1,
            join: Mutex::new(Some(join)),
        }
    }

    /// Stop every sink and wait for the audio thread to exit.
    pub fn shutdown(&self) {
        let _ = self.tx.send(AudioCmd::Quit);
        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl MediaBackend for RodioBackend {
    fn open(&mut self, url: &str) -> Box<dyn MediaHandle> {
        let id = HandleId(self.next_id);
        self.next_id += 1;

        let load: LoadHandle = Arc::new(Mutex::new(LoadState::Pending));
        let _ = self.tx.send(AudioCmd::Open {
            id,
            load: load.clone(),
        });

        // Fetching may block on the network; keep it off the audio thread.
        let tx = self.tx.clone();
        let owned_url = url.to_string();
        thread::spawn(move || {
            let result = fetch_bytes(&owned_url);
            let _ = tx.send(AudioCmd::Loaded { id, result });
        });

        debug!(handle = id.0, url, "media opened");
        Box::new(RodioHandle {
            id,
            tx: self.tx.clone(),
            listeners: self.listeners.clone(),
            load,
        })
    }
}

struct RodioHandle {
    id: HandleId,
    tx: Sender<AudioCmd>,
    listeners: Listeners,
    load: LoadHandle,
}

impl MediaHandle for RodioHandle {
    fn id(&self) -> HandleId {
        self.id
    }

    fn subscribe(&self, listener: Sender<MediaSignal>) -> Subscription {
        let subscription = self.listeners.register(self.id, listener);
        let _ = self.tx.send(AudioCmd::Subscribed(self.id));
        subscription
    }

    fn play(&mut self) -> Result<(), MediaError> {
        let ready = self
            .load
            .lock()
            .map(|l| *l == LoadState::Ready)
            .unwrap_or(false);
        if !ready {
            return Err(MediaError::Unavailable);
        }
        self.tx
            .send(AudioCmd::Play(self.id))
            .map_err(|_| MediaError::Disconnected)
    }

    fn pause(&mut self) {
        let _ = self.tx.send(AudioCmd::Pause(self.id));
    }

    fn set_position(&mut self, seconds: f64) {
        let _ = self.tx.send(AudioCmd::Seek {
            id: self.id,
            seconds,
        });
    }

    fn set_volume(&mut self, volume: f32) {
        let _ = self.tx.send(AudioCmd::SetVolume {
            id: self.id,
            volume,
        });
    }

    fn set_muted(&mut self, muted: bool) {
        let _ = self.tx.send(AudioCmd::SetMuted { id: self.id, muted });
    }
}

impl Drop for RodioHandle {
    fn drop(&mut self) {
        let _ = self.tx.send(AudioCmd::Close(self.id));
    }
}
