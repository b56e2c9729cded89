use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::seq::SliceRandom;
use tracing::{debug, info};

use super::samples::scan_samples;
use super::types::{GenerateOptions, GenerationError, Generator};
use crate::config::GeneratorSettings;
use crate::track::{TrackRecord, artist_line};

/// Pretends to call a generation service: sleeps for the configured delay,
/// then hands back a record pointing at a random sample recording.
pub struct SimulatedGenerator {
    delay: Duration,
    pool: Vec<String>,
    default_genre: String,
    artist: String,
    counter: AtomicU64,
}

impl SimulatedGenerator {
    pub fn new(settings: &GeneratorSettings) -> Self {
        let mut pool = settings
            .sample_dir
            .as_deref()
            .map(|dir| scan_samples(dir, &settings.sample_extensions))
            .unwrap_or_default();

        if pool.is_empty() {
            pool = settings.sample_urls.clone();
        } else {
            info!(count = pool.len(), "using local sample directory");
        }

        Self {
            delay: Duration::from_millis(settings.delay_ms),
            pool,
            default_genre: settings.default_genre.clone(),
            artist: settings.artist.clone(),
            counter: AtomicU64::new(0),
        }
    }

    pub fn pool(&self) -> &[String] {
        &self.pool
    }

    fn next_id(&self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{millis}-{n}")
    }
}

impl Generator for SimulatedGenerator {
    fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<TrackRecord, GenerationError> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        let url = self
            .pool
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(GenerationError::NoSamples)?;

        let title = options
            .title()
            .map(str::to_string)
            .unwrap_or_else(|| format!("AI Song {}", options.existing + 1));
        let genre = options.tags().unwrap_or(&self.default_genre).to_string();
        let lyrics = options.custom.then(|| prompt.to_string());

        let record = TrackRecord {
            id: self.next_id(),
            artist: artist_line(&self.artist, &genre),
            title,
            genre,
            url,
            lyrics,
        };
        debug!(id = %record.id, url = %record.url, "generated track");
        Ok(record)
    }
}
