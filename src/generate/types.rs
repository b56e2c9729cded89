use thiserror::Error;

use crate::track::TrackRecord;

/// Extra inputs collected by the shell alongside the prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// User-chosen title; a numbered default is used when absent.
    pub title: Option<String>,
    /// Genre/tags text; the configured default genre is used when absent.
    pub tags: Option<String>,
    /// Custom mode: the prompt is lyrics and is kept on the record.
    pub custom: bool,
    /// How many songs the shell already holds, for the default title.
    pub existing: usize,
}

impl GenerateOptions {
    /// Trimmed title, `None` when blank.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Trimmed tags, `None` when blank.
    pub fn tags(&self) -> Option<&str> {
        self.tags.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("no sample audio available")]
    NoSamples,
    #[error("generation worker stopped before replying")]
    WorkerGone,
}

/// Produces a track for a prompt. Runs off the event loop, so it may block.
pub trait Generator: Send + Sync {
    fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<TrackRecord, GenerationError>;
}
