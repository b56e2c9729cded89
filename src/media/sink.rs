//! Build `rodio` sinks from in-memory audio bytes.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use rodio::decoder::DecoderError;
use rodio::{Decoder, OutputStream, Sink, Source};

use super::loader::probe_duration;

/// Decode `bytes` once to learn the total duration in seconds.
pub(super) fn decode_duration(bytes: &Arc<[u8]>) -> Result<f64, DecoderError> {
    let decoder = Decoder::new(Cursor::new(Arc::clone(bytes)))?;
    let duration = decoder
        .total_duration()
        .or_else(|| probe_duration(bytes))
        .unwrap_or(Duration::ZERO);
    Ok(duration.as_secs_f64())
}

/// Create a paused `Sink` playing `bytes` from `start_at`.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    bytes: &Arc<[u8]>,
    start_at: Duration,
) -> Result<Sink, DecoderError> {
    let source = Decoder::new(Cursor::new(Arc::clone(bytes)))?
        // `skip_duration` doubles as the seek primitive for a fresh sink.
        .skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}
