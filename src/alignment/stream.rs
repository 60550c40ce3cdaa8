/*!
 * Async stream driver and chunk simulator.
 *
 * The processor itself is synchronous. These helpers connect it to any
 * ordered `futures::Stream` of text chunks: the driver awaits the next chunk,
 * feeds it, and finalizes when the stream ends. Suspension only ever happens
 * between chunks.
 *
 * `ChunkSimulator` replays a complete translation as such a stream, which is
 * how a finished translation file is processed from the command line.
 */

use std::pin::pin;
use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::alignment::processor::{FeedResult, ProcessingStats, StreamProcessor};
use crate::app_config::SimulationConfig;

/// Feed every chunk of `chunks` in order, then finalize
pub async fn drive_stream<S>(processor: &mut StreamProcessor, chunks: S) -> ProcessingStats
where
    S: Stream<Item = String>,
{
    drive_stream_with_progress(processor, chunks, |_| {}).await
}

/// Same as `drive_stream`, calling `on_chunk` after each fed chunk
pub async fn drive_stream_with_progress<S, F>(processor: &mut StreamProcessor, chunks: S, mut on_chunk: F) -> ProcessingStats
where
    S: Stream<Item = String>,
    F: FnMut(&FeedResult),
{
    let mut chunks = pin!(chunks);
    let mut fed = 0usize;
    while let Some(chunk) = chunks.next().await {
        let result = processor.feed(&chunk);
        fed += 1;
        on_chunk(&result);
    }
    debug!("Stream ended after {} chunk(s)", fed);
    processor.finalize()
}

/// Splits a complete text into a paced stream of chunks
#[derive(Debug, Clone)]
pub struct ChunkSimulator {
    chunk_size: usize,
    jitter: usize,
    delay: Duration,
    rng: StdRng,
}

impl ChunkSimulator {
    pub fn new(config: &SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            chunk_size: config.chunk_size.max(1),
            jitter: config.chunk_jitter,
            delay: Duration::from_millis(config.chunk_delay_ms),
            rng,
        }
    }

    /// Cut `text` into chunks of roughly `chunk_size` characters
    ///
    /// Cuts fall on character boundaries, never inside a UTF-8 sequence.
    pub fn split(&mut self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut chunks = Vec::with_capacity(chars.len() / self.chunk_size + 1);
        let mut start = 0;

        while start < chars.len() {
            let size = if self.jitter == 0 {
                self.chunk_size
            } else {
                let low = self.chunk_size.saturating_sub(self.jitter).max(1);
                let high = self.chunk_size + self.jitter;
                self.rng.random_range(low..=high)
            };
            let end = (start + size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            start = end;
        }

        chunks
    }

    /// Number of chunks `split` would produce without jitter
    pub fn estimate_chunks(&self, text: &str) -> usize {
        text.chars().count().div_ceil(self.chunk_size)
    }

    /// Stream the chunks of `text`, pausing before each one
    pub fn stream(mut self, text: &str) -> impl Stream<Item = String> + use<> {
        let chunks = self.split(text);
        let delay = self.delay;
        stream::iter(chunks).then(move |chunk| async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            chunk
        })
    }
}
