/*!
 * Incremental marker scanner for the translation stream.
 *
 * Chunks arrive in order and may split a `(x)` token anywhere. The scanner
 * is a small state machine over characters:
 *
 * - `Text`: ordinary content; `(` moves to `Open`
 * - `Open`: saw `(`; a lowercase ASCII letter moves to `Letter`
 * - `Letter(x)`: saw `(x`; `)` completes the token
 *
 * Anything that breaks a token half way is flushed back into the content of
 * the marker being accumulated. At most two characters of an unfinished
 * token are carried between chunks, so feeding a text in one piece or in
 * arbitrary pieces yields the same markers.
 */

use log::{debug, trace};

use crate::alignment::model::{PartialMarker, TranslationMarker};
use crate::app_config::StreamConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Text,
    Open,
    Letter(char),
}

#[derive(Debug, Clone)]
struct OpenMarker {
    letter: char,
    position: usize,
    content: String,
}

/// Result of feeding one chunk
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScanOutput {
    /// Markers whose terminating token arrived in this chunk
    pub completed: Vec<TranslationMarker>,
    /// Marker still accumulating content, if any
    pub current: Option<PartialMarker>,
}

/// Stateful scanner turning text chunks into completed translation markers
#[derive(Debug, Clone)]
pub struct ChunkScanner {
    state: ScanState,
    carry: String,
    current: Option<OpenMarker>,
    completed_count: usize,

    // Diagnostic copy of the stream, trimmed to a bounded tail
    buffer: String,
    buffer_chars: usize,
    buffer_ceiling: usize,
    buffer_keep_tail: usize,
    total_chars: usize,
}

impl Default for ChunkScanner {
    fn default() -> Self {
        Self::new(&StreamConfig::default())
    }
}

impl ChunkScanner {
    pub fn new(config: &StreamConfig) -> Self {
        Self {
            state: ScanState::Text,
            carry: String::new(),
            current: None,
            completed_count: 0,
            buffer: String::new(),
            buffer_chars: 0,
            buffer_ceiling: config.buffer_ceiling,
            buffer_keep_tail: config.buffer_keep_tail,
            total_chars: 0,
        }
    }

    /// Consume one chunk
    pub fn feed(&mut self, chunk: &str) -> ScanOutput {
        self.append_to_buffer(chunk);

        let mut completed = Vec::new();
        for c in chunk.chars() {
            self.step(c, &mut completed);
        }

        if !completed.is_empty() {
            debug!("Chunk completed {} marker(s), {} total", completed.len(), self.completed_count);
        }

        ScanOutput {
            completed,
            current: self.current(),
        }
    }

    /// Drain the marker still accumulating at stream end
    ///
    /// An unfinished token at the very end is literal text and stays in the
    /// content.
    pub fn finalize(&mut self) -> Option<TranslationMarker> {
        let carry = std::mem::take(&mut self.carry);
        self.state = ScanState::Text;
        let mut open = self.current.take()?;
        open.content.push_str(&carry);
        self.completed_count += 1;
        Some(TranslationMarker {
            letter: open.letter,
            position: open.position,
            content: open.content.trim().to_string(),
        })
    }

    fn step(&mut self, c: char, completed: &mut Vec<TranslationMarker>) {
        match self.state {
            ScanState::Text => {
                if c == '(' {
                    self.carry.push(c);
                    self.state = ScanState::Open;
                } else {
                    self.push_content(c);
                }
            }
            ScanState::Open => {
                if c.is_ascii_lowercase() {
                    self.carry.push(c);
                    self.state = ScanState::Letter(c);
                } else {
                    self.flush_carry();
                    self.restart_with(c);
                }
            }
            ScanState::Letter(letter) => {
                if c == ')' {
                    self.carry.clear();
                    self.state = ScanState::Text;
                    self.open_marker(letter, completed);
                } else {
                    self.flush_carry();
                    self.restart_with(c);
                }
            }
        }
    }

    // Re-examine a character after an aborted token
    fn restart_with(&mut self, c: char) {
        if c == '(' {
            self.carry.push(c);
            self.state = ScanState::Open;
        } else {
            self.state = ScanState::Text;
            self.push_content(c);
        }
    }

    fn flush_carry(&mut self) {
        let carry = std::mem::take(&mut self.carry);
        if let Some(open) = self.current.as_mut() {
            open.content.push_str(&carry);
        }
    }

    // Text before the first marker has no owner and is dropped
    fn push_content(&mut self, c: char) {
        if let Some(open) = self.current.as_mut() {
            open.content.push(c);
        }
    }

    fn open_marker(&mut self, letter: char, completed: &mut Vec<TranslationMarker>) {
        if let Some(done) = self.current.take() {
            self.completed_count += 1;
            trace!("Completed ({}) at stream position {}", done.letter, done.position);
            completed.push(TranslationMarker {
                letter: done.letter,
                position: done.position,
                content: done.content.trim().to_string(),
            });
        }
        self.current = Some(OpenMarker {
            letter,
            position: self.completed_count + 1,
            content: String::new(),
        });
    }

    fn append_to_buffer(&mut self, chunk: &str) {
        let chunk_chars = chunk.chars().count();
        self.total_chars += chunk_chars;
        self.buffer.push_str(chunk);
        self.buffer_chars += chunk_chars;

        if self.buffer_chars > self.buffer_ceiling {
            let skip = self.buffer_chars - self.buffer_keep_tail.min(self.buffer_chars);
            let cut = self
                .buffer
                .char_indices()
                .nth(skip)
                .map(|(i, _)| i)
                .unwrap_or(self.buffer.len());
            self.buffer.drain(..cut);
            self.buffer_chars -= skip;
            debug!("Stream buffer trimmed to last {} chars", self.buffer_chars);
        }
    }

    /// Marker currently accumulating content
    pub fn current(&self) -> Option<PartialMarker> {
        self.current.as_ref().map(|open| PartialMarker {
            letter: open.letter,
            position: open.position,
            partial_content: open.content.trim().to_string(),
        })
    }

    /// Number of markers completed so far
    pub fn completed_count(&self) -> usize {
        self.completed_count
    }

    /// Bounded tail of the stream seen so far
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Total characters fed, including trimmed ones
    pub fn total_chars(&self) -> usize {
        self.total_chars
    }
}
