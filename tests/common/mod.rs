/*!
 * Common test utilities for the segment-mapper test suite
 */

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use segment_mapper::alignment::{SourceDocument, StreamProcessor, UtteranceInput};
use segment_mapper::app_config::Config;
use segment_mapper::text::LanguageServices;

/// Route `log` output through the test harness (set RUST_LOG to see it)
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Config with an English target so no boundary rules apply, and no pacing
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.target_language = "en".to_string();
    config.simulation.chunk_delay_ms = 0;
    config.simulation.seed = Some(42);
    config
}

/// One utterance per marker, with each marker's content as its text
///
/// Markers are `(x)` followed by content up to the next marker.
pub fn batches_for(text: &str) -> Vec<Vec<UtteranceInput>> {
    contents(text)
        .into_iter()
        .enumerate()
        .map(|(i, content)| {
            let start = i as f64 * 2.0;
            vec![UtteranceInput::new(&content, start, start + 1.5)]
        })
        .collect()
}

/// Two utterances per marker, splitting the content's words in half
pub fn split_batches_for(text: &str) -> Vec<Vec<UtteranceInput>> {
    contents(text)
        .into_iter()
        .enumerate()
        .map(|(i, content)| {
            let words: Vec<&str> = content.split_whitespace().collect();
            let half = words.len().div_ceil(2);
            let start = i as f64 * 4.0;
            vec![
                UtteranceInput::new(&words[..half].join(" "), start, start + 1.5),
                UtteranceInput::new(&words[half..].join(" "), start + 2.0, start + 3.5),
            ]
        })
        .collect()
}

/// Contents following each `(x)` marker, trimmed
pub fn contents(text: &str) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    let mut rest = text;
    while let Some(start) = find_marker(rest) {
        let after = &rest[start + 3..];
        let end = find_marker(after).unwrap_or(after.len());
        result.push(after[..end].trim().to_string());
        rest = &after[end..];
    }
    result
}

fn find_marker(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    (0..bytes.len().saturating_sub(2))
        .find(|&i| bytes[i] == b'(' && bytes[i + 1].is_ascii_lowercase() && bytes[i + 2] == b')')
}

/// Processor over `source` with one utterance per marker
pub fn processor_for(source: &str, config: &Config) -> StreamProcessor {
    StreamProcessor::from_source(source, &batches_for(source), config, LanguageServices::default())
}

/// Feed `translation` in chunks of `chunk_size` characters and finalize
pub fn run_chunked(source: &str, translation: &str, chunk_size: usize, config: &Config) -> StreamProcessor {
    let mut processor = processor_for(source, config);
    let chars: Vec<char> = translation.chars().collect();
    for chunk in chars.chunks(chunk_size.max(1)) {
        let chunk: String = chunk.iter().collect();
        processor.feed(&chunk);
    }
    processor.finalize();
    processor
}

/// Whitespace word count
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Element translations of an instance joined in utterance order
pub fn joined_elements(document: &SourceDocument, position: usize) -> String {
    document
        .instance_at(position)
        .map(|instance| {
            instance
                .utterances
                .iter()
                .map(|u| u.element_translation.as_str())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}
