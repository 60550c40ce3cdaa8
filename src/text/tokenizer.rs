/*!
 * Language-aware word splitting.
 *
 * Word counts drive every proportional split in redistribution, so the same
 * splitter must be used for counting and for cutting. The default splitter
 * keeps compound-marked units whole, uses Unicode word boundaries for
 * languages written without spaces, and splits everything else on
 * whitespace.
 */

use unicode_segmentation::UnicodeSegmentation;

use crate::language_utils::is_non_spaced;
use crate::text::compounds::{has_compound_markers, is_punctuation, split_compound_aware};

/// Capability splitting a text into words for a given language
pub trait WordSplitter: Send + Sync {
    fn split_into_words(&self, text: &str, language: &str) -> Vec<String>;

    /// Count words with exactly the splitting rules used for cutting
    fn count_words(&self, text: &str, language: &str) -> usize {
        self.split_into_words(text, language).len()
    }
}

/// Default splitter covering spaced, non-spaced and compound-marked text
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeWordSplitter;

impl WordSplitter for UnicodeWordSplitter {
    fn split_into_words(&self, text: &str, language: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        if has_compound_markers(text) {
            return split_compound_aware(text);
        }

        if is_non_spaced(language) {
            return split_word_segments(text);
        }

        text.split_whitespace().map(str::to_string).collect()
    }
}

// Punctuation segments join the preceding word, or the next one at the start
// of the text.
fn split_word_segments(text: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    let mut leading = String::new();

    for segment in text.split_word_bounds().filter(|w| !w.trim().is_empty()) {
        if is_punctuation(segment) {
            match words.last_mut() {
                Some(last) => last.push_str(segment),
                None => leading.push_str(segment),
            }
            continue;
        }
        let mut word = std::mem::take(&mut leading);
        word.push_str(segment);
        words.push(word);
    }

    if !leading.is_empty() {
        words.push(leading);
    }
    words
}
