/*!
 * Compound word handling.
 *
 * Vietnamese writes multi-syllable words with spaces between the syllables
 * ("hoạt động"). Splitting a translation on whitespace would happily cut such
 * a word in half, so before redistribution adjacent syllables that the
 * lexicon recognises are wrapped in guillemets (`«hoạt động»`) and treated as
 * a single word from then on.
 *
 * The lexicon itself is an external capability; this module only consumes
 * it through the `CompoundLexicon` trait.
 */

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Opening compound marker
pub const COMPOUND_OPEN: char = '«';

/// Closing compound marker
pub const COMPOUND_CLOSE: char = '»';

static WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{L}+").expect("Invalid word regex"));

// A marked compound (with any punctuation glued to it) or a plain token
static COMPOUND_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\s«]*«[^»]*»[^\s«]*|[^\s«]+|«\S*").expect("Invalid compound token regex")
});

/// Oracle answering whether two adjacent words form one compound word
pub trait CompoundLexicon: Send + Sync {
    fn is_compound(&self, first: &str, second: &str) -> bool;
}

impl<F> CompoundLexicon for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn is_compound(&self, first: &str, second: &str) -> bool {
        self(first, second)
    }
}

/// In-memory lexicon of two-word phrases, compared case-insensitively
#[derive(Debug, Clone, Default)]
pub struct PhraseLexicon {
    phrases: HashSet<String>,
}

impl PhraseLexicon {
    /// Build a lexicon from phrases such as `"hoạt động"`
    pub fn from_phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases = phrases
            .into_iter()
            .map(|p| normalize_phrase(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect();
        Self { phrases }
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

impl CompoundLexicon for PhraseLexicon {
    fn is_compound(&self, first: &str, second: &str) -> bool {
        let key = format!("{} {}", first.to_lowercase(), second.to_lowercase());
        self.phrases.contains(&key)
    }
}

fn normalize_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether the text already carries compound markers
pub fn has_compound_markers(text: &str) -> bool {
    text.contains(COMPOUND_OPEN) || text.contains(COMPOUND_CLOSE)
}

/// Strip compound markers, restoring the plain text
pub fn remove_compound_markers(text: &str) -> String {
    text.chars()
        .filter(|&c| c != COMPOUND_OPEN && c != COMPOUND_CLOSE)
        .collect()
}

/// Whether a token carries no letters or digits
pub fn is_punctuation(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(|c| c.is_alphanumeric())
}

/// Wrap every lexicon compound in `«»`
///
/// Pairs are taken greedily from left to right; the two words must be
/// separated by whitespace only. Text that is already marked is returned
/// unchanged.
pub fn merge_compounds(text: &str, lexicon: &dyn CompoundLexicon) -> String {
    if has_compound_markers(text) {
        return text.to_string();
    }

    let words: Vec<(usize, usize)> = WORD_REGEX
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();
    if words.len() < 2 {
        return text.to_string();
    }

    let mut spans = Vec::new();
    let mut i = 0;
    while i + 1 < words.len() {
        let (start, first_end) = words[i];
        let (second_start, end) = words[i + 1];
        let gap = &text[first_end..second_start];
        let adjacent = !gap.is_empty() && gap.chars().all(char::is_whitespace);

        if adjacent && lexicon.is_compound(&text[start..first_end], &text[second_start..end]) {
            spans.push((start, end));
            i += 2;
        } else {
            i += 1;
        }
    }

    if spans.is_empty() {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len() + spans.len() * 4);
    let mut cursor = 0;
    for (start, end) in spans {
        result.push_str(&text[cursor..start]);
        result.push(COMPOUND_OPEN);
        result.push_str(&text[start..end]);
        result.push(COMPOUND_CLOSE);
        cursor = end;
    }
    result.push_str(&text[cursor..]);
    result
}

/// Split marked text into words, keeping each `«…»` unit whole
pub fn split_compound_aware(text: &str) -> Vec<String> {
    COMPOUND_TOKEN_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
