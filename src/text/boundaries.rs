/*!
 * Split-boundary rules.
 *
 * When a translation is cut into proportional pieces the cut should not
 * leave a conjunction or preposition dangling at the end of a piece, start a
 * piece with a word that only makes sense as a continuation, or fall inside a
 * compound word. Rules are language specific; only Vietnamese carries any.
 */

use std::collections::HashSet;

use crate::text::compounds::{COMPOUND_CLOSE, COMPOUND_OPEN, CompoundLexicon};

/// Words a Vietnamese piece should not end with
const VI_DONT_END_WITH: &[&str] = &[
    "và", "hoặc", "hay", "nhưng", "mà", "nên", "vì", "do", "để", "cho", "với", "của", "trong", "trên",
    "dưới", "ngoài", "các", "những", "một", "mỗi", "từng", "bất", "thật", "rất", "đã", "đang", "sẽ",
    "có", "là", "bị", "được", "hãy", "không",
];

/// Words a Vietnamese piece should not start with
const VI_DONT_START_WITH: &[&str] = &["hơn", "nhất", "lắm", "quá", "thôi", "được", "rồi"];

/// Boundary rules for one language
#[derive(Debug, Clone, Default)]
pub struct BoundaryRules {
    dont_end_with: HashSet<&'static str>,
    dont_start_with: HashSet<&'static str>,
}

impl BoundaryRules {
    /// Rules for a language code; languages without rules never shift
    pub fn for_language(language: &str) -> Self {
        match language {
            "vi" => Self {
                dont_end_with: VI_DONT_END_WITH.iter().copied().collect(),
                dont_start_with: VI_DONT_START_WITH.iter().copied().collect(),
            },
            _ => Self::default(),
        }
    }

    /// Whether these rules can ever move a boundary
    pub fn is_empty(&self) -> bool {
        self.dont_end_with.is_empty() && self.dont_start_with.is_empty()
    }

    /// Whether cutting `words` before index `split` breaks a rule
    pub fn is_violation(&self, words: &[String], split: usize, lexicon: Option<&dyn CompoundLexicon>) -> bool {
        if split == 0 || split >= words.len() || self.is_empty() {
            return false;
        }

        let before = &words[split - 1];
        let after = &words[split];

        // A piece ending on punctuation closes a clause
        if before.chars().last().is_some_and(|c| !c.is_alphanumeric() && c != COMPOUND_CLOSE) {
            return false;
        }

        if self.dont_end_with.contains(normalize(before).as_str())
            || self.dont_start_with.contains(normalize(after).as_str())
        {
            return true;
        }

        // Compound words that were not marked upstream
        let marked = before.contains(COMPOUND_OPEN) || after.contains(COMPOUND_OPEN);
        match lexicon {
            Some(lexicon) if !marked => lexicon.is_compound(&normalize(before), &normalize(after)),
            _ => false,
        }
    }

    /// Shift `split` forward past violations, never beyond `upper` and at
    /// most `max_shift` words
    pub fn adjust(
        &self,
        words: &[String],
        split: usize,
        upper: usize,
        lexicon: Option<&dyn CompoundLexicon>,
        max_shift: usize,
    ) -> usize {
        let upper = upper.min(words.len());
        let mut adjusted = split;
        let mut shifts = 0;
        while shifts < max_shift && adjusted < upper && self.is_violation(words, adjusted, lexicon) {
            adjusted += 1;
            shifts += 1;
        }
        adjusted
    }
}

// Lowercase and strip surrounding punctuation
fn normalize(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase()
}
