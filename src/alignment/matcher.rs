/*!
 * Context matching of streamed markers against source instances.
 *
 * The matcher keeps the translation-side marker history (to fingerprint each
 * incoming marker the same way the extractor fingerprinted the source) and
 * the unmatched index: for every letter, the ascending positions of source
 * instances still in `GAP`. Candidates are tried in position order and the
 * first one whose context agrees wins. A match is never revisited.
 */

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::alignment::context::{build_context, CompiledContext, ContextFingerprint, MatchMethod};
use crate::alignment::extractor::SourceDocument;
use crate::alignment::model::{MarkerStatus, MarkerToken, TranslationMarker};

/// Why a streamed marker could not be matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFailure {
    /// No source instance with this letter is still open
    NoUnmatchedInstances,
    /// Open instances exist but none has an agreeing context
    NoContextMatch,
    /// A candidate was chosen but the document rejected the match
    ApplyFailed,
}

impl fmt::Display for MatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoUnmatchedInstances => write!(f, "no_unmatched_instances"),
            Self::NoContextMatch => write!(f, "no_context_match"),
            Self::ApplyFailed => write!(f, "apply_failed"),
        }
    }
}

/// Result of matching one streamed marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched { source_position: usize, method: MatchMethod },
    Unmatched(MatchFailure),
}

impl MatchOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    pub fn source_position(&self) -> Option<usize> {
        match self {
            Self::Matched { source_position, .. } => Some(*source_position),
            Self::Unmatched(_) => None,
        }
    }

    pub fn method(&self) -> Option<MatchMethod> {
        match self {
            Self::Matched { method, .. } => Some(*method),
            Self::Unmatched(_) => None,
        }
    }
}

/// Open source instances per letter, ascending by position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnmatchedIndex {
    buckets: BTreeMap<char, Vec<usize>>,
}

impl UnmatchedIndex {
    /// Index every instance currently in `GAP`
    pub fn build(document: &SourceDocument) -> Self {
        let mut buckets: BTreeMap<char, Vec<usize>> = BTreeMap::new();
        for instance in document.iter().filter(|i| i.status == MarkerStatus::Gap) {
            buckets.entry(instance.letter).or_default().push(instance.position);
        }
        Self { buckets }
    }

    /// Replace the contents with a fresh index of the document
    pub fn rebuild(&mut self, document: &SourceDocument) {
        *self = Self::build(document);
    }

    /// Open positions for a letter
    pub fn candidates(&self, letter: char) -> &[usize] {
        self.buckets.get(&letter).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Remove a position, dropping the bucket once it is empty
    pub fn remove(&mut self, letter: char, position: usize) -> bool {
        let Some(bucket) = self.buckets.get_mut(&letter) else {
            return false;
        };
        let before = bucket.len();
        bucket.retain(|&p| p != position);
        let removed = bucket.len() != before;
        if bucket.is_empty() {
            self.buckets.remove(&letter);
        }
        removed
    }

    /// Total number of open positions
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Matches streamed translation markers to source instances
#[derive(Debug, Clone)]
pub struct ContextMatcher {
    compiled: Vec<CompiledContext>,
    history: Vec<MarkerToken>,
    index: UnmatchedIndex,
}

impl ContextMatcher {
    pub fn new(document: &SourceDocument) -> Self {
        Self {
            compiled: document
                .iter()
                .map(|instance| CompiledContext::from(&instance.context_fingerprint))
                .collect(),
            history: Vec::new(),
            index: UnmatchedIndex::build(document),
        }
    }

    /// Match a completed marker
    ///
    /// The marker joins the translation history whether or not it matches,
    /// so later markers see the stream exactly as the translator wrote it.
    pub fn match_marker(&mut self, marker: &TranslationMarker) -> MatchOutcome {
        self.history.push(marker.token());
        let context = build_context(&self.history, self.history.len());

        let candidates = self.index.candidates(marker.letter);
        if candidates.is_empty() {
            debug!("({}) #{}: no unmatched instances", marker.letter, marker.position);
            return MatchOutcome::Unmatched(MatchFailure::NoUnmatchedInstances);
        }

        let found = candidates.iter().find_map(|&position| {
            self.compiled
                .get(position - 1)
                .and_then(|source| source.compare(&context))
                .map(|method| (position, method))
        });

        match found {
            Some((source_position, method)) => {
                self.index.remove(marker.letter, source_position);
                debug!(
                    "({}) #{} matched source position {} via {}",
                    marker.letter, marker.position, source_position, method
                );
                MatchOutcome::Matched { source_position, method }
            }
            None => {
                debug!(
                    "({}) #{}: no context match among {} candidate(s)",
                    marker.letter,
                    marker.position,
                    candidates.len()
                );
                MatchOutcome::Unmatched(MatchFailure::NoContextMatch)
            }
        }
    }

    /// Context computed for the most recent marker
    pub fn last_context(&self) -> Option<ContextFingerprint> {
        if self.history.is_empty() {
            None
        } else {
            Some(build_context(&self.history, self.history.len()))
        }
    }

    /// Resynchronise the index after merges changed instance states
    pub fn refresh(&mut self, document: &SourceDocument) {
        self.index.rebuild(document);
    }

    pub fn unmatched(&self) -> &UnmatchedIndex {
        &self.index
    }

    /// Translation markers seen so far
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}
