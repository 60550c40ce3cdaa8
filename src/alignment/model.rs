/*!
 * Data model for marker alignment.
 *
 * Marker instances live in an arena owned by `SourceDocument` and are
 * addressed by their 1-based position. Merge records and utterance origin
 * tags refer to other instances through `DomainIndex` values, never through
 * references, so the graph can be mutated in place and serialized as-is.
 */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::alignment::context::{ContextFingerprint, MatchMethod};
use crate::errors::AlignmentError;

/// Stable identity of one marker occurrence: letter plus occurrence index (`a-0`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainIndex {
    /// Marker letter
    pub letter: char,
    /// How many times the letter appeared before this occurrence
    pub occurrence: usize,
}

impl DomainIndex {
    pub fn new(letter: char, occurrence: usize) -> Self {
        Self { letter, occurrence }
    }
}

impl fmt::Display for DomainIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.letter, self.occurrence)
    }
}

impl FromStr for DomainIndex {
    type Err = AlignmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AlignmentError::InvalidDomainIndex(s.to_string());
        let (letter, occurrence) = s.split_once('-').ok_or_else(invalid)?;
        let mut chars = letter.chars();
        let letter = match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_lowercase() => c,
            _ => return Err(invalid()),
        };
        let occurrence = occurrence.parse().map_err(|_| invalid())?;
        Ok(Self { letter, occurrence })
    }
}

impl Serialize for DomainIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DomainIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A marker letter rendered as its inline token, e.g. `(a)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerToken(pub char);

impl MarkerToken {
    pub fn letter(&self) -> char {
        self.0
    }
}

impl fmt::Display for MarkerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0)
    }
}

impl FromStr for MarkerToken {
    type Err = AlignmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| AlignmentError::InvalidMarkerToken(s.to_string()))?;
        let mut chars = inner.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_lowercase() => Ok(Self(c)),
            _ => Err(AlignmentError::InvalidMarkerToken(s.to_string())),
        }
    }
}

impl Serialize for MarkerToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MarkerToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Lifecycle state of a source marker instance
///
/// `Gap` is the only non-terminal state. An instance leaves it exactly once,
/// either by being matched, by being absorbed into a neighbour, or by being
/// declared an orphan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarkerStatus {
    #[default]
    Gap,
    Matched,
    Merged,
    Orphan,
}

impl MarkerStatus {
    /// Whether the instance can still change state
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Gap)
    }

    /// Validate a transition and return the new status
    pub fn transition(self, to: MarkerStatus, domain_index: DomainIndex) -> Result<MarkerStatus, AlignmentError> {
        match (self, to) {
            (Self::Gap, Self::Matched) | (Self::Gap, Self::Merged) | (Self::Gap, Self::Orphan) => Ok(to),
            (Self::Gap, Self::Gap)
            | (Self::Matched, _)
            | (Self::Merged, _)
            | (Self::Orphan, _) => Err(AlignmentError::InvalidTransition {
                domain_index,
                from: self,
                to,
            }),
        }
    }
}

impl fmt::Display for MarkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Gap => "GAP",
            Self::Matched => "MATCHED",
            Self::Merged => "MERGED",
            Self::Orphan => "ORPHAN",
        };
        write!(f, "{}", label)
    }
}

/// Which neighbour absorbed a skipped marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MergeDirection {
    /// Absorbed into the next matched instance (no earlier match existed)
    Forward,
    /// Absorbed into the previously matched instance
    Backward,
}

impl fmt::Display for MergeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "FORWARD"),
            Self::Backward => write!(f, "BACKWARD"),
        }
    }
}

/// Utterance metadata as supplied by source ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UtteranceInput {
    /// Source text of the utterance
    #[serde(alias = "utterance")]
    pub text: String,

    /// Start time in seconds
    #[serde(default)]
    pub start: f64,

    /// End time in seconds
    #[serde(default)]
    pub end: f64,

    /// Duration in seconds (derived from start/end when absent)
    #[serde(default)]
    pub duration: Option<f64>,

    /// Language-aware word count (computed when absent)
    #[serde(default)]
    pub word_length: Option<usize>,
}

impl UtteranceInput {
    pub fn new(text: &str, start: f64, end: f64) -> Self {
        Self {
            text: text.to_string(),
            start,
            end,
            duration: None,
            word_length: None,
        }
    }

    /// Set an explicit word length
    pub fn with_word_length(mut self, word_length: usize) -> Self {
        self.word_length = Some(word_length);
        self
    }
}

/// Atomic source unit owned by exactly one marker instance at a time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utterance {
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    pub word_length: usize,

    /// Translation slice assigned by redistribution
    #[serde(default)]
    pub element_translation: String,

    pub detected_language: String,
    pub timestamp_srt: String,
    pub timestamp_vtt: String,
    pub end_timestamp_srt: String,
    pub end_timestamp_vtt: String,

    /// Ordinal across the whole document
    pub global_index: usize,

    /// Position of the instance that created this utterance
    pub marker_position: usize,

    /// Identity of the instance that created this utterance
    pub marker_domain_index: DomainIndex,

    /// Origin tag set while the utterance sits in a merge target and
    /// redistribution has not consumed it yet
    #[serde(rename = "_mergedFrom", default, skip_serializing_if = "Option::is_none")]
    pub merged_from: Option<DomainIndex>,

    /// Informational origin left behind after redistribution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_source: Option<DomainIndex>,
}

impl Utterance {
    /// Origin of this utterance inside its current owner: either the merge
    /// tag or, once consumed, the informational source
    pub fn origin(&self) -> Option<DomainIndex> {
        self.merged_from.or(self.merged_source)
    }
}

/// Bookkeeping entry left on an instance that absorbed a skipped neighbour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRecord {
    pub domain_index: DomainIndex,
    pub position: usize,
    pub content: String,
    pub content_length: usize,

    /// Global indices of the utterances that moved with the merge
    pub utterances: Vec<usize>,

    pub total_utterance_words: usize,
    pub merge_direction: MergeDirection,
}

/// One occurrence of a lettered marker in the source, in document order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerInstance {
    pub domain_index: DomainIndex,
    pub letter: char,

    /// 1-based index in the global marker sequence
    pub position: usize,

    pub index_in_domain: usize,
    pub content: String,
    pub content_length: usize,
    pub utterances: Vec<Utterance>,
    pub status: MarkerStatus,
    pub context_fingerprint: ContextFingerprint,

    #[serde(default)]
    pub overall_translation: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_translation_with_compounds: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_method: Option<MatchMethod>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merged_orphans: Vec<MergeRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_into: Option<DomainIndex>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_direction: Option<MergeDirection>,

    pub detected_language: String,

    /// Sum of the owned utterances' word lengths, kept current on merge
    #[serde(default)]
    pub total_utterance_words: usize,

    /// Sum of the owned utterances' durations, kept current on merge
    #[serde(default)]
    pub total_duration: f64,

    pub is_first_position: bool,
    pub is_last_position: bool,
    pub is_edge_position: bool,
}

impl MarkerInstance {
    /// Number of utterances currently owned
    pub fn utterance_count(&self) -> usize {
        self.utterances.len()
    }

    /// Recompute the utterance totals after utterances moved
    pub fn update_totals(&mut self) {
        self.total_utterance_words = self.utterances.iter().map(|u| u.word_length).sum();
        self.total_duration = self.utterances.iter().map(|u| u.duration).sum();
    }

    /// Apply a status transition, rejecting anything out of a terminal state
    pub fn transition(&mut self, to: MarkerStatus) -> Result<(), AlignmentError> {
        self.status = self.status.transition(to, self.domain_index)?;
        Ok(())
    }
}

/// A marker parsed from the translation stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationMarker {
    pub letter: char,

    /// 1-based index in the translation stream (independent of source position)
    pub position: usize,

    pub content: String,
}

impl TranslationMarker {
    pub fn token(&self) -> MarkerToken {
        MarkerToken(self.letter)
    }
}

/// The marker currently accumulating content at the tail of the stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialMarker {
    pub letter: char,
    pub position: usize,
    pub partial_content: String,
}
