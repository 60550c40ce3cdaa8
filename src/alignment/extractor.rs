/*!
 * Marker extraction.
 *
 * Runs once per source document: locates every `(letter)` marker, cuts the
 * text between consecutive markers into instance content, attaches the
 * externally supplied utterance batches and computes each instance's
 * context fingerprint from the source marker sequence.
 *
 * The result is a `SourceDocument`, an arena of `MarkerInstance` records
 * addressed by 1-based position. Everything downstream mutates the instances
 * in place through that arena.
 */

use std::collections::BTreeMap;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::alignment::context::build_context;
use crate::alignment::model::{
    DomainIndex, MarkerInstance, MarkerStatus, MarkerToken, Utterance, UtteranceInput,
};
use crate::errors::AlignmentError;
use crate::language_utils::DEFAULT_LANGUAGE;
use crate::text::services::LanguageServices;

/// Inline marker token in source and translation text
pub static MARKER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([a-z])\)").expect("Invalid marker regex"));

/// Document-level summary computed at extraction time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub total_markers: usize,
    pub unique_letters: Vec<char>,

    /// Domain index of every position, in position order
    pub position_map: Vec<DomainIndex>,

    pub total_utterances: usize,
    pub total_words: usize,
    pub average_words_per_utterance: f64,

    /// Seconds from the earliest utterance start to the latest utterance end
    pub total_duration: f64,
    pub start_time: f64,
    pub end_time: f64,

    pub primary_language: String,

    /// Utterance count per detected language
    pub language_stats: BTreeMap<String, usize>,
}

/// Arena of marker instances for one source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDocument {
    instances: Vec<MarkerInstance>,

    /// Positions of each letter's occurrences, ascending
    domains: BTreeMap<char, Vec<usize>>,

    #[serde(rename = "_meta")]
    meta: DocumentMeta,
}

impl SourceDocument {
    /// Number of marker instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    /// All instances in position order
    pub fn instances(&self) -> &[MarkerInstance] {
        &self.instances
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarkerInstance> {
        self.instances.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MarkerInstance> {
        self.instances.iter_mut()
    }

    /// Instance at a 1-based position
    pub fn instance_at(&self, position: usize) -> Option<&MarkerInstance> {
        position.checked_sub(1).and_then(|i| self.instances.get(i))
    }

    /// Mutable instance at a 1-based position
    pub fn instance_at_mut(&mut self, position: usize) -> Option<&mut MarkerInstance> {
        position.checked_sub(1).and_then(move |i| self.instances.get_mut(i))
    }

    /// Instance at a position, or an error naming it
    pub fn require(&self, position: usize) -> Result<&MarkerInstance, AlignmentError> {
        self.instance_at(position).ok_or(AlignmentError::UnknownPosition(position))
    }

    /// Mutable instance at a position, or an error naming it
    pub fn require_mut(&mut self, position: usize) -> Result<&mut MarkerInstance, AlignmentError> {
        self.instance_at_mut(position).ok_or(AlignmentError::UnknownPosition(position))
    }

    /// Position of an instance identified by its domain index
    pub fn position_of(&self, domain_index: DomainIndex) -> Option<usize> {
        self.domains
            .get(&domain_index.letter)
            .and_then(|positions| positions.get(domain_index.occurrence))
            .copied()
    }

    /// Instance identified by its domain index
    pub fn instance(&self, domain_index: DomainIndex) -> Option<&MarkerInstance> {
        self.position_of(domain_index).and_then(|p| self.instance_at(p))
    }

    /// Ascending positions of a letter's occurrences
    pub fn positions_of(&self, letter: char) -> &[usize] {
        self.domains.get(&letter).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Letters present in the document, ascending
    pub fn letters(&self) -> impl Iterator<Item = char> + '_ {
        self.domains.keys().copied()
    }

    /// Number of instances in a given status
    pub fn count_status(&self, status: MarkerStatus) -> usize {
        self.instances.iter().filter(|i| i.status == status).count()
    }

    /// Snapshot of the instance graph as pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// SHA-256 of the JSON snapshot, hex encoded
    pub fn digest(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&json);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// Builds a `SourceDocument` from marked source text and utterance batches
pub struct MarkerExtractor<'a> {
    services: &'a LanguageServices,
    fallback_language: String,
}

impl<'a> MarkerExtractor<'a> {
    /// `fallback_language` is used when script detection finds nothing distinctive
    pub fn new(services: &'a LanguageServices, fallback_language: &str) -> Self {
        Self {
            services,
            fallback_language: fallback_language.to_string(),
        }
    }

    /// Extract all marker instances
    ///
    /// `batches[i]` holds the utterances of the i-th marker occurrence. A
    /// count mismatch is logged; missing batches leave instances without
    /// utterances and surplus batches are ignored.
    pub fn extract(&self, text: &str, batches: &[Vec<UtteranceInput>]) -> SourceDocument {
        let spans: Vec<(char, usize, usize)> = MARKER_REGEX
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let letter = caps.get(1)?.as_str().chars().next()?;
                Some((letter, whole.start(), whole.end()))
            })
            .collect();

        if spans.len() != batches.len() {
            warn!(
                "Source has {} markers but {} utterance batches were supplied",
                spans.len(),
                batches.len()
            );
        }

        let total = spans.len();
        let sequence: Vec<MarkerToken> = spans.iter().map(|&(letter, _, _)| MarkerToken(letter)).collect();
        let mut occurrences: BTreeMap<char, usize> = BTreeMap::new();
        let mut domains: BTreeMap<char, Vec<usize>> = BTreeMap::new();
        let mut global_index = 0;
        let mut instances = Vec::with_capacity(total);

        for (i, &(letter, _, content_start)) in spans.iter().enumerate() {
            let position = i + 1;
            let content_end = spans.get(i + 1).map(|&(_, start, _)| start).unwrap_or(text.len());
            let content = text[content_start..content_end].trim().to_string();

            let occurrence = occurrences.entry(letter).or_insert(0);
            let domain_index = DomainIndex::new(letter, *occurrence);
            *occurrence += 1;
            domains.entry(letter).or_default().push(position);

            let utterances = batches
                .get(i)
                .map(|batch| {
                    batch
                        .iter()
                        .map(|input| {
                            let utterance = self.enrich(input, global_index, position, domain_index);
                            global_index += 1;
                            utterance
                        })
                        .collect()
                })
                .unwrap_or_default();

            let mut instance = MarkerInstance {
                domain_index,
                letter,
                position,
                index_in_domain: domain_index.occurrence,
                content_length: content.chars().count(),
                detected_language: self.detect(&content),
                content,
                utterances,
                status: MarkerStatus::Gap,
                context_fingerprint: build_context(&sequence, position),
                overall_translation: String::new(),
                overall_translation_with_compounds: None,
                match_method: None,
                merged_orphans: Vec::new(),
                merged_into: None,
                merge_direction: None,
                total_utterance_words: 0,
                total_duration: 0.0,
                is_first_position: position == 1,
                is_last_position: position == total,
                is_edge_position: position <= 3 || position + 2 >= total,
            };
            instance.update_totals();
            instances.push(instance);
        }

        let meta = build_meta(&instances, &domains);
        debug!(
            "Extracted {} markers ({} letters, {} utterances)",
            meta.total_markers,
            meta.unique_letters.len(),
            meta.total_utterances
        );

        SourceDocument {
            instances,
            domains,
            meta,
        }
    }

    fn detect(&self, text: &str) -> String {
        match self.services.detect_language(text) {
            DEFAULT_LANGUAGE => self.fallback_language.clone(),
            detected => detected.to_string(),
        }
    }

    fn enrich(
        &self,
        input: &UtteranceInput,
        global_index: usize,
        marker_position: usize,
        marker_domain_index: DomainIndex,
    ) -> Utterance {
        let detected_language = self.detect(&input.text);
        let word_length = input
            .word_length
            .unwrap_or_else(|| self.services.count_words(&input.text, &detected_language));

        Utterance {
            text: input.text.clone(),
            start: input.start,
            end: input.end,
            duration: input.duration.unwrap_or((input.end - input.start).max(0.0)),
            word_length,
            element_translation: String::new(),
            detected_language,
            timestamp_srt: format_srt_time(input.start),
            timestamp_vtt: format_vtt_time(input.start),
            end_timestamp_srt: format_srt_time(input.end),
            end_timestamp_vtt: format_vtt_time(input.end),
            global_index,
            marker_position,
            marker_domain_index,
            merged_from: None,
            merged_source: None,
        }
    }
}

fn build_meta(instances: &[MarkerInstance], domains: &BTreeMap<char, Vec<usize>>) -> DocumentMeta {
    let mut utterances: Vec<&Utterance> = instances.iter().flat_map(|i| i.utterances.iter()).collect();
    utterances.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut language_stats: BTreeMap<String, usize> = BTreeMap::new();
    for utterance in &utterances {
        *language_stats.entry(utterance.detected_language.clone()).or_insert(0) += 1;
    }

    // Most frequent language; ties go to the alphabetically first
    let primary_language = language_stats
        .iter()
        .fold(None, |best: Option<(&String, usize)>, (lang, &count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((lang, count)),
        })
        .map(|(lang, _)| lang.clone())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    let start_time = utterances.first().map(|u| u.start).unwrap_or(0.0);
    let end_time = utterances.iter().map(|u| u.end).reduce(f64::max).unwrap_or(0.0);
    let total_words: usize = utterances.iter().map(|u| u.word_length).sum();
    let average_words_per_utterance = if utterances.is_empty() {
        0.0
    } else {
        total_words as f64 / utterances.len() as f64
    };

    DocumentMeta {
        total_markers: instances.len(),
        unique_letters: domains.keys().copied().collect(),
        position_map: instances.iter().map(|i| i.domain_index).collect(),
        total_utterances: utterances.len(),
        total_words,
        average_words_per_utterance,
        total_duration: end_time - start_time,
        start_time,
        end_time,
        primary_language,
        language_stats,
    }
}

fn split_time(seconds: f64) -> (u64, u64, u64, u64) {
    let total_ms = (seconds.max(0.0) * 1000.0).floor() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    (hours, minutes, secs, millis)
}

/// Format seconds as an SRT timestamp (`HH:MM:SS,mmm`)
pub fn format_srt_time(seconds: f64) -> String {
    let (h, m, s, ms) = split_time(seconds);
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
}

/// Format seconds as a WebVTT timestamp (`HH:MM:SS.mmm`)
pub fn format_vtt_time(seconds: f64) -> String {
    let (h, m, s, ms) = split_time(seconds);
    format!("{:02}:{:02}:{:02}.{:03}", h, m, s, ms)
}
