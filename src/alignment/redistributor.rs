/*!
 * Translation redistribution.
 *
 * A matched instance receives one translation string but may own the
 * utterances of several source segments: its own, plus those of neighbours
 * it absorbed. Redistribution cuts the translation back into per-utterance
 * pieces in two stages:
 *
 * 1. Forward, matched and backward portions get words in proportion to the
 *    source content length each represents.
 * 2. Inside each portion, utterances get words in proportion to their
 *    original word length.
 *
 * Both stages round each share against the full word count, give the last
 * item whatever remains and nudge every cut past language-specific
 * boundary violations.
 */

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::alignment::extractor::SourceDocument;
use crate::alignment::model::{DomainIndex, MarkerInstance, MarkerStatus, MergeDirection};
use crate::app_config::RedistributionConfig;
use crate::errors::RedistributionError;
use crate::language_utils::is_non_spaced;
use crate::text::services::LanguageServices;

/// Why an instance was left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoUtterances,
    ZeroContentLength,
    EmptyTranslation,
}

/// Result of redistributing one instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedistributionOutcome {
    /// Translation words were handed out to the given number of utterances
    Redistributed { words: usize, utterances: usize },
    Skipped(SkipReason),
}

/// Summary of a full redistribution pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedistributionReport {
    pub redistributed: Vec<DomainIndex>,
    pub skipped: Vec<(DomainIndex, SkipReason)>,
    pub failed: Vec<(DomainIndex, String)>,
}

/// Splits matched translations across the utterances an instance owns
pub struct Redistributor<'a> {
    services: &'a LanguageServices,
    language: String,
    config: RedistributionConfig,
}

impl<'a> Redistributor<'a> {
    /// `language` is the language of the translation text
    pub fn new(services: &'a LanguageServices, language: &str, config: &RedistributionConfig) -> Self {
        Self {
            services,
            language: language.to_string(),
            config: config.clone(),
        }
    }

    /// Words of a translation, compound-marked when applicable
    ///
    /// Records the marked text on the instance as a side effect.
    fn prepare_words(&self, instance: &mut MarkerInstance) -> Vec<String> {
        let marked = self.services.mark_compounds(&instance.overall_translation, &self.language);
        let words = self
            .services
            .split_words(marked.as_deref().unwrap_or(&instance.overall_translation), &self.language);
        instance.overall_translation_with_compounds = marked;
        words
    }

    /// Split `words` into `weights.len()` consecutive pieces
    ///
    /// Each piece but the last gets `round(total × share)` words, clamped so
    /// that (optionally) every later piece can still get one word while words
    /// remain. The last piece takes the remainder. Zero or non-finite total
    /// weight falls back to equal shares.
    pub fn split_by_weights(&self, words: &[String], weights: &[f64]) -> Vec<Vec<String>> {
        let pieces = weights.len();
        if pieces == 0 {
            return Vec::new();
        }

        let usable = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
        let total_weight: f64 = weights.iter().copied().map(usable).sum();
        let shares: Vec<f64> = if total_weight > 0.0 {
            weights.iter().map(|&w| usable(w) / total_weight).collect()
        } else {
            vec![1.0 / pieces as f64; pieces]
        };

        let rules = self.services.boundary_rules(&self.language);
        let lexicon = self.services.lexicon_for(&self.language);
        let total = words.len();
        let mut result = Vec::with_capacity(pieces);
        let mut cursor = 0;

        for (i, share) in shares.iter().enumerate() {
            if i == pieces - 1 {
                result.push(words[cursor..].to_vec());
                break;
            }

            let remaining = total - cursor;
            let (low, high) = if self.config.min_one_word_per_utterance {
                let low = usize::from(remaining > 0);
                (low, remaining.saturating_sub(pieces - i - 1).max(low))
            } else {
                (0, remaining)
            };

            let count = ((total as f64) * share).round() as usize;
            let mut end = cursor + count.clamp(low, high);
            if end > cursor && end < total {
                end = rules.adjust(words, end, cursor + high, lexicon, self.config.max_boundary_shift);
            }

            result.push(words[cursor..end].to_vec());
            cursor = end;
        }

        result
    }

    fn join(&self, words: &[String]) -> String {
        let separator = if is_non_spaced(&self.language) { "" } else { " " };
        words.join(separator)
    }

    // Hand `words` out to the given utterances by word length share
    fn assign(&self, instance: &mut MarkerInstance, members: &[usize], words: &[String]) {
        let weights: Vec<f64> = members
            .iter()
            .map(|&i| instance.utterances[i].word_length as f64)
            .collect();
        let pieces = self.split_by_weights(words, &weights);
        for (&member, piece) in members.iter().zip(pieces) {
            instance.utterances[member].element_translation = self.join(&piece);
        }
    }

    /// Distribute a freshly matched translation across the instance's
    /// utterances
    ///
    /// Instances that already absorbed neighbours get the full portioned
    /// redistribution; others are split by word length directly.
    pub fn distribute_matched(&self, instance: &mut MarkerInstance) {
        if !instance.merged_orphans.is_empty() {
            if let Err(e) = self.redistribute_instance(instance) {
                warn!("Redistribution of {} failed: {}", instance.domain_index, e);
            }
            return;
        }

        if instance.utterances.is_empty() || instance.overall_translation.trim().is_empty() {
            return;
        }

        let words = self.prepare_words(instance);
        let members: Vec<usize> = (0..instance.utterances.len()).collect();
        self.assign(instance, &members, &words);
        debug!(
            "{}: {} words over {} utterance(s)",
            instance.domain_index,
            words.len(),
            members.len()
        );
    }

    /// Redistribute one matched instance that absorbed neighbours
    pub fn redistribute_instance(
        &self,
        instance: &mut MarkerInstance,
    ) -> Result<RedistributionOutcome, RedistributionError> {
        if instance.utterances.is_empty() {
            warn!("Skip {}: no utterances", instance.domain_index);
            return Ok(RedistributionOutcome::Skipped(SkipReason::NoUtterances));
        }

        let length_of = |direction: MergeDirection| -> usize {
            instance
                .merged_orphans
                .iter()
                .filter(|r| r.merge_direction == direction)
                .map(|r| r.content_length)
                .sum()
        };
        let forward_length = length_of(MergeDirection::Forward);
        let backward_length = length_of(MergeDirection::Backward);
        let matched_length = instance.content_length;
        let total_length = forward_length + matched_length + backward_length;

        if total_length == 0 {
            warn!("Skip {}: zero content length", instance.domain_index);
            return Ok(RedistributionOutcome::Skipped(SkipReason::ZeroContentLength));
        }
        if instance.overall_translation.trim().is_empty() {
            warn!("Skip {}: empty translation", instance.domain_index);
            return Ok(RedistributionOutcome::Skipped(SkipReason::EmptyTranslation));
        }

        // Group utterance indices by the portion they belong to
        let mut forward = Vec::new();
        let mut matched = Vec::new();
        let mut backward = Vec::new();
        for (i, utterance) in instance.utterances.iter().enumerate() {
            let Some(origin) = utterance.origin() else {
                matched.push(i);
                continue;
            };
            let record = instance
                .merged_orphans
                .iter()
                .find(|r| r.domain_index == origin)
                .ok_or(RedistributionError::UnknownMergeOrigin {
                    global_index: utterance.global_index,
                    origin,
                    target: instance.domain_index,
                })?;
            match record.merge_direction {
                MergeDirection::Forward => forward.push(i),
                MergeDirection::Backward => backward.push(i),
            }
        }

        // Portions without utterances have nobody to receive words
        let portions: Vec<(usize, Vec<usize>)> = [
            (forward_length, forward),
            (matched_length, matched),
            (backward_length, backward),
        ]
        .into_iter()
        .filter(|(_, members)| !members.is_empty())
        .collect();

        let words = self.prepare_words(instance);
        let weights: Vec<f64> = portions.iter().map(|(length, _)| *length as f64).collect();
        let pieces = self.split_by_weights(&words, &weights);

        let allocated: usize = pieces.iter().map(Vec::len).sum();
        if allocated != words.len() {
            return Err(RedistributionError::AllocationMismatch {
                target: instance.domain_index,
                allocated,
                total: words.len(),
            });
        }

        debug!(
            "{}: lengths {} + {} + {} = {}, {} words over {} portion(s)",
            instance.domain_index,
            forward_length,
            matched_length,
            backward_length,
            total_length,
            words.len(),
            portions.len()
        );

        for ((_, members), piece) in portions.iter().zip(&pieces) {
            self.assign(instance, members, piece);
        }

        for utterance in &mut instance.utterances {
            if let Some(origin) = utterance.merged_from.take() {
                utterance.merged_source = Some(origin);
            }
        }

        Ok(RedistributionOutcome::Redistributed {
            words: words.len(),
            utterances: instance.utterances.len(),
        })
    }

    /// Redistribute every matched instance that absorbed neighbours
    ///
    /// Failures are logged and recorded per instance; the pass always runs to
    /// the end.
    pub fn redistribute_all(&self, document: &mut SourceDocument) -> RedistributionReport {
        let mut report = RedistributionReport::default();

        for instance in document.iter_mut() {
            if instance.status != MarkerStatus::Matched || instance.merged_orphans.is_empty() {
                continue;
            }
            match self.redistribute_instance(instance) {
                Ok(RedistributionOutcome::Redistributed { .. }) => report.redistributed.push(instance.domain_index),
                Ok(RedistributionOutcome::Skipped(reason)) => report.skipped.push((instance.domain_index, reason)),
                Err(e) => {
                    warn!("Redistribution of {} failed: {}", instance.domain_index, e);
                    report.failed.push((instance.domain_index, e.to_string()));
                }
            }
        }

        info!(
            "Redistribution: {} redistributed, {} skipped, {} failed",
            report.redistributed.len(),
            report.skipped.len(),
            report.failed.len()
        );
        report
    }
}
