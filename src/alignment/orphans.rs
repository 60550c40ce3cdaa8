/*!
 * Gap reconciliation.
 *
 * Source instances the translator skipped are found between consecutive
 * matches. Each one is absorbed into a matched neighbour: backward into the
 * previous match when there is one, otherwise forward into the match that
 * just happened. An instance with no neighbour to absorb it becomes a
 * terminal orphan.
 *
 * Merging moves utterance ownership. The utterances leave the skipped
 * instance and join the target, tagged with their origin so redistribution
 * can later hand each of them its share of the target's translation.
 */

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::alignment::extractor::SourceDocument;
use crate::alignment::model::{DomainIndex, MarkerStatus, MergeDirection, MergeRecord};
use crate::errors::AlignmentError;

/// What happened to one skipped instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapResolution {
    pub domain_index: DomainIndex,
    pub position: usize,
    pub content: String,

    /// Target absorbing the instance; `None` for an orphan
    pub merged_into: Option<DomainIndex>,

    pub target_position: Option<usize>,
    pub direction: Option<MergeDirection>,
}

impl GapResolution {
    pub fn is_orphan(&self) -> bool {
        self.merged_into.is_none()
    }
}

/// Tracks the last match and resolves gaps behind it
#[derive(Debug, Clone, Default)]
pub struct OrphanHandler {
    last_matched_position: Option<usize>,
    merged: usize,
    orphaned: usize,
}

impl OrphanHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the gaps before a fresh match at `position` and remember it
    pub fn on_match(&mut self, document: &mut SourceDocument, position: usize) -> Result<Vec<GapResolution>, AlignmentError> {
        let resolutions = self.check_gaps(document, position, Some(position))?;
        self.update_last_matched(position);
        Ok(resolutions)
    }

    /// Resolve every open instance strictly between the last match and `boundary`
    ///
    /// `current` is the instance that just matched, if any; it is the forward
    /// target while nothing has matched before it.
    pub fn check_gaps(
        &mut self,
        document: &mut SourceDocument,
        boundary: usize,
        current: Option<usize>,
    ) -> Result<Vec<GapResolution>, AlignmentError> {
        let start = self.last_matched_position.map_or(1, |p| p + 1);
        let gaps: Vec<usize> = (start..boundary)
            .filter(|&p| document.instance_at(p).is_some_and(|i| i.status.is_open()))
            .collect();
        if gaps.is_empty() {
            return Ok(Vec::new());
        }

        let mut resolutions = Vec::with_capacity(gaps.len());
        match (self.last_matched_position, current) {
            (Some(target), _) => {
                for &gap in &gaps {
                    resolutions.push(self.merge(document, gap, target, MergeDirection::Backward)?);
                }
            }
            (None, Some(target)) => {
                // Prepending in reverse keeps document order in the target
                for &gap in gaps.iter().rev() {
                    resolutions.push(self.merge(document, gap, target, MergeDirection::Forward)?);
                }
                resolutions.reverse();
            }
            (None, None) => {
                for &gap in &gaps {
                    resolutions.push(self.orphan(document, gap)?);
                }
            }
        }
        Ok(resolutions)
    }

    /// Final sweep over trailing gaps once the stream has ended
    pub fn process_final_gaps(&mut self, document: &mut SourceDocument) -> Result<Vec<GapResolution>, AlignmentError> {
        let boundary = document.len() + 1;
        let resolutions = self.check_gaps(document, boundary, None)?;
        if !resolutions.is_empty() {
            info!(
                "Final sweep resolved {} trailing gap(s) ({} orphaned)",
                resolutions.len(),
                resolutions.iter().filter(|r| r.is_orphan()).count()
            );
        }
        Ok(resolutions)
    }

    pub fn update_last_matched(&mut self, position: usize) {
        self.last_matched_position = Some(position);
    }

    pub fn last_matched_position(&self) -> Option<usize> {
        self.last_matched_position
    }

    pub fn merged_count(&self) -> usize {
        self.merged
    }

    pub fn orphaned_count(&self) -> usize {
        self.orphaned
    }

    fn merge(
        &mut self,
        document: &mut SourceDocument,
        gap: usize,
        target: usize,
        direction: MergeDirection,
    ) -> Result<GapResolution, AlignmentError> {
        let target_index = document.require(target)?.domain_index;

        let source = document.require_mut(gap)?;
        source.transition(MarkerStatus::Merged)?;
        source.merged_into = Some(target_index);
        source.merge_direction = Some(direction);

        let domain_index = source.domain_index;
        let mut utterances = std::mem::take(&mut source.utterances);
        for utterance in &mut utterances {
            utterance.merged_from = Some(domain_index);
        }
        let record = MergeRecord {
            domain_index,
            position: gap,
            content: source.content.clone(),
            content_length: source.content_length,
            utterances: utterances.iter().map(|u| u.global_index).collect(),
            total_utterance_words: utterances.iter().map(|u| u.word_length).sum(),
            merge_direction: direction,
        };
        let content = source.content.clone();
        source.update_totals();

        let target_instance = document.require_mut(target)?;
        match direction {
            MergeDirection::Forward => {
                let existing = std::mem::replace(&mut target_instance.utterances, utterances);
                target_instance.utterances.extend(existing);
                target_instance.merged_orphans.insert(0, record);
            }
            MergeDirection::Backward => {
                target_instance.utterances.extend(utterances);
                target_instance.merged_orphans.push(record);
            }
        }
        target_instance.update_totals();

        self.merged += 1;
        debug!("{} merged {} into {}", domain_index, direction, target_index);

        Ok(GapResolution {
            domain_index,
            position: gap,
            content,
            merged_into: Some(target_index),
            target_position: Some(target),
            direction: Some(direction),
        })
    }

    fn orphan(&mut self, document: &mut SourceDocument, gap: usize) -> Result<GapResolution, AlignmentError> {
        let instance = document.require_mut(gap)?;
        instance.transition(MarkerStatus::Orphan)?;
        self.orphaned += 1;
        debug!("{} orphaned", instance.domain_index);

        Ok(GapResolution {
            domain_index: instance.domain_index,
            position: gap,
            content: instance.content.clone(),
            merged_into: None,
            target_position: None,
            direction: None,
        })
    }
}
