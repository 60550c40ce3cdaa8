/*!
 * Append-only event log for observers.
 *
 * Events describe what the processor decided for each streamed marker and
 * each skipped source instance. They are data for external renderers and
 * are never read back by the engine.
 */

use serde::{Deserialize, Serialize};

use crate::alignment::context::MatchMethod;
use crate::alignment::matcher::{MatchFailure, MatchOutcome};
use crate::alignment::model::{DomainIndex, MarkerToken, MergeDirection, TranslationMarker};
use crate::alignment::orphans::GapResolution;

/// One observable decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A translation marker was completed and matched (or not)
    #[serde(rename_all = "camelCase")]
    MarkerCompleted {
        marker: MarkerToken,
        content: String,
        position: usize,
        matched: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<MatchMethod>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<MatchFailure>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_position: Option<usize>,
    },

    /// A skipped source instance was absorbed by a neighbour
    #[serde(rename_all = "camelCase")]
    MarkerMerged {
        domain_index: DomainIndex,
        position: usize,
        merged_into: DomainIndex,
        target_position: usize,
        direction: MergeDirection,
    },

    /// A skipped source instance had no neighbour to absorb it
    #[serde(rename_all = "camelCase")]
    MarkerOrphaned {
        domain_index: DomainIndex,
        position: usize,
        content: String,
    },
}

/// Bounded event log; events past the limit are counted but not kept
#[derive(Debug, Clone)]
pub struct EventLog {
    events: Vec<StreamEvent>,
    max_events: usize,
    preview_chars: usize,
    dropped: usize,
}

impl EventLog {
    pub fn new(max_events: usize, preview_chars: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
            preview_chars,
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: StreamEvent) {
        if self.events.len() < self.max_events {
            self.events.push(event);
        } else {
            self.dropped += 1;
        }
    }

    /// Record a completed marker together with its match outcome
    pub fn marker_completed(&mut self, marker: &TranslationMarker, outcome: &MatchOutcome) {
        let (method, reason) = match outcome {
            MatchOutcome::Matched { method, .. } => (Some(*method), None),
            MatchOutcome::Unmatched(failure) => (None, Some(*failure)),
        };
        let content = self.preview(&marker.content);
        self.push(StreamEvent::MarkerCompleted {
            marker: marker.token(),
            content,
            position: marker.position,
            matched: outcome.is_matched(),
            method,
            reason,
            source_position: outcome.source_position(),
        });
    }

    /// Record how a gap was resolved
    pub fn gap_resolved(&mut self, resolution: &GapResolution) {
        let event = match (resolution.merged_into, resolution.target_position, resolution.direction) {
            (Some(merged_into), Some(target_position), Some(direction)) => StreamEvent::MarkerMerged {
                domain_index: resolution.domain_index,
                position: resolution.position,
                merged_into,
                target_position,
                direction,
            },
            _ => StreamEvent::MarkerOrphaned {
                domain_index: resolution.domain_index,
                position: resolution.position,
                content: self.preview(&resolution.content),
            },
        };
        self.push(event);
    }

    fn preview(&self, content: &str) -> String {
        if content.chars().count() <= self.preview_chars {
            return content.to_string();
        }
        let mut preview: String = content.chars().take(self.preview_chars).collect();
        preview.push_str("...");
        preview
    }

    pub fn events(&self) -> &[StreamEvent] {
        &self.events
    }

    /// Events that did not fit under the limit
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
