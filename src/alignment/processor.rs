/*!
 * Streaming processor.
 *
 * Ties the components together for one processing run:
 *
 * - chunks go through the scanner, which yields completed markers
 * - each completed marker is matched against the open source instances
 * - a match transitions the instance, resolves the gaps behind it and
 *   distributes the translation over the instance's utterances
 * - `finalize` drains the last marker, sweeps trailing gaps and runs the
 *   final redistribution pass
 *
 * Processing is strictly sequential; a processor is fed from one task in
 * arrival order.
 */

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::alignment::events::{EventLog, StreamEvent};
use crate::alignment::extractor::{MarkerExtractor, SourceDocument};
use crate::alignment::matcher::{ContextMatcher, MatchFailure, MatchOutcome};
use crate::alignment::model::{MarkerStatus, PartialMarker, TranslationMarker, UtteranceInput};
use crate::alignment::orphans::OrphanHandler;
use crate::alignment::redistributor::{RedistributionReport, Redistributor};
use crate::alignment::scanner::ChunkScanner;
use crate::app_config::{Config, RedistributionConfig};
use crate::errors::AlignmentError;
use crate::text::services::LanguageServices;

/// Aggregate counters for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProcessingStats {
    /// Source instances matched directly
    pub matched: usize,
    /// Source instances absorbed by a neighbour
    pub merged: usize,
    /// Source instances left without a counterpart
    pub orphaned: usize,
    /// Source instances in the document
    pub total: usize,
    /// Translation markers processed
    pub processed: usize,
}

impl ProcessingStats {
    /// Share of source instances that ended up with a translation
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.matched + self.merged) as f64 / self.total as f64
    }
}

/// Result of feeding one chunk
#[derive(Debug, Clone, PartialEq)]
pub struct FeedResult {
    pub new_markers: Vec<TranslationMarker>,
    pub current_marker: Option<PartialMarker>,
    pub stats: ProcessingStats,
    pub buffer_length: usize,
}

/// Processes a streamed translation against one source document
pub struct StreamProcessor {
    document: SourceDocument,
    services: LanguageServices,
    target_language: String,
    redistribution: RedistributionConfig,
    scanner: ChunkScanner,
    matcher: ContextMatcher,
    orphans: OrphanHandler,
    events: EventLog,
    stats: ProcessingStats,
    last_report: Option<RedistributionReport>,
    finalized: bool,
}

impl StreamProcessor {
    /// Create a processor over an extracted document
    pub fn new(document: SourceDocument, config: &Config, services: LanguageServices) -> Self {
        let matcher = ContextMatcher::new(&document);
        let stats = ProcessingStats {
            total: document.len(),
            ..ProcessingStats::default()
        };
        Self {
            target_language: config.target_language_code(),
            redistribution: config.redistribution.clone(),
            scanner: ChunkScanner::new(&config.stream),
            matcher,
            orphans: OrphanHandler::new(),
            events: EventLog::new(config.stream.max_events, config.stream.event_preview_chars),
            stats,
            last_report: None,
            finalized: false,
            document,
            services,
        }
    }

    /// Extract the source and create a processor over it
    pub fn from_source(text: &str, batches: &[Vec<UtteranceInput>], config: &Config, services: LanguageServices) -> Self {
        let document = MarkerExtractor::new(&services, &config.source_language_code()).extract(text, batches);
        Self::new(document, config, services)
    }

    /// Consume one chunk of the translation stream
    ///
    /// Chunks arriving after `finalize` are ignored.
    pub fn feed(&mut self, chunk: &str) -> FeedResult {
        if self.finalized {
            warn!("Ignoring chunk of {} chars fed after finalize", chunk.chars().count());
            return FeedResult {
                new_markers: Vec::new(),
                current_marker: None,
                stats: self.stats,
                buffer_length: self.scanner.buffer().chars().count(),
            };
        }

        let output = self.scanner.feed(chunk);
        for marker in &output.completed {
            self.handle_marker(marker);
        }

        FeedResult {
            new_markers: output.completed,
            current_marker: output.current,
            stats: self.stats,
            buffer_length: self.scanner.buffer().chars().count(),
        }
    }

    /// Drain the last marker, sweep trailing gaps and redistribute
    ///
    /// Calling it again returns the same statistics without further work.
    pub fn finalize(&mut self) -> ProcessingStats {
        if self.finalized {
            return self.stats;
        }
        self.finalized = true;

        if let Some(marker) = self.scanner.finalize() {
            self.handle_marker(&marker);
        }

        match self.orphans.process_final_gaps(&mut self.document) {
            Ok(resolutions) => {
                for resolution in &resolutions {
                    self.events.gap_resolved(resolution);
                }
            }
            Err(e) => warn!("Final gap sweep failed: {}", e),
        }
        self.matcher.refresh(&self.document);
        self.sync_orphan_stats();

        let redistributor = Redistributor::new(&self.services, &self.target_language, &self.redistribution);
        self.last_report = Some(redistributor.redistribute_all(&mut self.document));

        self.log_final_stats();
        self.stats
    }

    fn handle_marker(&mut self, marker: &TranslationMarker) {
        self.stats.processed += 1;
        let outcome = match self.apply_match(marker) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Marker ({}) #{} could not be applied: {}", marker.letter, marker.position, e);
                MatchOutcome::Unmatched(MatchFailure::ApplyFailed)
            }
        };
        self.events.marker_completed(marker, &outcome);
    }

    fn apply_match(&mut self, marker: &TranslationMarker) -> Result<MatchOutcome, AlignmentError> {
        let outcome = self.matcher.match_marker(marker);
        let MatchOutcome::Matched { source_position, method } = outcome else {
            return Ok(outcome);
        };

        let instance = self.document.require_mut(source_position)?;
        instance.transition(MarkerStatus::Matched)?;
        instance.overall_translation = marker.content.clone();
        instance.match_method = Some(method);
        self.stats.matched += 1;

        let resolutions = self.orphans.on_match(&mut self.document, source_position)?;
        for resolution in &resolutions {
            self.events.gap_resolved(resolution);
        }
        if !resolutions.is_empty() {
            self.matcher.refresh(&self.document);
        }
        self.sync_orphan_stats();

        let redistributor = Redistributor::new(&self.services, &self.target_language, &self.redistribution);
        redistributor.distribute_matched(self.document.require_mut(source_position)?);

        Ok(outcome)
    }

    fn sync_orphan_stats(&mut self) {
        self.stats.merged = self.orphans.merged_count();
        self.stats.orphaned = self.orphans.orphaned_count();
    }

    fn log_final_stats(&self) {
        info!(
            "Finalized: matched {}, merged {}, orphaned {}, total {}, processed {}, success {:.1}%",
            self.stats.matched,
            self.stats.merged,
            self.stats.orphaned,
            self.stats.total,
            self.stats.processed,
            self.stats.success_rate() * 100.0
        );
    }

    pub fn stats(&self) -> ProcessingStats {
        self.stats
    }

    pub fn events(&self) -> &[StreamEvent] {
        self.events.events()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.events
    }

    pub fn document(&self) -> &SourceDocument {
        &self.document
    }

    pub fn into_document(self) -> SourceDocument {
        self.document
    }

    pub fn services(&self) -> &LanguageServices {
        &self.services
    }

    /// Report of the final redistribution pass, once finalized
    pub fn redistribution_report(&self) -> Option<&RedistributionReport> {
        self.last_report.as_ref()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// JSON snapshot of the instance graph
    pub fn snapshot(&self) -> Result<String, serde_json::Error> {
        self.document.to_json()
    }
}
