/*!
 * Streaming marker alignment.
 *
 * Extraction builds the source instance arena once; the processor then
 * scans the translation stream, matches each completed marker by context,
 * folds skipped instances into their neighbours and redistributes the
 * matched translations over the source utterances.
 */

pub mod context;
pub mod events;
pub mod extractor;
pub mod matcher;
pub mod model;
pub mod orphans;
pub mod processor;
pub mod redistributor;
pub mod scanner;
pub mod stream;

pub use context::{ContextFingerprint, MatchMethod};
pub use events::{EventLog, StreamEvent};
pub use extractor::{DocumentMeta, MarkerExtractor, SourceDocument};
pub use matcher::{ContextMatcher, MatchFailure, MatchOutcome, UnmatchedIndex};
pub use model::{
    DomainIndex, MarkerInstance, MarkerStatus, MarkerToken, MergeDirection, MergeRecord, PartialMarker,
    TranslationMarker, Utterance, UtteranceInput,
};
pub use orphans::{GapResolution, OrphanHandler};
pub use processor::{FeedResult, ProcessingStats, StreamProcessor};
pub use redistributor::{RedistributionOutcome, RedistributionReport, Redistributor, SkipReason};
pub use scanner::{ChunkScanner, ScanOutput};
pub use stream::{drive_stream, drive_stream_with_progress, ChunkSimulator};
