/*!
 * # segment-mapper
 *
 * Aligns a streamed translation back onto the timed utterances of a marked
 * source document.
 *
 * ## Features
 *
 * - Extract `(x)` markers and their utterances from a source text
 * - Scan a translation stream chunk by chunk, tolerant of markers split
 *   across chunk boundaries
 * - Match translated markers to source instances by surrounding context
 * - Merge skipped source instances into their neighbours
 * - Redistribute each translation over the source utterances by word length,
 *   keeping Vietnamese compound words and boundary rules intact
 * - JSON snapshot of the resulting instance graph
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `alignment`: the streaming engine
 *   - `alignment::extractor`: source parsing and the instance arena
 *   - `alignment::scanner`: incremental marker scanning
 *   - `alignment::matcher`: context matching
 *   - `alignment::orphans`: gap merging
 *   - `alignment::redistributor`: word redistribution
 *   - `alignment::processor`: the per-run processor
 *   - `alignment::stream`: async driver and chunk simulator
 * - `text`: word splitting, compounds, boundary rules and caches
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod alignment;
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod language_utils;
pub mod text;

// Re-export main types for easier usage
pub use alignment::{
    drive_stream, ChunkSimulator, MarkerExtractor, MarkerInstance, MarkerStatus, ProcessingStats, SourceDocument,
    StreamEvent, StreamProcessor, UtteranceInput,
};
pub use app_config::Config;
pub use app_controller::{Controller, SourceInput};
pub use errors::{AlignmentError, AppError, RedistributionError};
pub use language_utils::{get_language_name, normalize_language_code};
pub use text::{CompoundLexicon, LanguageServices, PhraseLexicon};
