use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::alignment::{
    drive_stream_with_progress, ChunkSimulator, ProcessingStats, SourceDocument, StreamEvent, StreamProcessor,
    UtteranceInput,
};
use crate::app_config::Config;
use crate::text::{CompoundLexicon, LanguageServices};

// @module: Application controller for alignment runs

/// Source document as supplied by ingestion: marked text plus one utterance
/// batch per marker occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SourceInput {
    /// Source text with inline `(x)` markers
    pub text: String,

    /// Utterance metadata, one batch per marker in document order
    #[serde(default)]
    pub utterances: Vec<Vec<UtteranceInput>>,
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct AlignmentRun {
    pub stats: ProcessingStats,
    pub document: SourceDocument,
    pub events: Vec<StreamEvent>,
    pub chunks: usize,
    pub duration: std::time::Duration,
}

/// Main application controller for alignment
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Optional compound lexicon for the target language
    lexicon: Option<Arc<dyn CompoundLexicon>>,
    // @field: Whether to draw a progress bar
    show_progress: bool,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        let mut config = Config::default();
        config.simulation.chunk_delay_ms = 0;
        Ok(Self::with_config(config)?.with_progress(false))
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self {
            config,
            lexicon: None,
            show_progress: true,
        })
    }

    /// Attach a compound lexicon used when marking translations
    pub fn with_lexicon(mut self, lexicon: Arc<dyn CompoundLexicon>) -> Self {
        self.lexicon = Some(lexicon);
        self
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.source_language.is_empty() && !self.config.target_language.is_empty()
    }

    /// Read a source JSON file
    pub fn load_source<P: AsRef<Path>>(path: P) -> Result<SourceInput> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read source file: {}", path.display()))?;
        let source: SourceInput = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse source file: {}", path.display()))?;
        if source.text.trim().is_empty() {
            return Err(anyhow!("Source file has no text: {}", path.display()));
        }
        Ok(source)
    }

    fn services(&self) -> LanguageServices {
        let services = LanguageServices::new(&self.config.cache, &self.config.redistribution);
        match &self.lexicon {
            Some(lexicon) => services.with_lexicon(Arc::clone(lexicon)),
            None => services,
        }
    }

    /// Extract the source and prepare a processor for it
    pub fn build_processor(&self, source: &SourceInput) -> StreamProcessor {
        StreamProcessor::from_source(&source.text, &source.utterances, &self.config, self.services())
    }

    /// Replay a complete translation as a chunked stream and align it
    pub async fn align(&self, source: &SourceInput, translation: &str) -> Result<AlignmentRun> {
        let start_time = std::time::Instant::now();
        let mut processor = self.build_processor(source);
        if processor.document().is_empty() {
            warn!("Source contains no markers; nothing will match");
        }

        let simulator = ChunkSimulator::new(&self.config.simulation);
        let total_chunks = simulator.estimate_chunks(translation) as u64;
        let progress_bar = self.progress_bar(total_chunks);

        let mut chunks = 0usize;
        let stats = drive_stream_with_progress(&mut processor, simulator.stream(translation), |result| {
            chunks += 1;
            progress_bar.inc(1);
            progress_bar.set_message(format!(
                "{} matched, {} merged",
                result.stats.matched, result.stats.merged
            ));
        })
        .await;
        progress_bar.finish_and_clear();

        let duration = start_time.elapsed();
        info!(
            "Aligned {} markers from {} chunks in {}",
            stats.total,
            chunks,
            Self::format_duration(duration)
        );

        let events = processor.events().to_vec();
        Ok(AlignmentRun {
            stats,
            document: processor.into_document(),
            events,
            chunks,
            duration,
        })
    }

    /// Run the main workflow: read inputs, align, write the snapshot
    ///
    /// Without an output path the snapshot goes to stdout.
    pub async fn run(
        &self,
        source_path: PathBuf,
        translation_path: PathBuf,
        output_path: Option<PathBuf>,
        events_path: Option<PathBuf>,
    ) -> Result<ProcessingStats> {
        let source = Self::load_source(&source_path)?;
        let translation = fs::read_to_string(&translation_path)
            .with_context(|| format!("Failed to read translation file: {}", translation_path.display()))?;
        debug!(
            "Loaded {} source chars and {} translation chars",
            source.text.chars().count(),
            translation.chars().count()
        );

        let run = self.align(&source, &translation).await?;
        let snapshot = run.document.to_json().context("Failed to serialize snapshot")?;

        match output_path {
            Some(path) => {
                Self::write_file(&path, &snapshot)?;
                info!("Snapshot written to {}", path.display());
            }
            None => println!("{}", snapshot),
        }

        if let Some(path) = events_path {
            let events = serde_json::to_string_pretty(&run.events).context("Failed to serialize events")?;
            Self::write_file(&path, &events)?;
            info!("Events written to {}", path.display());
        }

        Ok(run.stats)
    }

    fn write_file(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(path, content).with_context(|| format!("Failed to write file: {}", path.display()))
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let progress_bar = ProgressBar::new(total);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
