use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs;
use std::path::Path;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Language of the source document (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Language of the streamed translation (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Chunk buffer and event log limits
    #[serde(default)]
    pub stream: StreamConfig,

    /// Stream simulator settings
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Redistribution settings
    #[serde(default)]
    pub redistribution: RedistributionConfig,

    /// Language service cache sizes
    #[serde(default)]
    pub cache: CacheConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Limits for the chunk buffer and the event log
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StreamConfig {
    /// Buffer size (chars) above which the diagnostic buffer is trimmed
    #[serde(default = "default_buffer_ceiling")]
    pub buffer_ceiling: usize,

    /// Chars kept from the buffer tail after trimming
    #[serde(default = "default_buffer_keep_tail")]
    pub buffer_keep_tail: usize,

    /// Maximum number of events kept in the event log
    #[serde(default = "default_max_events")]
    pub max_events: usize,

    /// Content preview length (chars) in events
    #[serde(default = "default_event_preview_chars")]
    pub event_preview_chars: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            buffer_ceiling: default_buffer_ceiling(),
            buffer_keep_tail: default_buffer_keep_tail(),
            max_events: default_max_events(),
            event_preview_chars: default_event_preview_chars(),
        }
    }
}

/// Settings for replaying a complete translation as a chunked stream
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Maximum random deviation from chunk_size (0 = fixed size)
    #[serde(default)]
    pub chunk_jitter: usize,

    /// Pause between chunks in milliseconds
    #[serde(default = "default_chunk_delay_ms")]
    pub chunk_delay_ms: u64,

    /// Seed for the jitter RNG (random when absent)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_jitter: 0,
            chunk_delay_ms: default_chunk_delay_ms(),
            seed: None,
        }
    }
}

/// Settings for splitting translations back onto utterances
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RedistributionConfig {
    /// How many words a split boundary may move to satisfy language rules
    #[serde(default = "default_max_boundary_shift")]
    pub max_boundary_shift: usize,

    /// Give every utterance at least one word while words remain
    #[serde(default = "default_true")]
    pub min_one_word_per_utterance: bool,

    /// Mark compound words before splitting (Vietnamese only)
    #[serde(default = "default_true")]
    pub merge_compounds: bool,
}

impl Default for RedistributionConfig {
    fn default() -> Self {
        Self {
            max_boundary_shift: default_max_boundary_shift(),
            min_one_word_per_utterance: true,
            merge_compounds: true,
        }
    }
}

/// Capacities of the language service caches
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CacheConfig {
    /// Word split results kept (0 disables)
    #[serde(default = "default_cache_capacity")]
    pub split_cache_capacity: usize,

    /// Compound-marked texts kept (0 disables)
    #[serde(default = "default_cache_capacity")]
    pub compound_cache_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            split_cache_capacity: default_cache_capacity(),
            compound_cache_capacity: default_cache_capacity(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(anyhow!("Invalid log level: {}", s)),
        }
    }
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "vi".to_string()
}

fn default_buffer_ceiling() -> usize {
    100_000
}

fn default_buffer_keep_tail() -> usize {
    1_000
}

fn default_max_events() -> usize {
    1_000
}

fn default_event_preview_chars() -> usize {
    50
}

fn default_chunk_size() -> usize {
    150
}

fn default_chunk_delay_ms() -> u64 {
    10
}

fn default_max_boundary_shift() -> usize {
    2
}

fn default_cache_capacity() -> usize {
    512
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load a configuration file, filling absent fields with defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, json).with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        let _source_name = crate::language_utils::get_language_name(&self.source_language)?;
        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;

        if self.stream.buffer_keep_tail >= self.stream.buffer_ceiling {
            return Err(anyhow!(
                "buffer_keep_tail ({}) must be smaller than buffer_ceiling ({})",
                self.stream.buffer_keep_tail,
                self.stream.buffer_ceiling
            ));
        }

        if self.simulation.chunk_size == 0 {
            return Err(anyhow!("chunk_size must be greater than zero"));
        }

        Ok(())
    }

    /// Target language normalised to the 2-letter form the text services key on
    pub fn target_language_code(&self) -> String {
        crate::language_utils::normalize_language_code(&self.target_language)
            .unwrap_or_else(|_| self.target_language.to_lowercase())
    }

    /// Source language normalised to the 2-letter form
    pub fn source_language_code(&self) -> String {
        crate::language_utils::normalize_language_code(&self.source_language)
            .unwrap_or_else(|_| self.source_language.to_lowercase())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            stream: StreamConfig::default(),
            simulation: SimulationConfig::default(),
            redistribution: RedistributionConfig::default(),
            cache: CacheConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
