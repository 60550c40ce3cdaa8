/*!
 * Error types for the segment-mapper library.
 *
 * Alignment itself is built to degrade rather than fail: match failures,
 * empty translations and unrecoverable gaps are reported through statistics
 * and the event log. The enums below cover what is left: illegal state
 * transitions, per-instance redistribution failures and application I/O.
 */

use thiserror::Error;

use crate::alignment::model::{DomainIndex, MarkerStatus};

/// Errors raised while mutating the marker instance graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignmentError {
    /// A terminal marker was asked to change state
    #[error("Invalid transition for {domain_index}: {from} -> {to}")]
    InvalidTransition {
        /// Instance identity
        domain_index: DomainIndex,
        /// Current status
        from: MarkerStatus,
        /// Requested status
        to: MarkerStatus,
    },

    /// No instance exists at the given source position
    #[error("No marker instance at position {0}")]
    UnknownPosition(usize),

    /// A domain index could not be parsed
    #[error("Invalid domain index: {0}")]
    InvalidDomainIndex(String),

    /// A marker token could not be parsed
    #[error("Invalid marker token: {0}")]
    InvalidMarkerToken(String),
}

/// Errors raised while redistributing a single instance's translation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RedistributionError {
    /// An utterance carries a merge origin that has no merge record
    #[error("Utterance {global_index} claims origin {origin} which is not merged into {target}")]
    UnknownMergeOrigin {
        /// Utterance ordinal in the document
        global_index: usize,
        /// Tagged origin
        origin: DomainIndex,
        /// Instance being redistributed
        target: DomainIndex,
    },

    /// Word allocation did not cover the translation exactly
    #[error("Allocation mismatch for {target}: allocated {allocated} of {total} words")]
    AllocationMismatch {
        /// Instance being redistributed
        target: DomainIndex,
        /// Words handed out
        allocated: usize,
        /// Words available
        total: usize,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error while reading or validating configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Error from the alignment engine
    #[error("Alignment error: {0}")]
    Alignment(#[from] AlignmentError),

    /// Error from redistribution
    #[error("Redistribution error: {0}")]
    Redistribution(#[from] RedistributionError),

    /// Error serializing or parsing JSON
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
