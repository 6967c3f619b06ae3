//! Core engine — strategy selection, profit computation, scan and
//! verify pipelines.

pub mod evaluator;
pub mod profit;
pub mod scanner;
pub mod verifier;

use thiserror::Error;

/// Failures surfaced by the scan/verify pipelines.
///
/// Upstream fetch failures never appear here — they degrade to missing
/// data inside the pipeline. Only bad parameters and unexpected
/// computation failures reach the caller.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("unknown city: {0}")]
    UnknownCity(String),
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
