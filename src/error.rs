//! # Errors
//!
//! $$
//! \text{input}\notin\mathcal D \implies \text{fail fast}
//! $$
//!
//! Every failure in this crate is an input-validation failure. Nothing is retried and
//! nothing is substituted with a default, so a single error aborts the whole run.

use thiserror::Error;

/// Validation failures raised by the scenario generation pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScengenError {
  /// Matrix is empty or a query has the wrong number of columns.
  #[error("shape error: {0}")]
  Shape(String),
  /// NaN/Inf present, or a quantile/copula argument outside `[0, 1]`.
  #[error("domain error: {0}")]
  Domain(String),
  /// A rank or grid index outside its admissible range.
  #[error("range error: {0}")]
  Range(String),
  /// Zero-length margin passed to a quantile or step function.
  #[error("empty input: {0}")]
  EmptyInput(String),
}

pub type Result<T> = std::result::Result<T, ScengenError>;

pub(crate) fn check_unit_interval(arg: f64) -> Result<()> {
  if !arg.is_finite() {
    return Err(ScengenError::Domain(format!(
      "argument must be finite, got {arg}"
    )));
  }
  if !(0.0..=1.0).contains(&arg) {
    return Err(ScengenError::Domain(format!(
      "argument must be in [0, 1], got {arg}"
    )));
  }
  Ok(())
}

pub(crate) fn check_rank(rank: usize, max_rank: usize) -> Result<()> {
  if rank == 0 || rank > max_rank {
    return Err(ScengenError::Range(format!(
      "rank must be in [1, {max_rank}], got {rank}"
    )));
  }
  Ok(())
}
