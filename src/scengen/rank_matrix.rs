//! # Scenario Rank Matrix
//!
//! $$
//! R\in\{1,\dots,N\}^{N\times m},\qquad R_{\cdot j}\ \text{a permutation of}\ 1..N
//! $$
//!
use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::ArrayView2;
use ndarray::Axis;

use crate::error::Result;
use crate::error::ScengenError;

/// Ranks assigned so far: one row per scenario, one column per processed margin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioRankMatrix {
  max_rank: usize,
  ranks: Array2<usize>,
}

fn check_permutation(column: ArrayView1<usize>, max_rank: usize) -> Result<()> {
  if column.len() != max_rank {
    return Err(ScengenError::Shape(format!(
      "rank column must have {max_rank} entries, got {}",
      column.len()
    )));
  }
  let mut seen = vec![false; max_rank];
  for &rank in column {
    if rank == 0 || rank > max_rank {
      return Err(ScengenError::Range(format!(
        "rank must be in [1, {max_rank}], got {rank}"
      )));
    }
    if std::mem::replace(&mut seen[rank - 1], true) {
      return Err(ScengenError::Range(format!(
        "rank {rank} assigned twice in one margin"
      )));
    }
  }
  Ok(())
}

impl ScenarioRankMatrix {
  /// Matrix holding only the reference margin, ranked `1..=max_rank` in row order.
  pub fn initialize(max_rank: usize) -> Result<Self> {
    if max_rank == 0 {
      return Err(ScengenError::Range(
        "number of scenarios must be positive".into(),
      ));
    }
    let reference = Array1::from_iter(1..=max_rank);
    let ranks = reference.insert_axis(Axis(1));
    Ok(Self { max_rank, ranks })
  }

  /// Wrap a complete rank matrix, checking that every column is a permutation.
  pub fn from_ranks(ranks: Array2<usize>) -> Result<Self> {
    let max_rank = ranks.nrows();
    if max_rank == 0 || ranks.ncols() == 0 {
      return Err(ScengenError::Shape(format!(
        "rank matrix must be non-empty, got shape {:?}",
        ranks.dim()
      )));
    }
    for column in ranks.axis_iter(Axis(1)) {
      check_permutation(column, max_rank)?;
    }
    Ok(Self { max_rank, ranks })
  }

  /// Append the ranks of the next margin.
  pub fn extend(self, new_ranks: Array1<usize>) -> Result<Self> {
    check_permutation(new_ranks.view(), self.max_rank)?;
    let mut ranks = self.ranks;
    ranks
      .push_column(new_ranks.view())
      .map_err(|e| ScengenError::Shape(e.to_string()))?;
    Ok(Self {
      max_rank: self.max_rank,
      ranks,
    })
  }

  pub fn max_rank(&self) -> usize {
    self.max_rank
  }

  pub fn n_scenarios(&self) -> usize {
    self.ranks.nrows()
  }

  pub fn n_margins(&self) -> usize {
    self.ranks.ncols()
  }

  pub fn ranks(&self) -> ArrayView2<'_, usize> {
    self.ranks.view()
  }

  /// Ranks of one scenario across the processed margins.
  pub fn scenario(&self, scenario: usize) -> ArrayView1<'_, usize> {
    self.ranks.row(scenario)
  }

  pub fn margin(&self, margin: usize) -> ArrayView1<'_, usize> {
    self.ranks.column(margin)
  }

  pub fn into_ranks(self) -> Array2<usize> {
    self.ranks
  }
}
