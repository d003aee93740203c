//! # Running copula track
//!
//! $$
//! G_k(i)=\frac{1}{N}\sum_{s\le k}\mathbf 1\{r_s\le i\},\qquad i=1,\dots,N
//! $$
//!
//! Empirical CDF of the ranks committed so far on one prior margin, in units of `1/N`.
use std::sync::Arc;

use crate::error::check_rank;
use crate::error::Result;
use crate::error::ScengenError;

/// Persistent step function over the rank grid `1..=max_rank`.
///
/// Cells hold integer counts of committed ranks, so deviations built on top of the
/// track can be compared exactly. `assign` produces a new snapshot and leaves `self`
/// untouched, so the scheduler can keep scoring candidates against the pre-assignment
/// state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunningCopulaTrack {
  max_rank: usize,
  counts: Arc<[usize]>,
}

impl RunningCopulaTrack {
  /// Empty track: no rank has been committed yet.
  pub fn new(max_rank: usize) -> Result<Self> {
    if max_rank == 0 {
      return Err(ScengenError::Range("max_rank must be positive".into()));
    }
    Ok(Self {
      max_rank,
      counts: vec![0; max_rank].into(),
    })
  }

  pub fn max_rank(&self) -> usize {
    self.max_rank
  }

  /// Number of committed ranks `<= rank`.
  pub fn count(&self, rank: usize) -> Result<usize> {
    check_rank(rank, self.max_rank)?;
    Ok(self.counts[rank - 1])
  }

  /// Fraction of committed ranks `<= rank`.
  pub fn evaluate(&self, rank: usize) -> Result<f64> {
    Ok(self.count(rank)? as f64 / self.max_rank as f64)
  }

  pub fn evaluate_many(&self, ranks: &[usize]) -> Result<Vec<f64>> {
    ranks.iter().map(|&rank| self.evaluate(rank)).collect()
  }

  /// Raw grid counts, `counts()[i - 1] == count(i)`.
  pub fn counts(&self) -> &[usize] {
    &self.counts
  }

  /// Grid values, `values()[i - 1] == evaluate(i)`.
  pub fn values(&self) -> Vec<f64> {
    let n = self.max_rank as f64;
    self.counts.iter().map(|&c| c as f64 / n).collect()
  }

  /// Track with one more scenario committed at `rank`.
  pub fn assign(&self, rank: usize) -> Result<Self> {
    check_rank(rank, self.max_rank)?;

    let mut next = self.counts.to_vec();
    for cell in &mut next[rank - 1..] {
      *cell += 1;
    }

    Ok(Self {
      max_rank: self.max_rank,
      counts: next.into(),
    })
  }

  /// Every rank has been used once.
  pub fn is_complete(&self) -> bool {
    self.counts[self.max_rank - 1] == self.max_rank
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn starts_at_zero() {
    let track = RunningCopulaTrack::new(4).unwrap();
    assert_eq!(track.max_rank(), 4);
    assert_eq!(track.evaluate_many(&[1, 2, 3, 4]).unwrap(), vec![0.0; 4]);
    assert!(!track.is_complete());
  }

  #[test]
  fn assign_bumps_the_tail_and_keeps_the_previous_state() {
    let track = RunningCopulaTrack::new(4).unwrap();
    let next = track.assign(3).unwrap();

    assert_eq!(track.counts(), &[0usize, 0, 0, 0]);
    assert_eq!(next.counts(), &[0usize, 0, 1, 1]);
    assert_eq!(next.values(), vec![0.0, 0.0, 0.25, 0.25]);

    let after = next.assign(1).unwrap();
    assert_eq!(after.values(), vec![0.25, 0.25, 0.5, 0.5]);
    assert_eq!(after.count(3).unwrap(), 2);
    assert_eq!(next.counts(), &[0usize, 0, 1, 1]);
  }

  #[test]
  fn full_permutation_reaches_one_and_stays_monotone() {
    let n = 7;
    let mut track = RunningCopulaTrack::new(n).unwrap();
    for rank in [4, 1, 7, 2, 6, 3, 5] {
      track = track.assign(rank).unwrap();
      assert!(track.counts().windows(2).all(|w| w[0] <= w[1]));
    }
    assert!(track.is_complete());
    for i in 1..=n {
      assert_abs_diff_eq!(track.evaluate(i).unwrap(), i as f64 / n as f64, epsilon = 1e-12);
    }
  }

  #[test]
  fn ranks_outside_the_grid_are_rejected() {
    let track = RunningCopulaTrack::new(3).unwrap();
    assert!(matches!(track.evaluate(0), Err(ScengenError::Range(_))));
    assert!(matches!(track.evaluate(4), Err(ScengenError::Range(_))));
    assert!(matches!(track.assign(0), Err(ScengenError::Range(_))));
    assert!(matches!(track.assign(4), Err(ScengenError::Range(_))));
    assert!(track.evaluate_many(&[1, 5]).is_err());
    assert!(matches!(
      RunningCopulaTrack::new(0),
      Err(ScengenError::Range(_))
    ));
  }
}
