//! # Deviation Cache
//!
//! $$
//! D_m(r)=\sum_{i=1}^{N}\Big|G_m(i)+\tfrac{1}{N}\mathbf 1\{i\ge r\}-C_m\big(\tfrac iN,\tfrac vN\big)\Big|
//! $$
//!
//! For one target rank `v`, `D_m(r)` is the copula deviation on prior margin `m` after
//! committing a scenario whose rank on `m` is `r`. All `N` values come out of a single
//! pass per margin:
//!
//! $$
//! D_m(1)=\delta_0,\qquad D_m(r)=D_m(r-1)+\big|G_m(r-1)-C_m\big|-\big|G_m(r-1)+\tfrac1N-C_m\big|
//! $$
//!
//! With `G_m(i) = k_i / N` and `C_m = c_i / n` every term is an integer over `N n`, so the
//! table stores the numerators `|(k_i + b) n - c_i N|` and equal deviations compare equal.
use ndarray::Array2;
use ndarray::ArrayView1;
use rayon::prelude::*;

use crate::copulas::CopulaGrid;
use crate::copulas::RunningCopulaTrack;
use crate::error::check_rank;
use crate::error::Result;
use crate::error::ScengenError;

/// `prior_margins x max_rank` table of post-assignment deviations for one target rank,
/// kept as integer numerators over `max_rank * n_samples`.
#[derive(Clone, Debug)]
pub struct DeviationCache {
  max_rank: usize,
  n_samples: usize,
  matrix: Array2<i64>,
}

/// One cache row: `row[r - 1] = N n D(r)`.
fn deviation_row(track: &RunningCopulaTrack, grid: &CopulaGrid, rank: usize) -> Result<Vec<i64>> {
  let max_rank = track.max_rank();
  let big_n = max_rank as i64;
  let n = grid.n_samples() as i64;

  // target[i - 1] = n C(i / N, v / N)
  let target = grid.column(rank)?;
  let running = track.counts();

  let mut delta: i64 = running
    .iter()
    .zip(target.iter())
    .map(|(&k, &c)| ((k as i64 + 1) * n - c as i64 * big_n).abs())
    .sum();

  let mut row = Vec::with_capacity(max_rank);
  row.push(delta);
  for j in 0..max_rank - 1 {
    let (k, c) = (running[j] as i64, target[j] as i64);
    delta += (k * n - c * big_n).abs() - ((k + 1) * n - c * big_n).abs();
    row.push(delta);
  }
  Ok(row)
}

impl DeviationCache {
  /// Build the cache for target rank `rank` from one `(track, grid)` pair per prior
  /// margin. With `parallel` the rows are computed on the rayon pool; the result is
  /// identical either way.
  pub fn compute(
    tracks: &[RunningCopulaTrack],
    grids: &[CopulaGrid],
    rank: usize,
    parallel: bool,
  ) -> Result<Self> {
    if tracks.is_empty() || tracks.len() != grids.len() {
      return Err(ScengenError::Shape(format!(
        "need one copula grid per running track, got {} tracks and {} grids",
        tracks.len(),
        grids.len()
      )));
    }
    let max_rank = tracks[0].max_rank();
    if tracks.iter().any(|t| t.max_rank() != max_rank)
      || grids.iter().any(|g| g.max_rank() != max_rank)
    {
      return Err(ScengenError::Shape(
        "running tracks and copula grids disagree on max_rank".into(),
      ));
    }
    let n_samples = grids[0].n_samples();
    if grids.iter().any(|g| g.n_samples() != n_samples) {
      return Err(ScengenError::Shape(
        "copula grids disagree on the number of samples".into(),
      ));
    }
    check_rank(rank, max_rank)?;

    let rows: Vec<Vec<i64>> = if parallel {
      tracks
        .par_iter()
        .zip(grids.par_iter())
        .map(|(track, grid)| deviation_row(track, grid, rank))
        .collect::<Result<_>>()?
    } else {
      tracks
        .iter()
        .zip(grids)
        .map(|(track, grid)| deviation_row(track, grid, rank))
        .collect::<Result<_>>()?
    };

    let flat: Vec<i64> = rows.into_iter().flatten().collect();
    let matrix = Array2::from_shape_vec((tracks.len(), max_rank), flat)
      .map_err(|e| ScengenError::Shape(e.to_string()))?;

    Ok(Self {
      max_rank,
      n_samples,
      matrix,
    })
  }

  pub fn max_rank(&self) -> usize {
    self.max_rank
  }

  pub fn n_margins(&self) -> usize {
    self.matrix.nrows()
  }

  /// Common denominator `N n` of every entry.
  pub fn scale(&self) -> f64 {
    (self.max_rank * self.n_samples) as f64
  }

  /// Deviation numerator on prior margin `margin` for a candidate holding rank `rank`.
  pub fn numerator(&self, margin: usize, rank: usize) -> Result<i64> {
    if margin >= self.n_margins() {
      return Err(ScengenError::Range(format!(
        "margin must be in [0, {}], got {margin}",
        self.n_margins() - 1
      )));
    }
    check_rank(rank, self.max_rank)?;
    Ok(self.matrix[[margin, rank - 1]])
  }

  /// Deviation on prior margin `margin` for a candidate holding rank `rank` there.
  pub fn evaluate(&self, margin: usize, rank: usize) -> Result<f64> {
    Ok(self.numerator(margin, rank)? as f64 / self.scale())
  }

  /// Exact total deviation numerator of a candidate given its ranks on every prior
  /// margin.
  pub fn total_numerator(&self, ranks: ArrayView1<usize>) -> Result<i64> {
    if ranks.len() != self.n_margins() {
      return Err(ScengenError::Shape(format!(
        "expected {} prior ranks, got {}",
        self.n_margins(),
        ranks.len()
      )));
    }
    ranks
      .iter()
      .enumerate()
      .map(|(margin, &rank)| self.numerator(margin, rank))
      .sum()
  }

  /// Total deviation of a candidate given its ranks on every prior margin.
  pub fn total(&self, ranks: ArrayView1<usize>) -> Result<f64> {
    Ok(self.total_numerator(ranks)? as f64 / self.scale())
  }
}
