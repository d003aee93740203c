//! # Empirical
//!
//! $$
//! C_n(u)=\frac{1}{n}\sum_{i=1}^n \mathbf 1\{\hat U_{i1}\le u_1,\dots,\hat U_{id}\le u_d\}
//! $$
//!
use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::ArrayView2;
use ndarray::Axis;
use ndarray::stack;

use crate::error::check_rank;
use crate::error::check_unit_interval;
use crate::error::Result;
use crate::error::ScengenError;
use crate::stats::pseudo_observations::pseudo_observations;

/// Empirical copula over an `n x d` sample matrix.
#[derive(Clone, Debug)]
pub struct EmpiricalCopula {
  /// Per-margin pseudo-observations (`n x d`), each entry in `[0, 1)`.
  pseudo_observations: Array2<f64>,
}

impl EmpiricalCopula {
  /// Build the copula from raw samples. The matrix must have at least one row and one
  /// column and contain only finite values.
  pub fn new(data: ArrayView2<f64>) -> Result<Self> {
    let (n, d) = data.dim();
    if n < 1 || d < 1 {
      return Err(ScengenError::Shape(format!(
        "copula data must contain at least one sample and one dimension, got shape ({n}, {d})"
      )));
    }
    if data.iter().any(|x| !x.is_finite()) {
      return Err(ScengenError::Domain(
        "copula data contains NaN or infinite values".into(),
      ));
    }

    let mut pseudo = Array2::<f64>::zeros((n, d));
    for (j, column) in data.axis_iter(Axis(1)).enumerate() {
      let ranks = pseudo_observations(&column.to_vec());
      pseudo.column_mut(j).assign(&*ranks);
    }

    Ok(Self {
      pseudo_observations: pseudo,
    })
  }

  /// Bivariate copula of two equally long series.
  pub fn from_columns<'a>(x: ArrayView1<'a, f64>, y: ArrayView1<'a, f64>) -> Result<Self> {
    if x.len() != y.len() {
      return Err(ScengenError::Shape(format!(
        "series must have the same length, got {} and {}",
        x.len(),
        y.len()
      )));
    }
    let data = stack(Axis(1), &[x, y]).map_err(|e| ScengenError::Shape(e.to_string()))?;
    Self::new(data.view())
  }

  pub fn dim(&self) -> usize {
    self.pseudo_observations.ncols()
  }

  pub fn n_samples(&self) -> usize {
    self.pseudo_observations.nrows()
  }

  pub fn pseudo_observations(&self) -> ArrayView2<'_, f64> {
    self.pseudo_observations.view()
  }

  /// Evaluate the copula at every row of `points` (`m x d`).
  pub fn evaluate(&self, points: ArrayView2<f64>) -> Result<Array1<f64>> {
    points
      .axis_iter(Axis(0))
      .map(|row| self.evaluate_point(&row.to_vec()))
      .collect()
  }

  /// Evaluate the copula at a single point `u` in `[0, 1]^d`.
  pub fn evaluate_point(&self, u: &[f64]) -> Result<f64> {
    if u.len() != self.dim() {
      return Err(ScengenError::Shape(format!(
        "each argument must have dimension {}, got {}",
        self.dim(),
        u.len()
      )));
    }
    for &x in u {
      check_unit_interval(x)?;
    }

    let dominated = self
      .pseudo_observations
      .axis_iter(Axis(0))
      .filter(|obs| obs.iter().zip(u).all(|(p, q)| p <= q))
      .count();
    Ok(dominated as f64 / self.n_samples() as f64)
  }

  /// Tabulate a bivariate copula on the rank grid `(i / N, v / N)`, `i, v = 1..=N`.
  ///
  /// Pseudo-observations are `k / n`, so `k / n <= i / N` is decided in integers as
  /// `k * N <= i * n`. Each sample is binned at its first dominating grid point and the
  /// bins are accumulated along both axes.
  pub fn grid(&self, max_rank: usize) -> Result<CopulaGrid> {
    if self.dim() != 2 {
      return Err(ScengenError::Shape(format!(
        "grid tabulation needs a bivariate copula, got dimension {}",
        self.dim()
      )));
    }
    if max_rank == 0 {
      return Err(ScengenError::Range("max_rank must be positive".into()));
    }

    let n = self.n_samples();
    let first_grid_index = |u: f64| {
      let k = (u * n as f64).round() as usize;
      (k * max_rank).div_ceil(n).max(1)
    };

    let mut counts = Array2::<usize>::zeros((max_rank, max_rank));
    for obs in self.pseudo_observations.axis_iter(Axis(0)) {
      counts[[first_grid_index(obs[0]) - 1, first_grid_index(obs[1]) - 1]] += 1;
    }
    for i in 1..max_rank {
      for v in 0..max_rank {
        let below = counts[[i - 1, v]];
        counts[[i, v]] += below;
      }
    }
    for i in 0..max_rank {
      for v in 1..max_rank {
        let left = counts[[i, v - 1]];
        counts[[i, v]] += left;
      }
    }

    Ok(CopulaGrid {
      max_rank,
      n_samples: n,
      counts,
    })
  }
}

/// Integer counts of a bivariate empirical copula on the rank grid:
/// `C(i / N, v / N) = count(i, v) / n`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopulaGrid {
  max_rank: usize,
  n_samples: usize,
  counts: Array2<usize>,
}

impl CopulaGrid {
  pub fn max_rank(&self) -> usize {
    self.max_rank
  }

  pub fn n_samples(&self) -> usize {
    self.n_samples
  }

  /// Number of samples dominated by `(i / N, v / N)`.
  pub fn count(&self, i: usize, v: usize) -> Result<usize> {
    check_rank(i, self.max_rank)?;
    check_rank(v, self.max_rank)?;
    Ok(self.counts[[i - 1, v - 1]])
  }

  pub fn value(&self, i: usize, v: usize) -> Result<f64> {
    Ok(self.count(i, v)? as f64 / self.n_samples as f64)
  }

  /// Counts for `i = 1..=N` at a fixed second coordinate `v`.
  pub fn column(&self, v: usize) -> Result<ArrayView1<'_, usize>> {
    check_rank(v, self.max_rank)?;
    Ok(self.counts.column(v - 1))
  }
}
