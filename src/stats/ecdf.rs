//! # Empirical CDF
//!
//! $$
//! F_n(x)=\frac{1}{n}\sum_{i=1}^n \mathbf 1\{X_i\le x\},\qquad
//! F_n^{-1}(p)=X_{(\lceil np\rceil)}
//! $$
//!
//! Step tables, the inverse ECDF and the bound helpers used by the discrete inverse
//! transform. Sorted copies and step tables are memoized by input content.
use std::cmp::Ordering;
use std::sync::Arc;

use approx::relative_eq;

use crate::error::check_unit_interval;
use crate::error::Result;
use crate::error::ScengenError;
use crate::stats::memo::ContentMemo;

static SORTED: ContentMemo<Vec<f64>> = ContentMemo::new();
static STEP_TABLES: ContentMemo<StepTable> = ContentMemo::new();

/// Same tolerance as numpy's `isclose` defaults.
fn is_close(a: f64, b: f64) -> bool {
  relative_eq!(a, b, epsilon = 1e-8, max_relative = 1e-5)
}

fn ensure_non_empty(data: &[f64]) -> Result<()> {
  if data.is_empty() {
    return Err(ScengenError::EmptyInput(
      "cannot evaluate an empirical distribution on empty data".into(),
    ));
  }
  Ok(())
}

/// Ascending copy of `data`.
pub fn sorted(data: &[f64]) -> Arc<Vec<f64>> {
  SORTED.get_or_compute(data, |xs| {
    let mut out = xs.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    out
  })
}

/// Distinct values of a sample with their frequencies and cumulative relative
/// frequencies, `cumulative[k] = F_n(values[k])`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepTable {
  values: Vec<f64>,
  counts: Vec<usize>,
  cumulative: Vec<f64>,
}

impl StepTable {
  /// Memoized step table of `data`.
  pub fn from_data(data: &[f64]) -> Result<Arc<Self>> {
    ensure_non_empty(data)?;
    Ok(STEP_TABLES.get_or_compute(data, |xs| Self::from_sorted(&sorted(xs))))
  }

  fn from_sorted(sorted: &[f64]) -> Self {
    let n = sorted.len() as f64;
    let mut values: Vec<f64> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();

    for &x in sorted {
      if values.last() == Some(&x) {
        if let Some(count) = counts.last_mut() {
          *count += 1;
        }
      } else {
        values.push(x);
        counts.push(1);
      }
    }

    let mut running = 0;
    let cumulative = counts
      .iter()
      .map(|&c| {
        running += c;
        running as f64 / n
      })
      .collect();

    Self {
      values,
      counts,
      cumulative,
    }
  }

  pub fn values(&self) -> &[f64] {
    &self.values
  }

  pub fn counts(&self) -> &[usize] {
    &self.counts
  }

  pub fn cumulative(&self) -> &[f64] {
    &self.cumulative
  }

  /// Number of distinct values.
  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// CDF levels including the origin: `[0, F(v_1), ..., F(v_k)]`.
  pub fn steps(&self) -> Vec<f64> {
    std::iter::once(0.0)
      .chain(self.cumulative.iter().copied())
      .collect()
  }

  /// Index of the smallest distinct value with `F >= arg`, moved one value up when
  /// `arg` sits exactly on an interior step. The mass ending at that step belongs to
  /// the previous quantile interval and must not be counted twice.
  pub fn lower_bound_index(&self, arg: f64) -> Result<usize> {
    check_unit_interval(arg)?;
    let last = self.len() - 1;
    let mut idx = self.cumulative.partition_point(|&c| c < arg);

    let interior = !is_close(arg, 0.0) && !is_close(arg, 1.0);
    if interior && idx < self.cumulative.len() && is_close(self.cumulative[idx], arg) {
      idx += 1;
    }

    Ok(idx.min(last))
  }

  /// Index of the smallest distinct value with `F >= arg`.
  pub fn upper_bound_index(&self, arg: f64) -> Result<usize> {
    check_unit_interval(arg)?;
    let last = self.len() - 1;
    Ok(self.cumulative.partition_point(|&c| c < arg).min(last))
  }

  /// Most frequent value among `values[lower..=upper]`; the smallest value wins ties.
  pub fn mode_between(&self, lower: usize, upper: usize) -> Result<f64> {
    if lower > upper || upper >= self.len() {
      return Err(ScengenError::Range(format!(
        "value index range [{lower}, {upper}] is invalid for {} distinct values",
        self.len()
      )));
    }

    let mut best = lower;
    for idx in lower + 1..=upper {
      if self.counts[idx] > self.counts[best] {
        best = idx;
      }
    }
    Ok(self.values[best])
  }
}

/// Cumulative relative frequencies of the distinct values of `data`, prefixed with 0.
pub fn cdf_steps(data: &[f64]) -> Result<Vec<f64>> {
  Ok(StepTable::from_data(data)?.steps())
}

/// Inverse ECDF on data that is already sorted ascending.
///
/// Picks the order statistic at `ceil(arg * n) - 1`, clamped to `[0, n - 1]`.
pub fn inverse_ecdf_sorted(sorted_data: &[f64], arg: f64) -> Result<f64> {
  check_unit_interval(arg)?;
  ensure_non_empty(sorted_data)?;

  let n = sorted_data.len();
  let idx = ((arg * n as f64).ceil() as usize)
    .saturating_sub(1)
    .min(n - 1);
  Ok(sorted_data[idx])
}

/// Inverse ECDF of unsorted `data` at `arg`.
pub fn inverse_ecdf(data: &[f64], arg: f64) -> Result<f64> {
  check_unit_interval(arg)?;
  ensure_non_empty(data)?;
  inverse_ecdf_sorted(&sorted(data), arg)
}

/// The pair of CDF steps bracketing `arg`. An exact hit returns `(arg, arg)`.
pub fn step_function(data: &[f64], arg: f64) -> Result<(f64, f64)> {
  check_unit_interval(arg)?;
  let steps = cdf_steps(data)?;

  let idx = steps.partition_point(|&s| s < arg);
  if idx < steps.len() && steps[idx] == arg {
    return Ok((arg, arg));
  }

  let lower = if idx > 0 { steps[idx - 1] } else { 0.0 };
  let upper = if idx < steps.len() { steps[idx] } else { 1.0 };
  Ok((lower, upper))
}

/// Lower value bound of the discrete inverse transform at quantile `arg`.
pub fn lower_transformation_bound(data: &[f64], arg: f64) -> Result<f64> {
  check_unit_interval(arg)?;
  let table = StepTable::from_data(data)?;
  Ok(table.values()[table.lower_bound_index(arg)?])
}
