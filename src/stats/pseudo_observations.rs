//! # Pseudo-observations
//!
//! $$
//! \hat U_i=\frac{R_i-1}{n},\qquad R_i=\operatorname{rank}(X_i)\in\{1,\dots,n\}
//! $$
//!
use std::cmp::Ordering;
use std::sync::Arc;

use ndarray::Array1;

use super::memo::ContentMemo;

static PSEUDO_OBSERVATIONS: ContentMemo<Array1<f64>> = ContentMemo::new();

/// Normalized ranks of `data`.
///
/// The value at position `k` of the ascending order maps to `k / n`, so results lie in
/// `[0, 1)`. Ties keep their input order, which makes the map a bijection with the
/// sample indices.
pub fn pseudo_observations(data: &[f64]) -> Arc<Array1<f64>> {
  PSEUDO_OBSERVATIONS.get_or_compute(data, compute)
}

fn compute(data: &[f64]) -> Array1<f64> {
  let n = data.len();

  let mut order: Vec<(f64, usize)> = data.iter().enumerate().map(|(i, &val)| (val, i)).collect();
  // sort_by is stable, equal values stay in index order
  order.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

  let mut ranks = Array1::<f64>::zeros(n);
  for (rank, &(_val, orig_i)) in order.iter().enumerate() {
    ranks[orig_i] = rank as f64 / n as f64;
  }
  ranks
}
