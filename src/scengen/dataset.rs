//! # Dataset
//!
//! $$
//! X\in\mathbb R^{n\times d},\qquad n,d\ge 1
//! $$
//!
//! Labelled sample matrix shared by the generator and the transformer.
use std::collections::HashSet;

use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::ArrayView2;
use ndarray::Axis;

use super::margin::MarginType;
use crate::error::Result;
use crate::error::ScengenError;

/// Finite `n x d` matrix with one label per column.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
  columns: Vec<String>,
  values: Array2<f64>,
}

impl Dataset {
  /// Dataset with default labels `f0, f1, ...`.
  pub fn new(values: Array2<f64>) -> Result<Self> {
    let columns = (0..values.ncols()).map(|j| format!("f{j}")).collect();
    Self::with_columns(columns, values)
  }

  pub fn with_columns(columns: Vec<String>, values: Array2<f64>) -> Result<Self> {
    let (n, d) = values.dim();
    if n < 1 || d < 1 {
      return Err(ScengenError::Shape(format!(
        "dataset must contain at least one sample and one margin, got shape ({n}, {d})"
      )));
    }
    if columns.len() != d {
      return Err(ScengenError::Shape(format!(
        "expected {d} column labels, got {}",
        columns.len()
      )));
    }
    let unique: HashSet<&str> = columns.iter().map(String::as_str).collect();
    if unique.len() != columns.len() {
      return Err(ScengenError::Shape("column labels must be unique".into()));
    }
    if let Some(((i, j), x)) = values.indexed_iter().find(|(_, x)| !x.is_finite()) {
      return Err(ScengenError::Domain(format!(
        "dataset contains non-finite value {x} at ({i}, {j})"
      )));
    }

    Ok(Self { columns, values })
  }

  pub fn columns(&self) -> &[String] {
    &self.columns
  }

  pub fn values(&self) -> ArrayView2<'_, f64> {
    self.values.view()
  }

  pub fn column(&self, margin: usize) -> ArrayView1<'_, f64> {
    self.values.column(margin)
  }

  pub fn n_samples(&self) -> usize {
    self.values.nrows()
  }

  pub fn n_margins(&self) -> usize {
    self.values.ncols()
  }

  /// Classify every column with [`MarginType::classify`].
  pub fn classify_margins(&self) -> Vec<MarginType> {
    self
      .values
      .axis_iter(Axis(1))
      .map(MarginType::classify)
      .collect()
  }

  /// Column means.
  pub fn means(&self) -> Vec<f64> {
    self
      .values
      .axis_iter(Axis(1))
      .map(|col| col.sum() / col.len() as f64)
      .collect()
  }

  pub fn into_values(self) -> Array2<f64> {
    self.values
  }
}

#[cfg(test)]
mod tests {
  use ndarray::array;

  use super::*;

  #[test]
  fn default_labels_and_classification() {
    let ds = Dataset::new(array![[1.0, 0.5], [2.0, 1.5], [0.0, 2.25]]).unwrap();
    assert_eq!(ds.columns(), &["f0".to_string(), "f1".to_string()]);
    assert_eq!(ds.n_samples(), 3);
    assert_eq!(ds.n_margins(), 2);
    assert_eq!(
      ds.classify_margins(),
      vec![MarginType::Discrete, MarginType::Continuous]
    );
    assert_eq!(ds.means(), vec![1.0, 1.4166666666666667]);
  }

  #[test]
  fn validation_failures() {
    assert!(matches!(
      Dataset::new(Array2::zeros((0, 3))),
      Err(ScengenError::Shape(_))
    ));
    assert!(matches!(
      Dataset::with_columns(vec!["a".into()], array![[1.0, 2.0]]),
      Err(ScengenError::Shape(_))
    ));
    assert!(matches!(
      Dataset::with_columns(vec!["a".into(), "a".into()], array![[1.0, 2.0]]),
      Err(ScengenError::Shape(_))
    ));
    assert!(matches!(
      Dataset::new(array![[1.0, f64::NAN]]),
      Err(ScengenError::Domain(_))
    ));
  }
}
