//! # Margin Types
//!
//! $$
//! X\ \text{discrete}\iff X_i\in\mathbb Z\ \ \forall i
//! $$
//!
//! Discrete/continuous classification of dataset columns.
use std::fmt::Display;
use std::str::FromStr;

use ndarray::ArrayView1;

use crate::error::ScengenError;

/// How a margin is jittered before copula estimation and inverted afterwards.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum MarginType {
  /// Integer-valued margin; mass points are reproduced exactly.
  Discrete,
  /// Real-valued margin; inverted by quantile with mean correction.
  #[default]
  Continuous,
}

impl MarginType {
  /// A column is discrete when every observation is an integer.
  pub fn classify(column: ArrayView1<f64>) -> Self {
    if column.iter().all(|x| x.is_finite() && x.fract() == 0.0) {
      Self::Discrete
    } else {
      Self::Continuous
    }
  }

  pub fn is_discrete(&self) -> bool {
    matches!(self, Self::Discrete)
  }
}

impl FromStr for MarginType {
  type Err = ScengenError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "discrete" | "d" | "int" | "integer" => Ok(Self::Discrete),
      "continuous" | "c" | "real" | "float" => Ok(Self::Continuous),
      other => Err(ScengenError::Domain(format!("unknown margin type '{other}'"))),
    }
  }
}

impl Display for MarginType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      MarginType::Discrete => write!(f, "discrete"),
      MarginType::Continuous => write!(f, "continuous"),
    }
  }
}
