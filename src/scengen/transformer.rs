//! # Scenario Transformer
//!
//! $$
//! x_r=F_n^{-1}\!\Big(\frac{r-\tfrac12}{N}\Big)+\Big(\bar X-\frac1N\sum_{k=1}^N F_n^{-1}\big(\tfrac{k-\frac12}{N}\big)\Big)
//! $$
//!
//! Inverse margin transform from ranks to scenario values. Continuous margins use the
//! mid-point quantile of each rank, shifted so the scenario mean equals the sample mean.
//! Discrete margins pick the most frequent mass point inside the quantile band
//! `[(r - 1) / N, r / N]`.
use ndarray::Array2;
use ndarray::ArrayView1;

use super::dataset::Dataset;
use super::margin::MarginType;
use super::rank_matrix::ScenarioRankMatrix;
use crate::error::check_rank;
use crate::error::Result;
use crate::error::ScengenError;
use crate::stats::ecdf::inverse_ecdf_sorted;
use crate::stats::ecdf::sorted;
use crate::stats::ecdf::StepTable;

/// Values for ranks `1..=n_scenarios` of a continuous margin.
pub fn continuous_transformation(column: ArrayView1<f64>, n_scenarios: usize) -> Result<Vec<f64>> {
  let data = column.to_vec();
  let sorted_data = sorted(&data);
  let n = n_scenarios as f64;

  let values = (1..=n_scenarios)
    .map(|rank| inverse_ecdf_sorted(&sorted_data, (rank as f64 - 0.5) / n))
    .collect::<Result<Vec<f64>>>()?;

  let data_mean = sorted_data.iter().sum::<f64>() / sorted_data.len() as f64;
  let values_mean = values.iter().sum::<f64>() / n;
  let offset = data_mean - values_mean;

  Ok(values.into_iter().map(|x| x + offset).collect())
}

/// Values for ranks `1..=n_scenarios` of a discrete margin.
pub fn discrete_transformation(column: ArrayView1<f64>, n_scenarios: usize) -> Result<Vec<f64>> {
  let table = StepTable::from_data(&column.to_vec())?;
  let n = n_scenarios as f64;

  (1..=n_scenarios)
    .map(|rank| {
      let lower = table.lower_bound_index((rank - 1) as f64 / n)?;
      let upper = table.upper_bound_index(rank as f64 / n)?;
      table.mode_between(lower.min(upper), upper)
    })
    .collect()
}

/// Maps a [`ScenarioRankMatrix`] back onto the scale of the original data.
#[derive(Clone, Debug)]
pub struct ScenarioTransformer {
  dataset: Dataset,
  margin_types: Vec<MarginType>,
}

impl ScenarioTransformer {
  pub fn new(dataset: Dataset, margin_types: Vec<MarginType>) -> Result<Self> {
    if margin_types.len() != dataset.n_margins() {
      return Err(ScengenError::Shape(format!(
        "expected {} margin types, got {}",
        dataset.n_margins(),
        margin_types.len()
      )));
    }
    Ok(Self {
      dataset,
      margin_types,
    })
  }

  pub fn margin_types(&self) -> &[MarginType] {
    &self.margin_types
  }

  /// Per-margin lookup tables, `tables[m][r - 1]` is the value of rank `r` on margin `m`.
  pub fn transformations(&self, n_scenarios: usize) -> Result<Vec<Vec<f64>>> {
    self
      .margin_types
      .iter()
      .enumerate()
      .map(|(margin, margin_type)| {
        let column = self.dataset.column(margin);
        match margin_type {
          MarginType::Discrete => discrete_transformation(column, n_scenarios),
          MarginType::Continuous => continuous_transformation(column, n_scenarios),
        }
      })
      .collect()
  }

  /// Scenario values with the same column labels as the input dataset.
  pub fn transform(&self, ranks: &ScenarioRankMatrix) -> Result<Dataset> {
    if ranks.n_margins() != self.dataset.n_margins() {
      return Err(ScengenError::Shape(format!(
        "rank matrix has {} margins, dataset has {}",
        ranks.n_margins(),
        self.dataset.n_margins()
      )));
    }

    let n_scenarios = ranks.max_rank();
    let tables = self.transformations(n_scenarios)?;

    let mut values = Array2::<f64>::zeros((ranks.n_scenarios(), ranks.n_margins()));
    for ((scenario, margin), &rank) in ranks.ranks().indexed_iter() {
      check_rank(rank, n_scenarios)?;
      values[[scenario, margin]] = tables[margin][rank - 1];
    }

    Dataset::with_columns(self.dataset.columns().to_vec(), values)
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;
  use ndarray::Axis;

  use super::*;

  #[test]
  fn continuous_ranks_hit_midpoint_quantiles() {
    let column = array![3.0, 1.0, 2.0];
    let values = continuous_transformation(column.view(), 3).unwrap();
    assert_eq!(values, vec![1.0, 2.0, 3.0]);
  }

  #[test]
  fn continuous_transformation_preserves_the_mean() {
    let column = array![0.3, 7.5, -2.0, 4.4, 4.4, 10.0, 1.25];
    let mean = column.sum() / column.len() as f64;
    for n_scenarios in [1, 2, 5, 9] {
      let values = continuous_transformation(column.view(), n_scenarios).unwrap();
      let got = values.iter().sum::<f64>() / n_scenarios as f64;
      assert_abs_diff_eq!(got, mean, epsilon = 1e-12);
    }
  }

  #[test]
  fn discrete_bands_do_not_double_count_mass_points() {
    let column = array![0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0];
    let values = discrete_transformation(column.view(), 4).unwrap();
    assert_eq!(values, vec![0.0, 1.0, 2.0, 2.0]);
  }

  #[test]
  fn discrete_bands_pick_the_mode() {
    let column = array![0.0, 1.0, 1.0, 1.0, 2.0];
    let values = discrete_transformation(column.view(), 2).unwrap();
    assert_eq!(values, vec![1.0, 1.0]);
  }

  #[test]
  fn discrete_upper_bound_stops_at_an_exact_step() {
    // cumulative 0.2, 0.8, 1.0; the band of rank 1 ends exactly on F(0)
    let column = array![0.0, 1.0, 1.0, 1.0, 2.0];
    let values = discrete_transformation(column.view(), 5).unwrap();
    assert_eq!(values, vec![0.0, 1.0, 1.0, 1.0, 2.0]);
  }

  #[test]
  fn transform_substitutes_ranks_and_keeps_labels() {
    let ds = Dataset::with_columns(
      vec!["x".into(), "k".into()],
      array![[1.0, 0.0], [2.0, 1.0], [3.0, 1.0]],
    )
    .unwrap();
    let transformer =
      ScenarioTransformer::new(ds, vec![MarginType::Continuous, MarginType::Discrete]).unwrap();
    let ranks = ScenarioRankMatrix::from_ranks(array![[1, 3], [2, 1], [3, 2]]).unwrap();

    let out = transformer.transform(&ranks).unwrap();
    assert_eq!(out.columns(), &["x".to_string(), "k".to_string()]);
    assert_eq!(out.column(0), array![1.0, 2.0, 3.0]);
    // cumulative: 0 -> 1/3, 1 -> 1; bands [0,1/3], [1/3,2/3], [2/3,1]
    assert_eq!(out.column(1), array![1.0, 0.0, 1.0]);
    assert_abs_diff_eq!(
      out.values().mean_axis(Axis(0)).unwrap()[0],
      2.0,
      epsilon = 1e-12
    );
  }

  #[test]
  fn transform_rejects_mismatched_margins() {
    let ds = Dataset::new(array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
    assert!(matches!(
      ScenarioTransformer::new(ds.clone(), vec![MarginType::Continuous]),
      Err(ScengenError::Shape(_))
    ));

    let transformer = ScenarioTransformer::new(ds, vec![MarginType::Continuous; 2]).unwrap();
    let ranks = ScenarioRankMatrix::initialize(2).unwrap();
    assert!(matches!(
      transformer.transform(&ranks),
      Err(ScengenError::Shape(_))
    ));
  }
}
